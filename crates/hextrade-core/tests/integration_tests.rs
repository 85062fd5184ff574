//! Integration tests for the hextrade game engine.
//!
//! These tests drive whole turns through the public action interface and
//! check the cross-module invariants: resource conservation, rejection
//! atomicity, and the turn rotation.

use hextrade_core::*;

/// A fresh two-player game on a standard radius-3 board.
fn new_game() -> GameState {
    GameState::new(vec![PlayerColor::Red, PlayerColor::Blue], 3).unwrap()
}

/// Dice pair summing to `n`
fn dice_for(n: u8) -> (u8, u8) {
    let d1 = n.saturating_sub(6).max(1);
    (d1, n - d1)
}

/// For every resource kind, bank stock plus all hands must equal the
/// bank's initial stock.
fn assert_conservation(game: &GameState) {
    for kind in Resource::ALL {
        let held: u32 = (0..game.player_count())
            .map(|p| game.hand_snapshot(p as PlayerId).unwrap().get(kind))
            .sum();
        assert_eq!(
            held + game.bank().stock_of(kind),
            player::BANK_STOCK_PER_RESOURCE,
            "conservation broken for {:?}",
            kind
        );
    }
}

/// Roll a non-7 for the current player and clear any robber state.
fn roll_quietly(game: &mut GameState) {
    let player = game.current_player();
    game.apply_roll(player, 2, 2).unwrap();
}

#[test]
fn test_fresh_game_shape() {
    let game = new_game();

    assert_eq!(game.board().tile_count(), 19);
    assert_eq!(game.board().node_count(), 54);
    assert_eq!(
        game.board().tiles().iter().filter(|t| t.is_desert()).count(),
        1
    );
    assert_eq!(
        game.board().tiles().iter().filter(|t| t.dice_number > 0).count(),
        18
    );

    assert_eq!(game.current_player(), 0);
    assert_eq!(game.phase(), TurnPhase::AwaitingRoll);
    assert!(game.pending_trades().is_empty());
    assert!(game.blocked_tile().is_none());
    assert_conservation(&game);
}

#[test]
fn test_adjacency_matrix_is_exposed_and_symmetric() {
    let game = new_game();
    let matrix = game.board().adjacency_matrix();
    assert_eq!(matrix.len(), 54);
    for a in 0..matrix.len() {
        assert!(!matrix[a][a]);
        for b in 0..matrix.len() {
            assert_eq!(matrix[a][b], matrix[b][a]);
        }
    }
}

#[test]
fn test_full_turn_cycle() {
    let mut game = new_game();

    roll_quietly(&mut game);
    let events = game.apply_action(0, GameAction::EndTurn).unwrap();
    assert!(events
        .iter()
        .any(|e| matches!(e, GameEvent::TurnEnded { player: 0, next_player: 1 })));

    roll_quietly(&mut game);
    game.apply_action(1, GameAction::EndTurn).unwrap();
    assert_eq!(game.current_player(), 0);
    assert_eq!(game.turn_number(), 3);
    assert_conservation(&game);
}

#[test]
fn test_building_keeps_resources_conserved() {
    let mut game = new_game();
    roll_quietly(&mut game);

    game.apply_action(0, GameAction::BuildSettlement(0)).unwrap();
    assert_conservation(&game);

    let neighbor = game.board().neighbors_of(0)[0];
    game.apply_action(0, GameAction::BuildRoad(0, neighbor)).unwrap();
    assert_conservation(&game);

    assert_eq!(game.victory_points(0), Some(1));
    assert_eq!(game.bank().remaining_settlement_pieces(), 19);
    assert_eq!(game.bank().remaining_road_pieces(), 59);
}

#[test]
fn test_seven_forces_robber_then_play_continues() {
    let mut game = new_game();

    let events = game.apply_roll(0, 3, 4).unwrap();
    assert!(events.iter().any(|e| matches!(
        e,
        GameEvent::DiceRolled { sum: 7, seven: true, .. }
    )));
    // With one other player holding cards, the steal is forced onto them
    assert!(events.iter().any(|e| matches!(
        e,
        GameEvent::ResourceStolen { thief: 0, victim: 1, .. }
    )));
    assert_eq!(game.phase(), TurnPhase::RobberPending);
    assert_conservation(&game);

    let desert = game
        .board()
        .tiles()
        .iter()
        .find(|t| t.is_desert())
        .unwrap()
        .coord;
    game.apply_action(0, GameAction::PlaceRobber(desert)).unwrap();
    assert_eq!(game.blocked_tile(), Some(desert));

    game.apply_action(0, GameAction::EndTurn).unwrap();
    assert_eq!(game.current_player(), 1);
}

#[test]
fn test_robber_block_moves_between_tiles() {
    let mut game = new_game();

    game.apply_roll(0, 3, 4).unwrap();
    let first = game.board().tiles()[0].coord;
    game.apply_action(0, GameAction::PlaceRobber(first)).unwrap();
    game.apply_action(0, GameAction::EndTurn).unwrap();

    game.apply_roll(1, 3, 4).unwrap();
    let second = game.board().tiles()[1].coord;
    game.apply_action(1, GameAction::PlaceRobber(second)).unwrap();

    assert_eq!(game.blocked_tile(), Some(second));
    assert_eq!(
        game.board().tiles().iter().filter(|t| t.blocked).count(),
        1,
        "only one tile may be blocked"
    );
}

#[test]
fn test_bank_trade_end_to_end() {
    let mut game = new_game();
    roll_quietly(&mut game);

    // The starting hand holds exactly 4 wood
    game.apply_action(
        0,
        GameAction::OfferTrade {
            give: (Resource::Wood, 4),
            want: (Resource::Stone, 1),
            with_bank: true,
        },
    )
    .unwrap();

    let hand = game.hand_snapshot(0).unwrap();
    assert_eq!(hand.wood, 0);
    assert_eq!(hand.stone, 1);
    assert_conservation(&game);

    // A second attempt has no wood behind it
    let err = game
        .apply_action(
            0,
            GameAction::OfferTrade {
                give: (Resource::Wood, 4),
                want: (Resource::Stone, 1),
                with_bank: true,
            },
        )
        .unwrap_err();
    assert_eq!(err, GameError::CannotAfford);
}

#[test]
fn test_peer_trade_lifecycle_across_turns() {
    let mut game = new_game();
    roll_quietly(&mut game);

    game.apply_action(
        0,
        GameAction::OfferTrade {
            give: (Resource::Brick, 1),
            want: (Resource::Sheep, 1),
            with_bank: false,
        },
    )
    .unwrap();
    game.apply_action(0, GameAction::EndTurn).unwrap();

    // Still pending during the other player's turn; they accept it
    assert_eq!(game.pending_trades().len(), 1);
    let offer_id = game.pending_trades()[0].id;
    roll_quietly(&mut game);
    game.apply_action(1, GameAction::AcceptTrade(offer_id)).unwrap();

    assert!(game.pending_trades().is_empty());
    let sender = game.hand_snapshot(0).unwrap();
    let accepter = game.hand_snapshot(1).unwrap();
    assert_eq!(sender.brick, 3);
    assert_eq!(sender.sheep, 3);
    assert_eq!(accepter.brick, 5);
    assert_eq!(accepter.sheep, 1);
    assert_conservation(&game);
}

#[test]
fn test_unaccepted_offer_expires_when_sender_turn_returns() {
    let mut game = new_game();
    roll_quietly(&mut game);
    game.apply_action(
        0,
        GameAction::OfferTrade {
            give: (Resource::Brick, 1),
            want: (Resource::Stone, 1),
            with_bank: false,
        },
    )
    .unwrap();
    game.apply_action(0, GameAction::EndTurn).unwrap();

    roll_quietly(&mut game);
    game.apply_action(1, GameAction::EndTurn).unwrap();

    assert!(game.pending_trades().is_empty());
    assert_eq!(
        game.apply_action(1, GameAction::AcceptTrade(0)).unwrap_err(),
        GameError::NoSuchOffer
    );
}

#[test]
fn test_victory_through_public_api() {
    let mut game = GameState::with_config(
        vec![PlayerColor::Red, PlayerColor::Blue],
        GameConfig {
            victory_target: 2,
            ..GameConfig::default()
        },
    )
    .unwrap();
    roll_quietly(&mut game);

    // The starting hand affords exactly two settlements; pick spots the
    // spacing policy allows
    game.apply_action(0, GameAction::BuildSettlement(0)).unwrap();
    let spot = (0..game.board().node_count())
        .find(|n| !game.blocked_nodes().contains(n))
        .unwrap();
    let events = game.apply_action(0, GameAction::BuildSettlement(spot)).unwrap();

    assert!(events
        .iter()
        .any(|e| matches!(e, GameEvent::GameWon { player: 0, .. })));
    assert_eq!(game.winner(), Some(0));
    assert_eq!(
        game.apply_action(0, GameAction::EndTurn).unwrap_err(),
        GameError::GameOver
    );
    assert_conservation(&game);
}

#[test]
fn test_rejections_do_not_leak_state() {
    let mut game = new_game();
    roll_quietly(&mut game);
    let snapshot = game.clone();

    let _ = game.apply_action(1, GameAction::EndTurn).unwrap_err();
    let _ = game
        .apply_action(0, GameAction::BuildSettlement(54))
        .unwrap_err();
    let _ = game
        .apply_action(
            0,
            GameAction::OfferTrade {
                give: (Resource::Stone, 4),
                want: (Resource::Wood, 1),
                with_bank: true,
            },
        )
        .unwrap_err();
    let _ = game.apply_action(0, GameAction::AcceptTrade(0)).unwrap_err();

    assert_eq!(game, snapshot);
}

#[test]
fn test_many_turns_stay_consistent() {
    let mut game = new_game();

    // Drive three full rounds with a build here and there
    for round in 0..3u8 {
        for _ in 0..game.player_count() {
            let player = game.current_player();
            let (d1, d2) = dice_for(4 + round);
            game.apply_roll(player, d1, d2).unwrap();

            // Opportunistic road building keeps the economy moving
            let spot = (0..game.board().node_count()).find_map(|a| {
                game.board()
                    .neighbors_of(a)
                    .into_iter()
                    .find(|&b| {
                        (0..game.player_count()).all(|p| {
                            game.buildings(p as PlayerId)
                                .unwrap()
                                .iter()
                                .all(|pl| {
                                    pl.kind != BuildingKind::Road
                                        || !(pl.node_a == a && pl.node_b == Some(b))
                                            && !(pl.node_a == b && pl.node_b == Some(a))
                                })
                        })
                    })
                    .map(|b| (a, b))
            });
            if let Some((a, b)) = spot {
                let _ = game.apply_action(player, GameAction::BuildRoad(a, b));
            }

            game.apply_action(player, GameAction::EndTurn).unwrap();
            assert_conservation(&game);
        }
    }

    assert_eq!(game.turn_number(), 1 + 3 * game.player_count() as u32);
}
