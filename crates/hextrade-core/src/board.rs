//! Board graph generation and queries.
//!
//! This module contains:
//! - Resource and terrain types
//! - Tile and node/edge graph construction for an arbitrary board radius
//! - The symmetric road-slot adjacency matrix
//! - Robber (blocked tile) bookkeeping
//!
//! Corners shared by neighboring tiles resolve to a single integer
//! [`NodeId`]; IDs are handed out sequentially as tiles are visited in a
//! fixed row-major traversal, so a board of a given radius always has the
//! same graph shape regardless of the resource shuffle.

use crate::hex::{Direction, HexCoord};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Identifier of a settlement corner, unique across the whole board.
pub type NodeId = usize;

/// The five producing resource kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resource {
    Wood,
    Sheep,
    Wheat,
    Brick,
    Stone,
}

impl Resource {
    /// All resource kinds, in the order tiles cycle through them
    pub const ALL: [Resource; 5] = [
        Resource::Wood,
        Resource::Sheep,
        Resource::Wheat,
        Resource::Brick,
        Resource::Stone,
    ];

    /// Human-readable name for display
    pub fn display_name(&self) -> &'static str {
        match self {
            Resource::Wood => "Wood",
            Resource::Sheep => "Sheep",
            Resource::Wheat => "Wheat",
            Resource::Brick => "Brick",
            Resource::Stone => "Stone",
        }
    }
}

/// What a tile yields when its number is rolled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Terrain {
    /// Produces the given resource
    Producing(Resource),
    /// The desert - never produces, carries dice number 0
    Desert,
}

/// A single hex tile of the generated board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    /// Position on the hex grid
    pub coord: HexCoord,
    /// What this tile yields
    pub terrain: Terrain,
    /// Dice number that triggers production (2-12 excluding 7; 0 for desert)
    pub dice_number: u8,
    /// The six corner nodes, clockwise
    pub corners: [NodeId; 6],
    /// Whether the robber currently blocks production here
    pub blocked: bool,
}

impl Tile {
    /// The resource this tile produces, if any
    pub fn resource(&self) -> Option<Resource> {
        match self.terrain {
            Terrain::Producing(r) => Some(r),
            Terrain::Desert => None,
        }
    }

    /// True for the desert tile
    pub fn is_desert(&self) -> bool {
        matches!(self.terrain, Terrain::Desert)
    }
}

/// Canonical dice-number distribution for an 18-tile producing layout.
/// Boards with more producing tiles cycle through the shuffled list again.
const DICE_NUMBERS: [u8; 18] = [2, 3, 3, 4, 4, 5, 5, 6, 6, 8, 8, 9, 9, 10, 10, 11, 11, 12];

/// Neighbor directions whose tiles have already been visited when the grid
/// is walked row-major, paired with the corner slots both tiles share.
/// Entries are `(my corner slot, neighbor corner slot)`.
const VISITED_NEIGHBORS: [(Direction, [(usize, usize); 2]); 3] = [
    (Direction::NorthWest, [(5, 3), (0, 2)]),
    (Direction::NorthEast, [(0, 4), (1, 3)]),
    (Direction::West, [(4, 2), (5, 1)]),
];

/// The generated board: tiles plus the deduplicated corner/edge graph.
///
/// Built once at game start; the only field that changes afterwards is the
/// per-tile `blocked` flag moved around by the robber.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardGraph {
    /// Tiles in traversal order
    tiles: Vec<Tile>,
    /// Total number of corner nodes
    node_count: usize,
    /// Symmetric road-slot matrix: `adjacency[a][b]` iff a road can join a and b
    adjacency: Vec<Vec<bool>>,
}

impl BoardGraph {
    /// Build a board of the given radius with a random resource/number layout.
    ///
    /// Radius 0 yields an empty board (no tiles, no nodes).
    pub fn build(radius: u32) -> Self {
        Self::build_with_rng(radius, &mut rand::thread_rng())
    }

    /// Build with a caller-provided RNG for deterministic layouts.
    pub fn build_with_rng<R: Rng>(radius: u32, rng: &mut R) -> Self {
        let coords = tile_coords(radius);
        let node_count = nodes_for_radius(radius);
        let mut adjacency = vec![vec![false; node_count]; node_count];
        let mut tiles: Vec<Tile> = Vec::with_capacity(coords.len());
        let mut index_of: HashMap<HexCoord, usize> = HashMap::with_capacity(coords.len());

        let mut terrain_pool = terrain_pool(coords.len());
        let mut numbers = DICE_NUMBERS.to_vec();
        numbers.shuffle(rng);
        let mut numbers_used = 0usize;

        let mut next_node: NodeId = 0;
        for coord in coords {
            let mut corners: [Option<NodeId>; 6] = [None; 6];

            // Reuse corner IDs from the three neighbors visited before us
            for (dir, shared) in VISITED_NEIGHBORS {
                if let Some(&t) = index_of.get(&coord.neighbor(dir)) {
                    for (mine, theirs) in shared {
                        corners[mine] = Some(tiles[t].corners[theirs]);
                    }
                }
            }

            // Fresh IDs for the rest; record the edge to each settled neighbor slot
            for slot in 0..corners.len() {
                if corners[slot].is_none() {
                    corners[slot] = Some(next_node);
                    for other_slot in [(slot + 1) % 6, (slot + 5) % 6] {
                        if let Some(other) = corners[other_slot] {
                            adjacency[next_node][other] = true;
                            adjacency[other][next_node] = true;
                        }
                    }
                    next_node += 1;
                }
            }
            let corners = corners.map(|c| c.unwrap());

            let terrain = terrain_pool.remove(rng.gen_range(0..terrain_pool.len()));
            let dice_number = match terrain {
                Terrain::Desert => 0,
                Terrain::Producing(_) => {
                    let n = numbers[numbers_used % numbers.len()];
                    numbers_used += 1;
                    n
                }
            };

            index_of.insert(coord, tiles.len());
            tiles.push(Tile {
                coord,
                terrain,
                dice_number,
                corners,
                blocked: false,
            });
        }

        Self {
            tiles,
            node_count,
            adjacency,
        }
    }

    // ==================== Query Methods ====================

    /// All tiles in traversal order
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Look up a tile by coordinate
    pub fn tile(&self, coord: HexCoord) -> Option<&Tile> {
        self.tiles.iter().find(|t| t.coord == coord)
    }

    /// Number of tiles on the board
    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Number of corner nodes on the board
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Whether a node ID exists on this board
    pub fn contains_node(&self, node: NodeId) -> bool {
        node < self.node_count
    }

    /// Whether a road slot joins the two nodes
    pub fn nodes_adjacent(&self, a: NodeId, b: NodeId) -> bool {
        self.contains_node(a) && self.contains_node(b) && self.adjacency[a][b]
    }

    /// All nodes one road slot away from the given node
    pub fn neighbors_of(&self, node: NodeId) -> Vec<NodeId> {
        if !self.contains_node(node) {
            return Vec::new();
        }
        self.adjacency[node]
            .iter()
            .enumerate()
            .filter_map(|(other, &linked)| linked.then_some(other))
            .collect()
    }

    /// The full symmetric road-slot matrix
    pub fn adjacency_matrix(&self) -> &[Vec<bool>] {
        &self.adjacency
    }

    /// Coordinate of the currently blocked tile, if the robber has been placed
    pub fn blocked_tile(&self) -> Option<HexCoord> {
        self.tiles.iter().find(|t| t.blocked).map(|t| t.coord)
    }

    // ==================== Mutation Methods ====================

    /// Move the robber: unblock every tile, then block the one at `coord`.
    ///
    /// Returns false (and changes nothing) if no tile has that coordinate.
    pub fn place_robber(&mut self, coord: HexCoord) -> bool {
        if !self.tiles.iter().any(|t| t.coord == coord) {
            return false;
        }
        for tile in &mut self.tiles {
            tile.blocked = tile.coord == coord;
        }
        true
    }
}

/// Total corner nodes for a board of the given radius:
/// nodes(n) = nodes(n-1) + 6 * (2n - 1), nodes(0) = 0.
fn nodes_for_radius(radius: u32) -> usize {
    (1..=radius as usize).map(|ring| (2 * ring - 1) * 6).sum()
}

/// Axial coordinates of all tiles within the radius, row-major:
/// every (q, r) with |q|, |r| < radius and |q + r| < radius.
fn tile_coords(radius: u32) -> Vec<HexCoord> {
    let r = radius as i32;
    let mut coords = Vec::new();
    for row in (1 - r)..r {
        for col in (1 - r)..r {
            if (row + col).abs() < r {
                coords.push(HexCoord::new(col, row));
            }
        }
    }
    coords
}

/// The terrain draw pool: `tile_count - 1` producing tiles cycling the five
/// kinds, plus exactly one desert.
fn terrain_pool(tile_count: usize) -> Vec<Terrain> {
    let mut pool: Vec<Terrain> = (0..tile_count.saturating_sub(1))
        .map(|i| Terrain::Producing(Resource::ALL[i % Resource::ALL.len()]))
        .collect();
    if tile_count > 0 {
        pool.push(Terrain::Desert);
    }
    pool
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn test_tile_counts_per_radius() {
        assert_eq!(BoardGraph::build(1).tile_count(), 1);
        assert_eq!(BoardGraph::build(2).tile_count(), 7);
        assert_eq!(BoardGraph::build(3).tile_count(), 19);
        assert_eq!(BoardGraph::build(4).tile_count(), 37);
    }

    #[test]
    fn test_node_counts_per_radius() {
        assert_eq!(BoardGraph::build(1).node_count(), 6);
        assert_eq!(BoardGraph::build(2).node_count(), 24);
        assert_eq!(BoardGraph::build(3).node_count(), 54);
    }

    #[test]
    fn test_radius_zero_is_empty() {
        let board = BoardGraph::build(0);
        assert_eq!(board.tile_count(), 0);
        assert_eq!(board.node_count(), 0);
        assert!(board.blocked_tile().is_none());
    }

    #[test]
    fn test_exactly_one_desert_with_number_zero() {
        for radius in 1..=4 {
            let board = BoardGraph::build(radius);
            let deserts: Vec<_> = board.tiles().iter().filter(|t| t.is_desert()).collect();
            assert_eq!(deserts.len(), 1, "radius {} board needs one desert", radius);
            assert_eq!(deserts[0].dice_number, 0);
        }
    }

    #[test]
    fn test_dice_numbers_are_canonical_permutation() {
        let board = BoardGraph::build(3);
        let mut numbers: Vec<u8> = board
            .tiles()
            .iter()
            .filter(|t| !t.is_desert())
            .map(|t| t.dice_number)
            .collect();
        numbers.sort_unstable();
        let mut expected = DICE_NUMBERS.to_vec();
        expected.sort_unstable();
        assert_eq!(numbers, expected);
    }

    #[test]
    fn test_producing_kinds_cycle_evenly() {
        let board = BoardGraph::build(3);
        for kind in Resource::ALL {
            let count = board
                .tiles()
                .iter()
                .filter(|t| t.resource() == Some(kind))
                .count();
            // 18 producing tiles cycling 5 kinds: 3 or 4 of each
            assert!((3..=4).contains(&count), "{:?} appeared {} times", kind, count);
        }
    }

    #[test]
    fn test_adjacency_symmetric_without_self_loops() {
        let board = BoardGraph::build(3);
        let n = board.node_count();
        for a in 0..n {
            assert!(!board.nodes_adjacent(a, a), "self loop at {}", a);
            for b in 0..n {
                assert_eq!(board.nodes_adjacent(a, b), board.nodes_adjacent(b, a));
            }
        }
    }

    #[test]
    fn test_node_degrees_are_two_or_three() {
        let board = BoardGraph::build(3);
        for node in 0..board.node_count() {
            let degree = board.neighbors_of(node).len();
            assert!((2..=3).contains(&degree), "node {} has degree {}", node, degree);
        }
    }

    #[test]
    fn test_radius_three_road_slot_count() {
        let board = BoardGraph::build(3);
        let edges: usize = (0..board.node_count())
            .map(|n| board.neighbors_of(n).len())
            .sum::<usize>()
            / 2;
        assert_eq!(edges, 72);
    }

    #[test]
    fn test_corner_ids_in_range_and_distinct_per_tile() {
        let board = BoardGraph::build(3);
        for tile in board.tiles() {
            let unique: HashSet<_> = tile.corners.iter().collect();
            assert_eq!(unique.len(), 6);
            for &corner in &tile.corners {
                assert!(board.contains_node(corner));
            }
        }
    }

    #[test]
    fn test_every_node_id_is_used() {
        let board = BoardGraph::build(3);
        let used: HashSet<NodeId> = board
            .tiles()
            .iter()
            .flat_map(|t| t.corners.iter().copied())
            .collect();
        assert_eq!(used.len(), board.node_count());
    }

    #[test]
    fn test_neighboring_tiles_share_two_corners() {
        let board = BoardGraph::build(3);
        for tile in board.tiles() {
            for neighbor_coord in tile.coord.neighbors() {
                if let Some(neighbor) = board.tile(neighbor_coord) {
                    let mine: HashSet<_> = tile.corners.iter().collect();
                    let shared = neighbor.corners.iter().filter(|c| mine.contains(c)).count();
                    assert_eq!(
                        shared, 2,
                        "tiles {:?} and {:?} share {} corners",
                        tile.coord, neighbor_coord, shared
                    );
                }
            }
        }
    }

    #[test]
    fn test_tile_corners_form_a_cycle() {
        let board = BoardGraph::build(2);
        for tile in board.tiles() {
            for slot in 0..6 {
                let a = tile.corners[slot];
                let b = tile.corners[(slot + 1) % 6];
                assert!(
                    board.nodes_adjacent(a, b),
                    "corners {} and {} of tile {:?} not linked",
                    a,
                    b,
                    tile.coord
                );
            }
        }
    }

    #[test]
    fn test_same_seed_same_layout() {
        let a = BoardGraph::build_with_rng(3, &mut StdRng::seed_from_u64(7));
        let b = BoardGraph::build_with_rng(3, &mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
    }

    #[test]
    fn test_place_robber_moves_single_block() {
        let mut board = BoardGraph::build(2);
        let first = board.tiles()[0].coord;
        let second = board.tiles()[1].coord;

        assert!(board.place_robber(first));
        assert_eq!(board.blocked_tile(), Some(first));

        assert!(board.place_robber(second));
        assert_eq!(board.blocked_tile(), Some(second));
        assert_eq!(board.tiles().iter().filter(|t| t.blocked).count(), 1);
    }

    #[test]
    fn test_place_robber_rejects_unknown_tile() {
        let mut board = BoardGraph::build(1);
        assert!(!board.place_robber(HexCoord::new(9, 9)));
        assert!(board.blocked_tile().is_none());
    }
}
