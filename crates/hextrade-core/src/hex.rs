//! Hex coordinates using the axial (q, r) system.
//!
//! Tiles are addressed by `HexCoord`; the six `Direction`s give the axial
//! offsets to neighboring tiles. Corner and edge identity is not expressed
//! here - the board builder assigns integer node IDs while it walks the
//! tile grid (see [`crate::board`]).
//!
//! We use axial coordinates because they make neighbor calculations elegant
//! and avoid the wasted space of offset coordinates.

use serde::{Deserialize, Serialize};

/// Axial coordinate for a hex tile.
///
/// - `q` increases going east (right)
/// - `r` increases going southeast
/// - The implicit third coordinate satisfies q + r + s = 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct HexCoord {
    /// Column (increases going east)
    pub q: i32,
    /// Row (increases going southeast)
    pub r: i32,
}

impl HexCoord {
    /// Create a new hex coordinate
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Get the neighbor in a specific direction
    pub fn neighbor(self, direction: Direction) -> HexCoord {
        let (dq, dr) = direction.offset();
        HexCoord::new(self.q + dq, self.r + dr)
    }

    /// The six neighboring hexes, in [`Direction::ALL`] order
    pub fn neighbors(self) -> [HexCoord; 6] {
        Direction::ALL.map(|dir| self.neighbor(dir))
    }
}

/// One of the six neighbor directions on the axial hex grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Displacement (1, -1)
    NorthEast,
    /// Displacement (1, 0)
    East,
    /// Displacement (0, 1)
    SouthEast,
    /// Displacement (-1, 1)
    SouthWest,
    /// Displacement (-1, 0)
    West,
    /// Displacement (0, -1)
    NorthWest,
}

impl Direction {
    /// All directions in clockwise order starting from NorthEast
    pub const ALL: [Direction; 6] = [
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    /// The (dq, dr) axial displacement of this direction
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Direction::NorthEast => (1, -1),
            Direction::East => (1, 0),
            Direction::SouthEast => (0, 1),
            Direction::SouthWest => (-1, 1),
            Direction::West => (-1, 0),
            Direction::NorthWest => (0, -1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_neighbors_are_unique() {
        let center = HexCoord::new(0, 0);
        let unique: HashSet<_> = center.neighbors().into_iter().collect();
        assert_eq!(unique.len(), 6);
    }

    #[test]
    fn test_opposite_directions_cancel() {
        let start = HexCoord::new(2, -3);
        let pairs = [
            (Direction::East, Direction::West),
            (Direction::NorthEast, Direction::SouthWest),
            (Direction::NorthWest, Direction::SouthEast),
        ];
        for (there, back) in pairs {
            assert_eq!(start.neighbor(there).neighbor(back), start);
        }
    }

    #[test]
    fn test_offsets_sum_to_zero_on_axial_axes() {
        // Every direction keeps q + r + s = 0 since s absorbs the change
        for dir in Direction::ALL {
            let (dq, dr) = dir.offset();
            assert!(dq.abs() <= 1 && dr.abs() <= 1);
            assert!((dq + dr).abs() <= 1);
        }
    }
}
