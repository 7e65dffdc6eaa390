//! Coordinate system for the Siedler board.
//!
//! Fields, corners and edges share a single integer grid:
//! - `Coord`: a point on the grid, either a field center or a corner
//! - `EdgeCoord`: an unordered pair of adjacent corners where roads are placed
//!
//! Field centers sit on rows `y = 2, 5, 8, ...`. Rows with `(y - 2) % 6 == 0`
//! use even columns, the others use odd columns. Every corner is a fixed
//! offset from a field center, so a point never needs a type tag: whether it
//! is a field or a corner follows from the board built on top of it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Offsets from a field center to its six corners, clockwise from the top.
pub const CORNER_OFFSETS: [(i32, i32); 6] = [(0, -2), (1, -1), (1, 1), (0, 2), (-1, 1), (-1, -1)];

/// A point on the board grid.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct Coord {
    /// Column
    pub x: i32,
    /// Row (increases going down)
    pub y: i32,
}

impl Coord {
    /// Create a new coordinate
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Shift this coordinate by a delta, `None` if it leaves the `i32` range
    pub const fn offset(&self, dx: i32, dy: i32) -> Option<Self> {
        match (self.x.checked_add(dx), self.y.checked_add(dy)) {
            (Some(x), Some(y)) => Some(Self::new(x, y)),
            _ => None,
        }
    }

    /// Whether this point lies on the lattice of field centers.
    ///
    /// This is purely geometric; the board decides which centers exist.
    pub fn is_field_center(&self) -> bool {
        if self.y < 2 || (self.y - 2).rem_euclid(3) != 0 {
            return false;
        }
        if (self.y - 2).rem_euclid(6) == 0 {
            self.x >= 2 && self.x.rem_euclid(2) == 0
        } else {
            self.x >= 1 && self.x.rem_euclid(2) == 1
        }
    }

    /// The six corners of the field centered here, clockwise from the top
    pub fn field_corners(&self) -> Option<[Coord; 6]> {
        let mut corners = [*self; 6];
        for (corner, (dx, dy)) in corners.iter_mut().zip(CORNER_OFFSETS) {
            *corner = self.offset(dx, dy)?;
        }
        Some(corners)
    }

    /// Whether `other` is one road length away from this corner
    pub fn is_adjacent_corner(&self, other: &Coord) -> bool {
        let dx = self.x.abs_diff(other.x);
        let dy = self.y.abs_diff(other.y);
        (dx == 1 && dy == 1) || (dx == 0 && dy == 2)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Edge coordinate - the unordered pair of corners a road connects.
///
/// Stored in canonical form (smaller endpoint first) so that `(a, b)` and
/// `(b, a)` compare and hash equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeCoord {
    a: Coord,
    b: Coord,
}

impl EdgeCoord {
    /// Create an edge between two corners (order does not matter)
    pub fn new(from: Coord, to: Coord) -> Self {
        if from <= to {
            Self { a: from, b: to }
        } else {
            Self { a: to, b: from }
        }
    }

    /// Both endpoints, smaller first
    pub fn endpoints(&self) -> [Coord; 2] {
        [self.a, self.b]
    }

    /// Whether the two endpoints are geometrically one step apart
    pub fn is_geometric(&self) -> bool {
        self.a.is_adjacent_corner(&self.b)
    }
}

impl fmt::Display for EdgeCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.a, self.b)
    }
}
