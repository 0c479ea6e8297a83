//! Integer cell coordinates and facing directions.
//!
//! The host world is a voxel grid. A [`Position`] names one cell; all
//! offset helpers use checked arithmetic and return `None` instead of
//! wrapping at the edges of the `i32` range.

use serde::{Deserialize, Serialize};

/// A single cell in the host world grid. `y` is the vertical axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    /// East-west coordinate.
    pub x: i32,
    /// Vertical coordinate.
    pub y: i32,
    /// North-south coordinate.
    pub z: i32,
}

impl Position {
    /// Create a position from its three coordinates.
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Offset this position by the given deltas.
    ///
    /// Returns `None` if any coordinate would overflow.
    pub const fn offset(self, dx: i32, dy: i32, dz: i32) -> Option<Self> {
        let Some(x) = self.x.checked_add(dx) else {
            return None;
        };
        let Some(y) = self.y.checked_add(dy) else {
            return None;
        };
        let Some(z) = self.z.checked_add(dz) else {
            return None;
        };
        Some(Self { x, y, z })
    }

    /// The cell `distance` steps away in `direction`.
    pub const fn relative(self, direction: Direction, distance: i32) -> Option<Self> {
        let (dx, dy, dz) = direction.unit();
        let (Some(dx), Some(dy), Some(dz)) = (
            dx.checked_mul(distance),
            dy.checked_mul(distance),
            dz.checked_mul(distance),
        ) else {
            return None;
        };
        self.offset(dx, dy, dz)
    }

    /// The cell directly above.
    pub const fn above(self) -> Option<Self> {
        self.offset(0, 1, 0)
    }

    /// The cell directly below.
    pub const fn below(self) -> Option<Self> {
        self.offset(0, -1, 0)
    }

    /// Squared euclidean distance to `other`, widened to `i64` and
    /// saturating at `i64::MAX`.
    pub fn distance_sq(self, other: Self) -> i64 {
        let dx = i64::from(self.x).saturating_sub(i64::from(other.x));
        let dy = i64::from(self.y).saturating_sub(i64::from(other.y));
        let dz = i64::from(self.z).saturating_sub(i64::from(other.z));
        dx.saturating_mul(dx)
            .saturating_add(dy.saturating_mul(dy))
            .saturating_add(dz.saturating_mul(dz))
    }
}

impl core::fmt::Display for Position {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// One of the six faces of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Negative `z`.
    North,
    /// Positive `z`.
    South,
    /// Positive `x`.
    East,
    /// Negative `x`.
    West,
    /// Positive `y`.
    Up,
    /// Negative `y`.
    Down,
}

impl Direction {
    /// The four horizontal directions in a fixed order.
    pub const HORIZONTAL: [Self; 4] = [Self::North, Self::East, Self::South, Self::West];

    /// Unit vector `(dx, dy, dz)` for this direction.
    pub const fn unit(self) -> (i32, i32, i32) {
        match self {
            Self::North => (0, 0, -1),
            Self::South => (0, 0, 1),
            Self::East => (1, 0, 0),
            Self::West => (-1, 0, 0),
            Self::Up => (0, 1, 0),
            Self::Down => (0, -1, 0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn above_and_below_are_inverse() {
        let p = Position::new(3, 64, -7);
        assert_eq!(p.above().and_then(Position::below), Some(p));
    }

    #[test]
    fn offset_overflow_is_none() {
        let p = Position::new(i32::MAX, 0, 0);
        assert!(p.offset(1, 0, 0).is_none());
        assert!(p.relative(Direction::East, 1).is_none());
    }

    #[test]
    fn relative_moves_by_distance() {
        let p = Position::new(0, 0, 0);
        assert_eq!(p.relative(Direction::North, 2), Some(Position::new(0, 0, -2)));
        assert_eq!(p.relative(Direction::West, 1), Some(Position::new(-1, 0, 0)));
    }

    #[test]
    fn distance_sq_saturates_at_extremes() {
        let a = Position::new(i32::MIN, i32::MIN, 0);
        let b = Position::new(i32::MAX, i32::MAX, 0);
        assert_eq!(a.distance_sq(b), i64::MAX);
        assert_eq!(Position::new(1, 2, 3).distance_sq(Position::new(4, 6, 3)), 25);
    }
}
