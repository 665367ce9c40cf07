//! Grid coordinates.
use std::ops::Add;

/// A cell of the grid.
///
/// Coordinates are signed so that a move off the low edge is representable
/// and caught by the bounds check, rather than wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pos3 {
    /// X coordinate.
    pub x: i32,
    /// Y coordinate.
    pub y: i32,
    /// Z coordinate.
    pub z: i32,
}

impl Pos3 {
    /// Creates a position.
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Returns `true` if the position lies inside a grid of the given size.
    pub fn is_inside(&self, size: [usize; 3]) -> bool {
        self.x >= 0
            && self.y >= 0
            && self.z >= 0
            && self.x < size[0] as i32
            && self.y < size[1] as i32
            && self.z < size[2] as i32
    }
}

impl Add for Pos3 {
    type Output = Pos3;

    fn add(self, rhs: Pos3) -> Pos3 {
        Pos3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

/// Unit moves of the six actions, indexed by action: `+x`, `-x`, `+y`, `-y`,
/// `+z`, `-z`.
pub const MOVE_DIRS: [Pos3; 6] = [
    Pos3::new(1, 0, 0),
    Pos3::new(-1, 0, 0),
    Pos3::new(0, 1, 0),
    Pos3::new(0, -1, 0),
    Pos3::new(0, 0, 1),
    Pos3::new(0, 0, -1),
];
