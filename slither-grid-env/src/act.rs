//! Action of the grid environment.
use slither_core::Act;

/// Action of the grid environment: the index of an axis move.
///
/// Valid indices are `0..6`, in the order `+x`, `-x`, `+y`, `-y`, `+z`,
/// `-z`. The environment rejects anything else with an error instead of
/// clamping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridAct {
    /// Action index.
    pub act: u8,
}

impl GridAct {
    /// Constructs an action from its index.
    pub fn new(act: u8) -> Self {
        Self { act }
    }
}

impl Act for GridAct {}

impl From<u8> for GridAct {
    fn from(act: u8) -> Self {
        Self { act }
    }
}

impl From<GridAct> for u8 {
    fn from(a: GridAct) -> u8 {
        a.act
    }
}
