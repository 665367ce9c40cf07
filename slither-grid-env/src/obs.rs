//! Observation of the grid environment.
use slither_core::Obs;

/// Cell value of an empty cell.
pub const CELL_FREE: f32 = 0.0;
/// Cell value of a snake body segment.
pub const CELL_BODY: f32 = 0.5;
/// Cell value of the target.
pub const CELL_TARGET: f32 = 1.0;
/// Cell value of an obstacle.
pub const CELL_OBSTACLE: f32 = -1.0;

/// Observation of the grid environment.
///
/// The whole grid flattened row-major over `(x, y, z)`: the cell `(x, y, z)`
/// of a grid of size `[sx, sy, sz]` lands at index `(x * sy + y) * sz + z`.
/// Cells hold the sentinel values [`CELL_BODY`], [`CELL_TARGET`],
/// [`CELL_OBSTACLE`] and [`CELL_FREE`]; by the spawn invariants these
/// entities never share a cell, so the sentinels never collide.
///
/// Every observation is a fresh snapshot owned by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct GridObs {
    /// Flattened cell values.
    pub data: Vec<f32>,
}

impl Obs for GridObs {
    fn dim(&self) -> usize {
        self.data.len()
    }
}

impl From<Vec<f32>> for GridObs {
    fn from(data: Vec<f32>) -> Self {
        Self { data }
    }
}

impl From<GridObs> for Vec<f32> {
    fn from(obs: GridObs) -> Vec<f32> {
        obs.data
    }
}
