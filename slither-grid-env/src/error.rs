//! Errors of the grid environment.
use thiserror::Error;

/// Errors raised by the grid environment.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridEnvError {
    /// The action index is not one of the six axis moves.
    #[error("Invalid action index: {0}")]
    InvalidAction(u8),

    /// The configured grid cannot hold the snake, the target and all
    /// obstacles at once.
    #[error("Grid of volume {volume} cannot fit {required} occupied cells")]
    GridTooSmall {
        /// Number of cells of the grid.
        volume: usize,
        /// Cells needed by the initial snake, the target and the obstacles.
        required: usize,
    },

    /// Uniform sampling did not find a free cell within the retry budget.
    #[error("Could not find a free cell within {attempts} attempts")]
    SpawnExhausted {
        /// The exhausted retry budget.
        attempts: usize,
    },

    /// `step` was called on a finished episode.
    #[error("The episode is over; call reset")]
    EpisodeOver,
}
