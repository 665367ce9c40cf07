//! Errors of the candle agents.
use thiserror::Error;

/// Errors raised by the agents in this crate.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CandleAgentError {
    /// An observation did not match the model's input width.
    ///
    /// The agent never reshapes or pads observations; a mismatch is a
    /// contract violation between the environment and the model config.
    #[error("Observation has {got} elements, the model expects {expected}")]
    ObsDimMismatch {
        /// Input width of the model.
        expected: usize,
        /// Flat element count of the offending observation.
        got: usize,
    },

    /// The actor and critic configurations disagree on the input width.
    #[error("Actor input width {actor} differs from critic input width {critic}")]
    HeadInputMismatch {
        /// Input width of the actor head.
        actor: usize,
        /// Input width of the critic head.
        critic: usize,
    },
}
