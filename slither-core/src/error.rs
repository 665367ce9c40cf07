//! Errors in the library.
use thiserror::Error;

/// Errors raised by this crate.
#[derive(Debug, Error)]
pub enum SlitherError {
    /// No record entry for the given key.
    #[error("Record key error: {0}")]
    RecordKeyError(String),

    /// A record entry had an unexpected value type.
    #[error("Record value type error: {0}")]
    RecordValueTypeError(String),

    /// A return or loss became NaN or infinite during training.
    #[error("Non-finite value of {what} at episode {episode}")]
    NonFiniteValue {
        /// Name of the offending quantity.
        what: String,
        /// Episode at which the value was produced.
        episode: usize,
    },

    /// A configuration value was out of its valid range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
