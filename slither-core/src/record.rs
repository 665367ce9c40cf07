//! Types for recording training metrics.
//!
//! A [`Record`] is a string-keyed map of loosely typed values produced
//! during training and evaluation, one per episode in practice. A
//! [`Recorder`] is the sink the [`Trainer`](crate::Trainer) writes records
//! to; [`BufferedRecorder`] keeps them in memory for later inspection and
//! [`NullRecorder`] discards them.
//!
//! ```rust
//! use slither_core::record::{Record, RecordValue};
//!
//! let mut record = Record::empty();
//! record.insert("episode", RecordValue::Scalar(1.0));
//! record.insert("episode_return", RecordValue::Scalar(-0.53));
//! assert_eq!(record.get_scalar("episode").unwrap(), 1.0);
//! ```
mod base;
mod buffered_recorder;
mod null_recorder;
mod recorder;

pub use base::{Record, RecordValue};
pub use buffered_recorder::BufferedRecorder;
pub use null_recorder::NullRecorder;
pub use recorder::Recorder;
