use super::Record;

/// Writes a record to an output destination.
///
/// Records arriving here are already aggregated per episode, so the trait is
/// a single sink method; what "writing" means is up to the implementation.
pub trait Recorder {
    /// Write a record to the [`Recorder`].
    fn write(&mut self, record: Record);
}
