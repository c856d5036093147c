use crate::error::SinkError;
use crate::record::LogEntry;

/// Destination for [`LogEntry`]s produced by the logging layer.
///
/// Implementations are responsible for formatting and writing entries to a
/// concrete output (stdout, a file, an in-memory buffer). The layer calls
/// `write` synchronously on the thread that emitted the event.
pub trait LogSink: Send + Sync {
    /// Write a single log entry.
    ///
    /// **Returns**
    /// - `Ok(())` if the entry was fully written.
    /// - `Err(..)` if formatting output could not be serialized or the
    ///   underlying writer failed. Nothing is retried.
    fn write(&self, entry: &LogEntry) -> Result<(), SinkError>;

    /// Flush the underlying writer, if it buffers.
    ///
    /// Default implementation is a no-op.
    fn flush(&self) -> Result<(), SinkError> {
        Ok(())
    }
}
