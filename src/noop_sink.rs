use crate::error::SinkError;
use crate::format::{EntryFormatter, GCloudFormatter};
use crate::record::LogEntry;
use crate::sink::LogSink;

/// A sink that formats every entry and then drops it.
///
/// Useful for measuring the cost of the layer and the formatter without any
/// I/O, and for tests that don't care about the written bytes.
#[derive(Clone, Default)]
pub struct NoopSink {
    formatter: GCloudFormatter,
}

impl LogSink for NoopSink {
    fn write(&self, entry: &LogEntry) -> Result<(), SinkError> {
        std::hint::black_box(self.formatter.format(entry));
        Ok(())
    }
}
