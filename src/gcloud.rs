use crate::error::SinkError;
use crate::format::{EntryFormatter, GCloudFormatter};
use crate::record::LogEntry;
use crate::sink::LogSink;
use std::io::{self, Write};
use std::sync::Mutex;

/// Sink that formats each entry and writes it as one line of JSON.
///
/// The writer is locked for the whole line, so concurrent callers never
/// interleave partial documents. There is no buffering or retry beyond what
/// the writer itself does.
pub struct JsonLineSink<F, W> {
    formatter: F,
    writer: Mutex<W>,
}

/// Google Cloud Logging destination: the agent picks JSON lines up from
/// stdout by default.
pub type GCloudSink<W = io::Stdout> = JsonLineSink<GCloudFormatter, W>;

impl GCloudSink<io::Stdout> {
    pub fn stdout() -> Self {
        JsonLineSink::new(GCloudFormatter::new(), io::stdout())
    }
}

impl<F, W> JsonLineSink<F, W>
where
    F: EntryFormatter,
    W: Write + Send,
{
    /// **Parameters**
    /// - `formatter`: maps entries to the backend document shape.
    /// - `writer`: output stream, one JSON document per line.
    pub fn new(formatter: F, writer: W) -> Self {
        Self { formatter, writer: Mutex::new(writer) }
    }

    /// Format an entry without writing it.
    pub fn format_output(&self, entry: &LogEntry) -> F::Output {
        self.formatter.format(entry)
    }

    /// Consume the sink and hand back the writer.
    pub fn into_writer(self) -> Result<W, SinkError> {
        self.writer.into_inner().map_err(|_| SinkError::Poisoned)
    }
}

impl<F, W> LogSink for JsonLineSink<F, W>
where
    F: EntryFormatter,
    W: Write + Send,
{
    fn write(&self, entry: &LogEntry) -> Result<(), SinkError> {
        let output = self.format_output(entry);
        let mut line = serde_json::to_vec(&output)?;
        line.push(b'\n');

        let mut writer = self.writer.lock().map_err(|_| SinkError::Poisoned)?;
        writer.write_all(&line)?;
        Ok(())
    }

    fn flush(&self) -> Result<(), SinkError> {
        let mut writer = self.writer.lock().map_err(|_| SinkError::Poisoned)?;
        writer.flush()?;
        Ok(())
    }
}
