use std::io;

use serde::Serialize;
use tracing::{error, info};
use tracing_gcloud_sink::{
    format::EntryFormatter,
    init::init_tracing,
    level_to_severity,
    JsonLineSink, LogEntry,
};

/// Example of targeting a different backend by implementing
/// `EntryFormatter` directly. The sink, layer and level mapping are reused;
/// only the document shape changes.
struct CompactFormatter;

#[derive(Serialize)]
struct CompactLine {
    lvl: &'static str,
    logger: String,
    msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    err: Option<String>,
}

impl EntryFormatter for CompactFormatter {
    type Output = CompactLine;

    fn format(&self, entry: &LogEntry) -> CompactLine {
        CompactLine {
            lvl: level_to_severity(entry.level).as_str(),
            logger: entry.name.clone(),
            msg: entry.message.clone(),
            err: entry.error.as_ref().map(|e| e.message.clone()),
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing(JsonLineSink::new(CompactFormatter, io::stderr()))?;

    info!("custom formatter example started");
    error!(error = "disk full", "simulated error sent via custom formatter");

    Ok(())
}
