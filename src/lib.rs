pub mod severity;
pub mod record;
pub mod payload;
pub mod format;
pub mod error;
pub mod sink;
pub mod gcloud;
pub mod layer;

pub mod env;
pub mod init;
pub mod noop_sink;

pub use format::{format_gcloud_log_output, EntryFormatter, GCloudFormatter, GCloudLogOutput};
pub use gcloud::{GCloudSink, JsonLineSink};
pub use record::{EntryError, Kv, Label, LogEntry, Loggable, Tags};
pub use severity::{level_to_severity, LogLevel, Severity};
