use serde::Serialize;
use std::fmt;

/// Ordinal log level as produced by the upstream logging facility.
///
/// Only the named constants have a dedicated severity; any other ordinal is
/// still a valid level and is reported as [`Severity::Info`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct LogLevel(pub u16);

impl LogLevel {
    pub const DEBUG: LogLevel = LogLevel(100);
    pub const INFO: LogLevel = LogLevel(200);
    pub const WARNING: LogLevel = LogLevel(400);
    pub const ERROR: LogLevel = LogLevel(500);
    pub const PANIC: LogLevel = LogLevel(600);
}

impl From<tracing::Level> for LogLevel {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::ERROR => LogLevel::ERROR,
            tracing::Level::WARN => LogLevel::WARNING,
            tracing::Level::INFO => LogLevel::INFO,
            // Cloud Logging has nothing below DEBUG.
            _ => LogLevel::DEBUG,
        }
    }
}

/// Severity values understood by Google Cloud Logging.
///
/// ref: <https://cloud.google.com/logging/docs/reference/v2/rest/v2/LogEntry#logseverity>
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Emergency,
    Error,
    Warning,
    Info,
    Debug,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Emergency => "EMERGENCY",
            Severity::Error => "ERROR",
            Severity::Warning => "WARNING",
            Severity::Info => "INFO",
            Severity::Debug => "DEBUG",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Convert a log level to a Cloud Logging severity.
///
/// Any level without a named constant is reported as `INFO`, including
/// ordinals that sit between two named levels.
pub fn level_to_severity(level: LogLevel) -> Severity {
    match level {
        LogLevel::PANIC => Severity::Emergency,
        LogLevel::ERROR => Severity::Error,
        LogLevel::WARNING => Severity::Warning,
        LogLevel::INFO => Severity::Info,
        LogLevel::DEBUG => Severity::Debug,
        _ => Severity::Info,
    }
}
