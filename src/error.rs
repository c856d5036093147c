/// Error type returned by [`LogSink`](crate::sink::LogSink) implementations.
#[derive(thiserror::Error, Debug)]
pub enum SinkError {
    #[error("failed to serialize log output: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write log output: {0}")]
    Io(#[from] std::io::Error),

    #[error("log writer lock poisoned")]
    Poisoned,
}

/// Error type returned when installing the global subscriber.
#[derive(thiserror::Error, Debug)]
pub enum InitError {
    #[error("global tracing subscriber already set: {0}")]
    AlreadySet(#[from] tracing::subscriber::SetGlobalDefaultError),
}
