//! Environment variable names used by this crate for convenient
//! configuration of the layer from services.
//!
//! These are purely helpers; the formatter and sinks never read the
//! environment.

/// Most verbose level written, e.g. `info` or `DEBUG`.
pub const GCLOUD_LOG_LEVEL_ENV: &str = "GCLOUD_LOG_LEVEL";

/// Field-name prefix that marks an event field as a label.
pub const GCLOUD_LOG_LABEL_PREFIX_ENV: &str = "GCLOUD_LOG_LABEL_PREFIX";

/// Read an environment variable, treating set-but-empty the same as unset.
pub fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}
