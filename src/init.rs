use crate::env::{env_non_empty, GCLOUD_LOG_LABEL_PREFIX_ENV, GCLOUD_LOG_LEVEL_ENV};
use crate::error::InitError;
use crate::layer::GCloudLayer;
use crate::sink::LogSink;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

/// Configuration of [`GCloudLayer`].
///
/// **Fields**
/// - `max_level`: most verbose level that is still written; more verbose
///   events are skipped.
/// - `label_prefix`: event fields whose name starts with this prefix are
///   emitted as Cloud Logging labels, with the prefix stripped
///   (`label.color = "blue"` becomes the `color` label). `tracing` macros
///   cannot combine `target:` with an unquoted dotted name; quote it
///   (`"label.color" = "blue"`) or use `event!` in that case.
/// - `error_field`: name of the field holding the attached error.
#[derive(Clone, Debug)]
pub struct LayerConfig {
    pub max_level: Level,
    pub label_prefix: String,
    pub error_field: String,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            max_level: Level::TRACE,
            label_prefix: "label.".to_string(),
            error_field: "error".to_string(),
        }
    }
}

impl LayerConfig {
    /// Read the configuration from `GCLOUD_LOG_LEVEL` and
    /// `GCLOUD_LOG_LABEL_PREFIX`, falling back to [`LayerConfig::default`]
    /// for anything missing, empty or unparsable.
    pub fn from_env() -> Self {
        Self::from_values(
            env_non_empty(GCLOUD_LOG_LEVEL_ENV).as_deref(),
            env_non_empty(GCLOUD_LOG_LABEL_PREFIX_ENV).as_deref(),
        )
    }

    /// An empty prefix would match every field, so it counts as unset.
    fn from_values(level: Option<&str>, label_prefix: Option<&str>) -> Self {
        let defaults = Self::default();
        let max_level = level
            .and_then(|level| level.trim().parse::<Level>().ok())
            .unwrap_or(defaults.max_level);
        let label_prefix = label_prefix
            .filter(|prefix| !prefix.is_empty())
            .map(str::to_string)
            .unwrap_or(defaults.label_prefix);

        Self { max_level, label_prefix, ..defaults }
    }
}

/// Initialize the global `tracing` subscriber using the provided sink and
/// [`LayerConfig`].
///
/// **Parameters**
/// - `sink`: implementation of [`LogSink`] that will receive every
///   [`LogEntry`](crate::record::LogEntry).
/// - `config`: [`LayerConfig`] controlling level threshold and field mapping.
///
/// **Errors**
///
/// Fails if a global default subscriber has already been installed.
pub fn init_tracing_with_config<S>(sink: S, config: LayerConfig) -> Result<(), InitError>
where
    S: LogSink + 'static,
{
    let layer = GCloudLayer::new(sink, config);
    let subscriber = Registry::default().with(layer);
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Initialize tracing with [`LayerConfig::from_env`].
///
/// This is the recommended entrypoint for services running on Cloud Run,
/// GKE or any other environment whose agent scrapes stdout.
pub fn init_tracing<S>(sink: S) -> Result<(), InitError>
where
    S: LogSink + 'static,
{
    init_tracing_with_config(sink, LayerConfig::from_env())
}
