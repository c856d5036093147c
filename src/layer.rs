use crate::init::LayerConfig;
use crate::record::{EntryError, Kv, Label, LogEntry, Loggable};
use crate::severity::LogLevel;
use crate::sink::LogSink;
use chrono::Utc;
use serde_json::Value;
use std::error::Error;
use std::sync::{Arc, atomic::{AtomicU64, Ordering}};
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

/// `tracing_subscriber` layer that turns events into [`LogEntry`]s and
/// hands them to a [`LogSink`] on the emitting thread.
///
/// Fields named with the configured label prefix become labels, the
/// configured error field becomes the entry error, and everything else is
/// forwarded as key/value payload.
pub struct GCloudLayer<S> {
    sink: S,
    config: LayerConfig,
    /// Total events seen by the layer (before filtering by level).
    pub total_events: Arc<AtomicU64>,
    /// Successfully written by the sink.
    pub written_events: Arc<AtomicU64>,
    /// Rejected by the sink.
    pub failed_events: Arc<AtomicU64>,
}

impl<S: LogSink> GCloudLayer<S> {
    pub fn new(sink: S, config: LayerConfig) -> Self {
        Self {
            sink,
            config,
            total_events: Arc::new(AtomicU64::new(0)),
            written_events: Arc::new(AtomicU64::new(0)),
            failed_events: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Build the entry for an event without writing it.
    pub fn entry_for(&self, event: &Event<'_>) -> LogEntry {
        let mut visitor = FieldVisitor::new(&self.config);
        event.record(&mut visitor);

        let meta = event.metadata();
        let message = match (visitor.message, &visitor.error) {
            (Some(message), _) => message,
            (None, Some(error)) => error.message.clone(),
            (None, None) => String::new(),
        };

        LogEntry {
            level: LogLevel::from(*meta.level()),
            message,
            time: Utc::now(),
            name: meta.target().to_string(),
            error: visitor.error,
            loggables: Some(visitor.loggables),
            data: None,
            values: Vec::new(),
        }
    }
}

impl<S, R> Layer<R> for GCloudLayer<S>
where
    S: LogSink + 'static,
    R: Subscriber + for<'span> LookupSpan<'span>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, R>) {
        self.total_events.fetch_add(1, Ordering::Relaxed);
        if *event.metadata().level() > self.config.max_level {
            return;
        }

        let entry = self.entry_for(event);
        match self.sink.write(&entry) {
            Ok(()) => {
                self.written_events.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                self.failed_events.fetch_add(1, Ordering::Relaxed);
                eprintln!("gcloud log sink write failed: {}", e);
            }
        }
    }
}

pub struct FieldVisitor<'a> {
    config: &'a LayerConfig,
    pub message: Option<String>,
    pub error: Option<EntryError>,
    pub loggables: Vec<Loggable>,
}

impl<'a> FieldVisitor<'a> {
    pub fn new(config: &'a LayerConfig) -> Self {
        Self { config, message: None, error: None, loggables: Vec::new() }
    }

    /// An empty prefix marks nothing as a label.
    fn label_key<'n>(&self, name: &'n str) -> Option<&'n str> {
        let prefix = self.config.label_prefix.as_str();
        if prefix.is_empty() {
            return None;
        }
        name.strip_prefix(prefix)
    }

    fn push(&mut self, field: &Field, value: Value) {
        let name = field.name();
        if name == "message" {
            self.message = Some(into_text(value));
        } else if name == self.config.error_field {
            self.error = Some(EntryError::new(into_text(value)));
        } else if let Some(key) = self.label_key(name) {
            self.loggables.push(Label::new(key, into_text(value)).into());
        } else {
            self.loggables.push(Kv::of(name, value).into());
        }
    }
}

/// Labels are strings; non-string values use their JSON text.
fn into_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

impl<'a> Visit for FieldVisitor<'a> {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.push(field, Value::String(value.to_string()));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.push(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.push(field, Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.push(field, Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.push(field, Value::from(value));
    }

    fn record_error(&mut self, field: &Field, value: &(dyn Error + 'static)) {
        if field.name() == self.config.error_field {
            self.error = Some(EntryError::from_error(value));
        } else {
            self.push(field, Value::String(value.to_string()));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.push(field, Value::String(format!("{:?}", value)));
    }
}
