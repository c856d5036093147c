use crate::payload::{DefaultPayloadBuilder, PayloadBuilder};
use crate::record::{EntryError, LogEntry, Loggable};
use crate::severity::level_to_severity;
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Key under which Cloud Logging expects structured labels.
pub const GCLOUD_LABEL_KEY: &str = "logging.googleapis.com/labels";

/// Label carrying the logger name.
pub const GCLOUD_LOGGER_NAME_KEY: &str = "loggerName";

/// Turns a [`LogEntry`] into a serializable document for one backend.
pub trait EntryFormatter: Send + Sync {
    type Output: Serialize;

    fn format(&self, entry: &LogEntry) -> Self::Output;
}

/// JSON line consumed by the Cloud Logging agent.
///
/// `log` hosts the original message when the entry carries an error; in that
/// case `message` holds the stack trace.
///
/// ref: <https://cloud.google.com/logging/docs/agent/logging/configuration#special-fields>
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GCloudLogOutput(Map<String, Value>);

impl GCloudLogOutput {
    pub fn severity(&self) -> Option<&str> {
        self.0.get("severity").and_then(Value::as_str)
    }

    pub fn message(&self) -> Option<&str> {
        self.0.get("message").and_then(Value::as_str)
    }

    pub fn time(&self) -> Option<&str> {
        self.0.get("time").and_then(Value::as_str)
    }

    pub fn log(&self) -> Option<&str> {
        self.0.get("log").and_then(Value::as_str)
    }

    pub fn labels(&self) -> Option<&Map<String, Value>> {
        self.0.get(GCLOUD_LABEL_KEY).and_then(Value::as_object)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }
}

impl From<GCloudLogOutput> for Value {
    fn from(output: GCloudLogOutput) -> Self {
        Value::Object(output.0)
    }
}

/// Format a [`LogEntry`] for Google Cloud Logging.
///
/// Fixed fields are written first and the payload is merged on top, so a
/// payload `severity`/`message`/`time` wins. The label map always replaces
/// whatever the payload had at [`GCLOUD_LABEL_KEY`], and error handling runs
/// last.
pub fn format_gcloud_log_output(entry: &LogEntry, builder: &dyn PayloadBuilder) -> GCloudLogOutput {
    let severity = level_to_severity(entry.level);
    let time = entry.time.to_rfc3339_opts(SecondsFormat::Millis, true);

    let mut labels: BTreeMap<String, String> = BTreeMap::new();
    let mut loggables: Vec<&Loggable> = Vec::new();

    for loggable in entry.loggables.iter().flatten() {
        match loggable.as_label() {
            Some(label) => {
                labels.insert(label.key().to_string(), label.value().to_string());
            }
            None => loggables.push(loggable),
        }
    }

    let mut payload = builder.build(&loggables, entry.data.as_ref(), &entry.values);

    // Set after extraction: a user label named `loggerName` is overwritten.
    labels.insert(GCLOUD_LOGGER_NAME_KEY.to_string(), entry.name.clone());

    payload.insert(
        GCLOUD_LABEL_KEY.to_string(),
        Value::Object(labels.into_iter().map(|(k, v)| (k, Value::String(v))).collect()),
    );

    let mut output = Map::new();
    output.insert("severity".to_string(), Value::String(severity.as_str().to_string()));
    output.insert("message".to_string(), Value::String(entry.message.clone()));
    output.insert("time".to_string(), Value::String(time));
    output.extend(payload);

    if let Some(error) = &entry.error {
        append_error(&mut output, error);
    }

    GCloudLogOutput(output)
}

/// Move the stack trace into `message` and keep the previous message as
/// `log`, unless it was just the error message again.
fn append_error(output: &mut Map<String, Value>, error: &EntryError) {
    let message = error.stack.clone().unwrap_or_else(|| error.message.clone());

    let log = output
        .insert("message".to_string(), Value::String(message))
        .unwrap_or(Value::Null);

    if log.as_str() != Some(error.message.as_str()) {
        output.insert("log".to_string(), log);
    }
}

/// [`EntryFormatter`] producing [`GCloudLogOutput`] documents.
#[derive(Clone)]
pub struct GCloudFormatter {
    builder: Arc<dyn PayloadBuilder>,
}

impl GCloudFormatter {
    pub fn new() -> Self {
        Self { builder: Arc::new(DefaultPayloadBuilder) }
    }

    /// Use a custom payload construction instead of [`DefaultPayloadBuilder`].
    pub fn with_payload_builder(builder: impl PayloadBuilder + 'static) -> Self {
        Self { builder: Arc::new(builder) }
    }
}

impl Default for GCloudFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl EntryFormatter for GCloudFormatter {
    type Output = GCloudLogOutput;

    fn format(&self, entry: &LogEntry) -> GCloudLogOutput {
        format_gcloud_log_output(entry, &*self.builder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Kv, Label, Tags};
    use crate::severity::LogLevel;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn entry(level: LogLevel, message: &str) -> LogEntry {
        LogEntry::new(level, "GLoggerTest", message)
            .at(Utc.with_ymd_and_hms(2023, 1, 20, 14, 37, 27).unwrap())
    }

    fn format(entry: &LogEntry) -> Value {
        GCloudFormatter::new().format(entry).into()
    }

    #[test]
    fn plain_entry_has_only_logger_name_label() {
        let out = format(&entry(LogLevel::INFO, "This is info log"));
        assert_eq!(
            out,
            json!({
                "severity": "INFO",
                "message": "This is info log",
                "time": "2023-01-20T14:37:27.000Z",
                "logging.googleapis.com/labels": { "loggerName": "GLoggerTest" },
            })
        );
    }

    #[test]
    fn labels_stay_out_of_payload() {
        let e = entry(LogLevel::DEBUG, "debugged").with_loggable(Label::new("color", "blue"));
        let out = format(&e);
        assert_eq!(out["severity"], "DEBUG");
        assert_eq!(
            out[GCLOUD_LABEL_KEY],
            json!({ "color": "blue", "loggerName": "GLoggerTest" })
        );
        assert!(out.get("color").is_none());
    }

    #[test]
    fn other_loggables_land_at_top_level() {
        let e = entry(LogLevel::WARNING, "warned")
            .with_loggable(Tags::of("os", ["mac", "linux", "win"]))
            .with_loggable(Kv::of("version", 16));
        let out = format(&e);
        assert_eq!(out["os"], json!(["mac", "linux", "win"]));
        assert_eq!(out["version"], json!(16));
        assert_eq!(out[GCLOUD_LABEL_KEY], json!({ "loggerName": "GLoggerTest" }));
    }

    #[test]
    fn error_with_stack_keeps_message_as_log() {
        let e = entry(LogLevel::ERROR, "Message for Ug7e0YpSNn").with_error(
            EntryError::new("Ug7e0YpSNn is not correct").with_stack("Error: Ug7e0YpSNn\n    at main"),
        );
        let out = format(&e);
        assert_eq!(out["message"], "Error: Ug7e0YpSNn\n    at main");
        assert_eq!(out["log"], "Message for Ug7e0YpSNn");
    }

    #[test]
    fn error_without_stack_and_same_message_has_no_log() {
        let e = entry(LogLevel::ERROR, "boom").with_error(EntryError::new("boom"));
        let out = format(&e);
        assert_eq!(out["message"], "boom");
        assert!(out.get("log").is_none());
    }

    #[test]
    fn error_without_stack_and_other_message_keeps_log() {
        let e = entry(LogLevel::ERROR, "while saving").with_error(EntryError::new("boom"));
        let out = format(&e);
        assert_eq!(out["message"], "boom");
        assert_eq!(out["log"], "while saving");
    }

    #[test]
    fn error_with_stack_and_same_message_has_no_log() {
        let e = entry(LogLevel::ERROR, "boom")
            .with_error(EntryError::new("boom").with_stack("boom\n    at main"));
        let out = format(&e);
        assert_eq!(out["message"], "boom\n    at main");
        assert!(out.get("log").is_none());
    }

    #[test]
    fn logger_name_overwrites_same_named_label() {
        // Documented quirk: the logger name is set after label extraction.
        let e = entry(LogLevel::INFO, "hi").with_loggable(Label::new("loggerName", "mine"));
        let out = format(&e);
        assert_eq!(out[GCLOUD_LABEL_KEY], json!({ "loggerName": "GLoggerTest" }));
    }

    #[test]
    fn payload_overrides_fixed_fields() {
        let e = entry(LogLevel::INFO, "original")
            .with_loggable(Kv::of("message", "from payload"))
            .with_loggable(Kv::of("severity", "custom"));
        let out = format(&e);
        assert_eq!(out["message"], "from payload");
        assert_eq!(out["severity"], "custom");
    }

    #[test]
    fn error_handling_wins_over_payload_message_and_log() {
        let e = entry(LogLevel::ERROR, "original")
            .with_loggable(Kv::of("message", "from payload"))
            .with_loggable(Kv::of("log", "payload log"))
            .with_error(EntryError::new("boom").with_stack("stack"));
        let out = format(&e);
        assert_eq!(out["message"], "stack");
        assert_eq!(out["log"], "from payload");
    }

    #[test]
    fn label_map_replaces_payload_label_key() {
        let e = entry(LogLevel::INFO, "hi").with_loggable(Kv::of(GCLOUD_LABEL_KEY, "oops"));
        let out = format(&e);
        assert_eq!(out[GCLOUD_LABEL_KEY], json!({ "loggerName": "GLoggerTest" }));
    }

    #[test]
    fn data_and_values_reach_the_output() {
        let mut data = Map::new();
        data.insert("email".into(), json!("xxx@example.com"));
        data.insert("version".into(), json!(1));

        let e = entry(LogLevel::INFO, "saml attributes")
            .with_data(data)
            .with_loggable(Kv::of("version", 2))
            .with_loggable(Label::new("color", "blue"))
            .with_value("ABC123")
            .with_value(7);
        let out = format(&e);
        assert_eq!(
            out,
            json!({
                "severity": "INFO",
                "message": "saml attributes",
                "time": "2023-01-20T14:37:27.000Z",
                "email": "xxx@example.com",
                "version": 2,
                "values": ["ABC123", 7],
                "logging.googleapis.com/labels": { "color": "blue", "loggerName": "GLoggerTest" },
            })
        );
    }

    #[test]
    fn custom_payload_builder_is_used() {
        let formatter = GCloudFormatter::with_payload_builder(
            |_: &[&Loggable], _: Option<&Map<String, Value>>, _: &[Value]| {
                let mut map = Map::new();
                map.insert("custom".into(), json!(true));
                map
            },
        );
        let out = formatter.format(&entry(LogLevel::INFO, "hi").with_loggable(Kv::of("a", 1)));
        assert_eq!(out.get("custom"), Some(&json!(true)));
        assert!(out.get("a").is_none());
        assert_eq!(out.labels().map(|l| l.len()), Some(1));
    }

    #[test]
    fn output_roundtrips_through_json() {
        let e = entry(LogLevel::PANIC, "OZKctzU91F means panic!")
            .with_error(EntryError::new("Panic error").with_stack("Error: Panic error\n    at x"))
            .with_loggable(Label::new("color", "purple"))
            .with_loggable(Tags::of("os", ["Darwin", "Windows"]))
            .with_loggable(Kv::of("kv with label", Label::new("weather", "sunny")))
            .with_loggable(Kv::of("ratio", 0.5));
        let out = GCloudFormatter::new().format(&e);

        let text = serde_json::to_string(&out).unwrap();
        let parsed: GCloudLogOutput = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, out);
        assert_eq!(parsed.severity(), Some("EMERGENCY"));
        assert_eq!(parsed.log(), Some("OZKctzU91F means panic!"));
        assert_eq!(parsed.time(), Some("2023-01-20T14:37:27.000Z"));
    }
}
