use crate::severity::LogLevel;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::Write as _;

/// A single structured log call, as handed over by the logging facility.
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    pub time: DateTime<Utc>,
    /// Logger identifier, reported as the `loggerName` label.
    pub name: String,
    pub error: Option<EntryError>,
    pub loggables: Option<Vec<Loggable>>,
    pub data: Option<Map<String, Value>>,
    pub values: Vec<Value>,
}

impl LogEntry {
    pub fn new(level: LogLevel, name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            time: Utc::now(),
            name: name.into(),
            error: None,
            loggables: None,
            data: None,
            values: Vec::new(),
        }
    }

    pub fn at(mut self, time: DateTime<Utc>) -> Self {
        self.time = time;
        self
    }

    pub fn with_error(mut self, error: EntryError) -> Self {
        self.error = Some(error);
        self
    }

    pub fn with_loggable(mut self, loggable: impl Into<Loggable>) -> Self {
        self.loggables.get_or_insert_with(Vec::new).push(loggable.into());
        self
    }

    pub fn with_data(mut self, data: Map<String, Value>) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.values.push(value.into());
        self
    }
}

/// Error attached to a log entry. This is data, not a formatting failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryError {
    pub message: String,
    pub stack: Option<String>,
}

impl EntryError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into(), stack: None }
    }

    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    /// Build from a Rust error.
    ///
    /// The stack is the error followed by its `source()` chain, and is only
    /// set when there is at least one source.
    pub fn from_error(error: &(dyn Error + 'static)) -> Self {
        let message = error.to_string();
        let mut source = error.source();
        if source.is_none() {
            return Self::new(message);
        }

        let mut stack = format!("{}\n\nCaused by:", message);
        let mut depth = 0;
        while let Some(cause) = source {
            let _ = write!(stack, "\n    {}: {}", depth, cause);
            depth += 1;
            source = cause.source();
        }
        Self { message, stack: Some(stack) }
    }
}

/// Structured annotation attached to a log call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Loggable {
    Label(Label),
    Tags(Tags),
    Kv(Kv),
}

impl Loggable {
    /// Returns the label if this annotation is meant for the label map.
    pub fn as_label(&self) -> Option<&Label> {
        match self {
            Loggable::Label(label) => Some(label),
            _ => None,
        }
    }

    /// Key/value contribution of this annotation to the JSON payload.
    pub fn to_json(&self) -> (String, Value) {
        match self {
            Loggable::Label(label) => (label.key.clone(), Value::String(label.value.clone())),
            Loggable::Tags(tags) => (
                tags.key.clone(),
                Value::Array(tags.values.iter().cloned().map(Value::String).collect()),
            ),
            Loggable::Kv(kv) => (kv.key.clone(), kv.value.clone()),
        }
    }
}

/// String label, emitted under `logging.googleapis.com/labels`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Label {
    key: String,
    value: String,
}

impl Label {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self { key: key.into(), value: value.into() }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

impl From<Label> for Loggable {
    fn from(label: Label) -> Self {
        Loggable::Label(label)
    }
}

/// Nested labels render as a one-entry object.
impl From<Label> for Value {
    fn from(label: Label) -> Self {
        let mut map = Map::new();
        map.insert(label.key, Value::String(label.value));
        Value::Object(map)
    }
}

/// A key with a list of string tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tags {
    pub key: String,
    pub values: Vec<String>,
}

impl Tags {
    pub fn of<I, T>(key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self { key: key.into(), values: values.into_iter().map(Into::into).collect() }
    }
}

impl From<Tags> for Loggable {
    fn from(tags: Tags) -> Self {
        Loggable::Tags(tags)
    }
}

/// Arbitrary JSON value under a key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kv {
    pub key: String,
    pub value: Value,
}

impl Kv {
    pub fn of(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self { key: key.into(), value: value.into() }
    }
}

impl From<Kv> for Loggable {
    fn from(kv: Kv) -> Self {
        Loggable::Kv(kv)
    }
}
