use crate::record::Loggable;
use serde_json::{Map, Value};

/// Builds the JSON payload from the annotations that are not labels plus the
/// auxiliary `data`/`values` of an entry.
///
/// Any `Fn(&[&Loggable], Option<&Map<String, Value>>, &[Value]) -> Map<String, Value>`
/// closure is a `PayloadBuilder`, so callers can swap the merge rules
/// without touching the formatter.
pub trait PayloadBuilder: Send + Sync {
    fn build(
        &self,
        loggables: &[&Loggable],
        data: Option<&Map<String, Value>>,
        values: &[Value],
    ) -> Map<String, Value>;
}

impl<F> PayloadBuilder for F
where
    F: Fn(&[&Loggable], Option<&Map<String, Value>>, &[Value]) -> Map<String, Value> + Send + Sync,
{
    fn build(
        &self,
        loggables: &[&Loggable],
        data: Option<&Map<String, Value>>,
        values: &[Value],
    ) -> Map<String, Value> {
        self(loggables, data, values)
    }
}

/// Key holding the positional `values` of an entry.
pub const VALUES_KEY: &str = "values";

/// Merges `data`, then each loggable in order, then `values` under
/// [`VALUES_KEY`] when non-empty. Later keys win.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPayloadBuilder;

impl PayloadBuilder for DefaultPayloadBuilder {
    fn build(
        &self,
        loggables: &[&Loggable],
        data: Option<&Map<String, Value>>,
        values: &[Value],
    ) -> Map<String, Value> {
        let mut payload = data.cloned().unwrap_or_default();

        for loggable in loggables {
            let (key, value) = loggable.to_json();
            payload.insert(key, value);
        }

        if !values.is_empty() {
            payload.insert(VALUES_KEY.to_string(), Value::Array(values.to_vec()));
        }

        payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Kv, Tags};
    use serde_json::json;

    #[test]
    fn loggables_override_data() {
        let mut data = Map::new();
        data.insert("version".into(), json!(1));
        data.insert("region".into(), json!("eu"));

        let kv = Loggable::from(Kv::of("version", 2));
        let tags = Loggable::from(Tags::of("os", ["mac"]));

        let payload = DefaultPayloadBuilder.build(&[&kv, &tags], Some(&data), &[]);
        assert_eq!(
            Value::Object(payload),
            json!({ "version": 2, "region": "eu", "os": ["mac"] })
        );
    }

    #[test]
    fn values_only_when_present() {
        let payload = DefaultPayloadBuilder.build(&[], None, &[]);
        assert!(payload.is_empty());

        let payload = DefaultPayloadBuilder.build(&[], None, &[json!(1), json!("two")]);
        assert_eq!(Value::Object(payload), json!({ "values": [1, "two"] }));
    }

    #[test]
    fn closures_are_builders() {
        let builder = |loggables: &[&Loggable], _: Option<&Map<String, Value>>, _: &[Value]| {
            let mut map = Map::new();
            map.insert("count".into(), json!(loggables.len()));
            map
        };
        let kv = Loggable::from(Kv::of("a", 1));
        assert_eq!(builder.build(&[&kv], None, &[])["count"], json!(1));
    }
}
