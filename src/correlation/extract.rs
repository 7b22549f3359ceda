// src/correlation/extract.rs
// Probing completion payloads for the voice platform's conversation id

use serde_json::Value;

use super::types::ExternalId;

/// Field names the voice platform has been seen to use, in probe order
pub const DEFAULT_ID_FIELDS: &[&str] = &[
    "conversation_id",
    "conversationId",
    "call_id",
    "session_id",
    "user_id",
    "user",
];

/// Objects the id may be nested under
pub const DEFAULT_CONTAINERS: &[&str] = &["metadata", "extra_body", "elevenlabs_extra_body"];

/// One way of pulling an external id out of a request payload
pub trait IdExtractor: Send + Sync {
    fn extract(&self, payload: &Value) -> Option<ExternalId>;

    fn describe(&self) -> String;
}

/// Reads a top-level field
#[derive(Debug, Clone)]
pub struct TopLevelField {
    pub field: String,
}

impl IdExtractor for TopLevelField {
    fn extract(&self, payload: &Value) -> Option<ExternalId> {
        payload.get(&self.field).and_then(id_from_value)
    }

    fn describe(&self) -> String {
        self.field.clone()
    }
}

/// Reads a field inside a nested object
#[derive(Debug, Clone)]
pub struct NestedField {
    pub container: String,
    pub field: String,
}

impl IdExtractor for NestedField {
    fn extract(&self, payload: &Value) -> Option<ExternalId> {
        payload
            .get(&self.container)
            .and_then(|inner| inner.get(&self.field))
            .and_then(id_from_value)
    }

    fn describe(&self) -> String {
        format!("{}.{}", self.container, self.field)
    }
}

/// Strings and integers count as ids; anything else is treated as absent
fn id_from_value(value: &Value) -> Option<ExternalId> {
    match value {
        Value::String(s) => ExternalId::parse(s),
        Value::Number(n) if n.is_i64() || n.is_u64() => ExternalId::parse(&n.to_string()),
        _ => None,
    }
}

/// Ordered list of extraction strategies; the first hit wins
pub struct IdProbe {
    strategies: Vec<Box<dyn IdExtractor>>,
}

impl Default for IdProbe {
    fn default() -> Self {
        Self::with_fields(DEFAULT_ID_FIELDS, DEFAULT_CONTAINERS)
    }
}

impl IdProbe {
    pub fn new(strategies: Vec<Box<dyn IdExtractor>>) -> Self {
        Self { strategies }
    }

    /// All top-level fields first, then each container with every field
    pub fn with_fields<S: AsRef<str>>(fields: &[S], containers: &[S]) -> Self {
        let mut strategies: Vec<Box<dyn IdExtractor>> = fields
            .iter()
            .map(|f| {
                Box::new(TopLevelField {
                    field: f.as_ref().to_string(),
                }) as Box<dyn IdExtractor>
            })
            .collect();

        for container in containers {
            for field in fields {
                strategies.push(Box::new(NestedField {
                    container: container.as_ref().to_string(),
                    field: field.as_ref().to_string(),
                }));
            }
        }

        Self { strategies }
    }

    pub fn probe(&self, payload: &Value) -> Option<ExternalId> {
        self.strategies.iter().find_map(|s| s.extract(payload))
    }

    /// Header value (if usable) takes priority over the payload
    pub fn probe_with_header(&self, header: Option<&str>, payload: &Value) -> Option<ExternalId> {
        header
            .and_then(ExternalId::parse)
            .or_else(|| self.probe(payload))
    }

    pub fn describe(&self) -> Vec<String> {
        self.strategies.iter().map(|s| s.describe()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // ========================================================================
    // Individual strategies
    // ========================================================================

    #[test]
    fn test_top_level_string() {
        let s = TopLevelField {
            field: "conversation_id".into(),
        };
        let id = s.extract(&json!({"conversation_id": "conv_1"})).unwrap();
        assert_eq!(id.as_str(), "conv_1");
    }

    #[test]
    fn test_top_level_integer() {
        let s = TopLevelField {
            field: "call_id".into(),
        };
        assert_eq!(s.extract(&json!({"call_id": 42})).unwrap().as_str(), "42");
    }

    #[test]
    fn test_malformed_values_are_absent() {
        let s = TopLevelField {
            field: "user".into(),
        };
        assert!(s.extract(&json!({"user": ""})).is_none());
        assert!(s.extract(&json!({"user": null})).is_none());
        assert!(s.extract(&json!({"user": {"id": "x"}})).is_none());
        assert!(s.extract(&json!({"user": 1.5})).is_none());
        assert!(s.extract(&json!({})).is_none());
    }

    #[test]
    fn test_nested_field() {
        let s = NestedField {
            container: "elevenlabs_extra_body".into(),
            field: "conversation_id".into(),
        };
        let payload = json!({"elevenlabs_extra_body": {"conversation_id": "abc"}});
        assert_eq!(s.extract(&payload).unwrap().as_str(), "abc");
        assert!(s.extract(&json!({"elevenlabs_extra_body": "abc"})).is_none());
        assert_eq!(s.describe(), "elevenlabs_extra_body.conversation_id");
    }

    // ========================================================================
    // Probe ordering
    // ========================================================================

    #[test]
    fn test_top_level_beats_nested() {
        let probe = IdProbe::default();
        let payload = json!({
            "metadata": {"conversation_id": "nested"},
            "user": "top"
        });
        assert_eq!(probe.probe(&payload).unwrap().as_str(), "top");
    }

    #[test]
    fn test_field_order_respected() {
        let probe = IdProbe::default();
        let payload = json!({"user": "u", "conversation_id": "c"});
        assert_eq!(probe.probe(&payload).unwrap().as_str(), "c");
    }

    #[test]
    fn test_blank_field_falls_through_to_next() {
        let probe = IdProbe::default();
        let payload = json!({"conversation_id": " ", "call_id": "call_9"});
        assert_eq!(probe.probe(&payload).unwrap().as_str(), "call_9");
    }

    #[test]
    fn test_header_takes_priority() {
        let probe = IdProbe::default();
        let payload = json!({"conversation_id": "body"});
        assert_eq!(
            probe.probe_with_header(Some("hdr"), &payload).unwrap().as_str(),
            "hdr"
        );
        assert_eq!(
            probe.probe_with_header(Some(""), &payload).unwrap().as_str(),
            "body"
        );
    }

    #[test]
    fn test_nothing_found() {
        let probe = IdProbe::default();
        assert!(probe.probe(&json!({"messages": []})).is_none());
    }

    #[test]
    fn test_describe_lists_strategies_in_order() {
        let probe = IdProbe::with_fields(&["a", "b"], &["m"]);
        assert_eq!(probe.describe(), vec!["a", "b", "m.a", "m.b"]);
    }
}
