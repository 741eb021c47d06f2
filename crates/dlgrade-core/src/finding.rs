//! Finding identifiers reported by the analyzer.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// An opaque finding identifier.
///
/// The analyzer decides the shape (usually a short JSON tuple). Two findings
/// are equal when their canonical JSON text is equal; object keys are sorted
/// and whitespace is dropped.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FindingId(String);

impl FindingId {
    /// Build a finding from a parsed JSON value.
    pub fn from_value(value: &Value) -> Self {
        FindingId(value.to_string())
    }

    /// Canonical JSON text of this finding.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse the canonical text back into a JSON value.
    pub fn to_value(&self) -> Value {
        serde_json::from_str(&self.0).unwrap_or_else(|_| Value::String(self.0.clone()))
    }
}

impl From<Value> for FindingId {
    fn from(value: Value) -> Self {
        FindingId::from_value(&value)
    }
}

impl From<&str> for FindingId {
    fn from(s: &str) -> Self {
        FindingId::from_value(&Value::String(s.to_string()))
    }
}

impl fmt::Display for FindingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for FindingId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for FindingId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(FindingId::from_value(&value))
    }
}

/// Parse a JSON document that must be an array of findings.
///
/// Order and duplicates are preserved.
pub fn parse_finding_array(text: &str) -> Result<Vec<FindingId>, String> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Array(items)) => Ok(items.iter().map(FindingId::from_value).collect()),
        Ok(other) => Err(format!("expected a JSON array, found {}", json_type_name(&other))),
        Err(e) => Err(e.to_string()),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_whitespace_does_not_matter() {
        let a = parse_finding_array(r#"[["main", 3]]"#).unwrap();
        let b = parse_finding_array(r#"[["main",3]]"#).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_object_key_order_does_not_matter() {
        let a = FindingId::from(json!({"line": 3, "fn": "main"}));
        let b: FindingId = serde_json::from_str(r#"{"fn":"main","line":3}"#).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_string_and_array_are_distinct() {
        assert_ne!(FindingId::from("a"), FindingId::from(json!(["a"])));
    }

    #[test]
    fn test_duplicates_are_preserved() {
        let findings = parse_finding_array(r#"["a", "a", "b"]"#).unwrap();
        assert_eq!(findings.len(), 3);
    }

    #[test]
    fn test_non_array_rejected() {
        let err = parse_finding_array(r#"{"a": 1}"#).unwrap_err();
        assert!(err.contains("an object"));
        assert!(parse_finding_array("not json").is_err());
    }

    #[test]
    fn test_serializes_as_original_json() {
        let finding = FindingId::from(json!(["main", 3]));
        assert_eq!(serde_json::to_value(&finding).unwrap(), json!(["main", 3]));
    }
}
