//! Dataset file loading and lenient field extraction.
//!
//! Curated datasets live as JSON documents inside the data directory. Some
//! of them are scraped from community sources and are loosely typed, so the
//! helpers here coerce missing or mistyped fields to empty defaults instead
//! of failing the whole load.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use super::errors::KnowledgeError;

/// Load and deserialize `<data_dir>/<name>`.
pub fn load_json<T: DeserializeOwned>(data_dir: &Path, name: &str) -> Result<T, KnowledgeError> {
    let path = data_dir.join(name);
    if !path.exists() {
        return Err(KnowledgeError::DatasetMissing {
            name: name.to_string(),
            path: path.display().to_string(),
        });
    }

    let raw = std::fs::read_to_string(&path).map_err(|e| KnowledgeError::DatasetRead {
        name: name.to_string(),
        reason: e.to_string(),
    })?;

    let parsed = serde_json::from_str(&raw).map_err(|e| KnowledgeError::DatasetParse {
        name: name.to_string(),
        reason: e.to_string(),
    })?;

    tracing::debug!(dataset = name, path = %path.display(), bytes = raw.len(), "loaded dataset");
    Ok(parsed)
}

/// Load a dataset that must be a top-level JSON array.
pub fn load_array(data_dir: &Path, name: &str) -> Result<Vec<Value>, KnowledgeError> {
    match load_json::<Value>(data_dir, name)? {
        Value::Array(items) => Ok(items),
        other => Err(KnowledgeError::DatasetParse {
            name: name.to_string(),
            reason: format!("expected a JSON array, found {}", json_kind(&other)),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ─── Lenient field access ───────────────────────────────────────────────────

/// Array stored under `key` of a dataset document, empty when absent.
pub fn array_section<'a>(payload: &'a Value, key: &str) -> &'a [Value] {
    match payload.get(key) {
        Some(Value::Array(items)) => items.as_slice(),
        _ => &[],
    }
}

/// Render a scalar as text; `null` and missing become the empty string.
pub fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// String field, or empty when absent.
pub fn text_field(entry: &Value, key: &str) -> String {
    entry.get(key).map(scalar_text).unwrap_or_default()
}

/// String field, `None` when absent, null or blank.
pub fn optional_text(entry: &Value, key: &str) -> Option<String> {
    let text = text_field(entry, key);
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// List of non-blank strings. A lone string becomes a one-element list.
pub fn text_list(entry: &Value, key: &str) -> Vec<String> {
    match entry.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .map(scalar_text)
            .filter(|s| !s.trim().is_empty())
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.clone()],
        _ => Vec::new(),
    }
}

/// Integer field, accepting numeric strings.
pub fn integer_field(entry: &Value, key: &str) -> Option<i64> {
    match entry.get(key)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Serde adapter accepting a string, number or null for a text field.
pub fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(scalar_text(&value))
}

/// Deep copy of `value` with every object's keys in sorted order.
pub fn sorted_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut sorted = Map::new();
            for key in keys {
                sorted.insert(key.clone(), sorted_keys(&map[key]));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(sorted_keys).collect()),
        other => other.clone(),
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn sorted_keys_recurses_into_arrays() {
        let sorted = sorted_keys(&json!({"b": [{"z": 1, "a": 2}], "a": null}));
        let rendered = serde_json::to_string(&sorted).unwrap();
        assert_eq!(rendered, r#"{"a":null,"b":[{"a":2,"z":1}]}"#);
    }

    #[test]
    fn missing_dataset_mentions_sync() {
        let dir = TempDir::new().unwrap();
        let err = load_json::<Value>(dir.path(), "essences.json").unwrap_err();
        assert!(matches!(err, KnowledgeError::DatasetMissing { .. }));
        assert!(err.to_string().contains("poe-kb sync"));
    }

    #[test]
    fn invalid_json_is_parse_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("bad.json"), "{ not json").unwrap();
        let err = load_json::<Value>(dir.path(), "bad.json").unwrap_err();
        assert!(matches!(err, KnowledgeError::DatasetParse { .. }));
    }

    #[test]
    fn load_array_rejects_objects() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("obj.json"), r#"{"a": 1}"#).unwrap();
        let err = load_array(dir.path(), "obj.json").unwrap_err();
        assert!(err.to_string().contains("expected a JSON array"));
    }

    #[test]
    fn lenient_accessors_coerce_loose_fields() {
        let entry = json!({
            "name": "  Jeweller's Orb ",
            "count": "3",
            "tags": ["socket", "", 4],
            "single": "only",
            "nothing": null
        });
        assert_eq!(optional_text(&entry, "name").as_deref(), Some("Jeweller's Orb"));
        assert_eq!(optional_text(&entry, "nothing"), None);
        assert_eq!(integer_field(&entry, "count"), Some(3));
        assert_eq!(text_list(&entry, "tags"), vec!["socket", "4"]);
        assert_eq!(text_list(&entry, "single"), vec!["only"]);
        assert!(text_list(&entry, "missing").is_empty());
        assert_eq!(text_field(&entry, "missing"), "");
    }
}
