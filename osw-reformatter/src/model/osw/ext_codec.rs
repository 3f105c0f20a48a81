use super::tag_value::{TagSet, TagValue};
use itertools::Itertools;
use serde_json::Value;

/// two-way codec for the `ext:` extension namespace. values that do not fit
/// the walkway schema are encoded into a canonical string under an escaped
/// key, and decoded back into a best-effort typed value on demand.
pub struct ExtensionCodec;

impl ExtensionCodec {
    pub const PREFIX: &'static str = "ext:";

    pub fn is_escaped(key: &str) -> bool {
        key.starts_with(Self::PREFIX)
    }

    /// escapes a key into the extension namespace. escaping an already
    /// escaped key returns it unchanged.
    pub fn escaped_key(key: &str) -> String {
        if Self::is_escaped(key) {
            String::from(key)
        } else {
            format!("{}{key}", Self::PREFIX)
        }
    }

    /// encodes a value into its canonical string form.
    ///
    /// text that holds a JSON object or array is re-serialized canonically;
    /// text that only looks like JSON (`{oops}`) is kept verbatim.
    pub fn encode(value: &TagValue) -> String {
        match value {
            TagValue::Text(s) => {
                let trimmed = s.trim();
                let json_like = (trimmed.starts_with('{') && trimmed.ends_with('}'))
                    || (trimmed.starts_with('[') && trimmed.ends_with(']'));
                if !json_like {
                    return s.clone();
                }
                match serde_json::from_str::<Value>(trimmed) {
                    Ok(parsed) if parsed.is_object() || parsed.is_array() => {
                        Self::canonical_json(&parsed)
                    }
                    _ => s.clone(),
                }
            }
            TagValue::Structured(v) => Self::canonical_json(v),
            other => other.to_string(),
        }
    }

    /// decodes a string into the most specific value it can represent.
    pub fn decode(s: &str) -> TagValue {
        let trimmed = s.trim();
        if let Ok(i) = trimmed.parse::<i64>() {
            return TagValue::Integer(i);
        }
        if let Ok(f) = trimmed.parse::<f64>() {
            return TagValue::Float(f);
        }
        if trimmed.starts_with('{') || trimmed.starts_with('[') {
            if let Ok(v) = serde_json::from_str::<Value>(trimmed) {
                if v.is_object() || v.is_array() {
                    return TagValue::Structured(v);
                }
            }
        }
        TagValue::Text(String::from(s))
    }

    /// serializes JSON with sorted object keys and `", "` / `": "` separators.
    pub fn canonical_json(value: &Value) -> String {
        match value {
            Value::Array(items) => {
                format!("[{}]", items.iter().map(Self::canonical_json).join(", "))
            }
            Value::Object(map) => {
                let entries = map
                    .iter()
                    .sorted_by(|(a, _), (b, _)| a.cmp(b))
                    .map(|(k, v)| {
                        let key = Value::String(k.clone()).to_string();
                        format!("{key}: {}", Self::canonical_json(v))
                    })
                    .join(", ");
                format!("{{{entries}}}")
            }
            other => other.to_string(),
        }
    }

    /// escapes `value` under `ext:<key>`. an extension tag already present in
    /// the target set wins, in which case false is returned.
    pub fn escape_into(tags: &mut TagSet, key: &str, value: &TagValue) -> bool {
        let escaped = Self::escaped_key(key);
        if tags.contains_key(&escaped) {
            log::debug!("extension tag '{escaped}' already present, not overwriting");
            return false;
        }
        tags.insert(escaped, TagValue::Text(Self::encode(value)));
        true
    }
}
