use super::ext_codec::ExtensionCodec;
use serde::Serialize;
use std::{collections::BTreeMap, fmt::Display};

/// tags of a single entity or feature. keys are kept sorted so that any
/// serialized form of a tag set is byte-stable.
pub type TagSet = BTreeMap<String, TagValue>;

/// a tag value. raw OSM tags always enter as [`TagValue::Text`], normalization
/// may produce typed values, and GeoJSON properties may carry any of them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TagValue {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    Structured(serde_json::Value),
}

impl TagValue {
    /// reads a JSON property value. null values carry no information and
    /// yield None.
    pub fn from_json(value: &serde_json::Value) -> Option<TagValue> {
        use serde_json::Value;
        match value {
            Value::Null => None,
            Value::Bool(b) => Some(TagValue::Boolean(*b)),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Some(TagValue::Integer(i)),
                None => n.as_f64().map(TagValue::Float),
            },
            Value::String(s) => Some(TagValue::Text(s.clone())),
            Value::Array(_) | Value::Object(_) => Some(TagValue::Structured(value.clone())),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value;
        match self {
            TagValue::Boolean(b) => Value::Bool(*b),
            TagValue::Integer(i) => Value::from(*i),
            TagValue::Float(f) => Value::from(*f),
            TagValue::Text(s) => Value::String(s.clone()),
            TagValue::Structured(v) => v.clone(),
        }
    }

    /// the string content of a text value
    pub fn as_text(&self) -> Option<&str> {
        match self {
            TagValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// numeric content of this value, parsing text when needed.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            TagValue::Integer(i) => Some(*i as f64),
            TagValue::Float(f) => Some(*f),
            TagValue::Text(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }
}

/// renders a float the way the OSW tooling has always written numbers
/// into tag values: integral values keep a trailing `.0`.
pub fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

impl Display for TagValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TagValue::Boolean(true) => write!(f, "yes"),
            TagValue::Boolean(false) => write!(f, "no"),
            TagValue::Integer(i) => write!(f, "{i}"),
            TagValue::Float(v) => write!(f, "{}", format_float(*v)),
            TagValue::Text(s) => write!(f, "{s}"),
            TagValue::Structured(v) => write!(f, "{}", ExtensionCodec::canonical_json(v)),
        }
    }
}

impl From<&str> for TagValue {
    fn from(value: &str) -> Self {
        TagValue::Text(String::from(value))
    }
}

impl From<String> for TagValue {
    fn from(value: String) -> Self {
        TagValue::Text(value)
    }
}

impl From<f64> for TagValue {
    fn from(value: f64) -> Self {
        TagValue::Float(value)
    }
}

impl From<i64> for TagValue {
    fn from(value: i64) -> Self {
        TagValue::Integer(value)
    }
}

/// builds a tag set of text values from string pairs
pub fn text_tags<'a, I>(pairs: I) -> TagSet
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (String::from(k), TagValue::from(v)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{format_float, TagValue};
    use serde_json::json;

    #[test]
    fn test_format_float() {
        assert_eq!(format_float(3.0), "3.0");
        assert_eq!(format_float(0.0), "0.0");
        assert_eq!(format_float(0.1), "0.1");
        assert_eq!(format_float(1.525), "1.525");
    }

    #[test]
    fn test_from_json() {
        assert_eq!(TagValue::from_json(&json!(null)), None);
        assert_eq!(TagValue::from_json(&json!(4)), Some(TagValue::Integer(4)));
        assert_eq!(TagValue::from_json(&json!(1.5)), Some(TagValue::Float(1.5)));
        assert_eq!(
            TagValue::from_json(&json!("x")),
            Some(TagValue::Text(String::from("x")))
        );
        match TagValue::from_json(&json!({"a": 1})) {
            Some(TagValue::Structured(v)) => assert_eq!(v, json!({"a": 1})),
            other => panic!("expected structured value, found {other:?}"),
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(TagValue::Float(10.0).to_string(), "10.0");
        assert_eq!(TagValue::Boolean(true).to_string(), "yes");
        assert_eq!(TagValue::Integer(12).to_string(), "12");
    }
}
