use super::{ext_codec::ExtensionCodec, tag_value::TagValue};

/// target type and validation rule of a schema field
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    /// any scalar, rendered as text
    Text,
    /// a finite number
    Float,
    /// a whole number
    Integer,
    /// a finite number, optionally written with a trailing percent sign
    Incline,
    /// text from a closed vocabulary
    Enumerated(&'static [&'static str]),
    /// a value the subtype forces
    Fixed(&'static str),
}

/// what happens to a value that fails validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidValuePolicy {
    Drop,
    Escape,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    pub key: &'static str,
    pub kind: FieldKind,
    pub on_invalid: InvalidValuePolicy,
    pub default: Option<&'static str>,
}

impl FieldSpec {
    pub const fn text(key: &'static str) -> FieldSpec {
        FieldSpec {
            key,
            kind: FieldKind::Text,
            on_invalid: InvalidValuePolicy::Escape,
            default: None,
        }
    }

    pub const fn float(key: &'static str) -> FieldSpec {
        FieldSpec {
            key,
            kind: FieldKind::Float,
            on_invalid: InvalidValuePolicy::Drop,
            default: None,
        }
    }

    pub const fn integer(key: &'static str) -> FieldSpec {
        FieldSpec {
            key,
            kind: FieldKind::Integer,
            on_invalid: InvalidValuePolicy::Drop,
            default: None,
        }
    }

    pub const fn incline(key: &'static str) -> FieldSpec {
        FieldSpec {
            key,
            kind: FieldKind::Incline,
            on_invalid: InvalidValuePolicy::Escape,
            default: None,
        }
    }

    pub const fn enumerated(key: &'static str, values: &'static [&'static str]) -> FieldSpec {
        FieldSpec {
            key,
            kind: FieldKind::Enumerated(values),
            on_invalid: InvalidValuePolicy::Escape,
            default: None,
        }
    }

    pub const fn fixed(key: &'static str, value: &'static str) -> FieldSpec {
        FieldSpec {
            key,
            kind: FieldKind::Fixed(value),
            on_invalid: InvalidValuePolicy::Escape,
            default: Some(value),
        }
    }

    /// validates and converts a value into this field's target type.
    /// returns None when the value fails validation.
    pub fn validate(&self, value: &TagValue) -> Option<TagValue> {
        match self.kind {
            FieldKind::Text => match value {
                TagValue::Text(s) if s.trim().is_empty() => None,
                TagValue::Structured(_) => None,
                TagValue::Text(s) => Some(TagValue::Text(s.clone())),
                other => Some(TagValue::Text(other.to_string())),
            },
            FieldKind::Float => finite(numeric(value)?).map(TagValue::Float),
            FieldKind::Integer => match value {
                TagValue::Integer(i) => Some(TagValue::Integer(*i)),
                _ => {
                    let f = finite(numeric(value)?)?;
                    if f.fract() == 0.0 {
                        Some(TagValue::Integer(f as i64))
                    } else {
                        None
                    }
                }
            },
            FieldKind::Incline => {
                let stripped = match value {
                    TagValue::Text(s) => {
                        let t = s.trim();
                        TagValue::Text(String::from(t.strip_suffix('%').unwrap_or(t)))
                    }
                    other => other.clone(),
                };
                finite(numeric(&stripped)?).map(TagValue::Float)
            }
            FieldKind::Enumerated(values) => {
                let s = value.as_text()?.trim();
                if values.contains(&s) {
                    Some(TagValue::Text(String::from(s)))
                } else {
                    None
                }
            }
            FieldKind::Fixed(expected) => match value.as_text() {
                Some(s) if s.trim() == expected => Some(TagValue::from(expected)),
                _ => None,
            },
        }
    }

    /// value inserted when the key is absent from the input
    pub fn default_value(&self) -> Option<TagValue> {
        self.default.map(TagValue::from)
    }
}

/// the numeric reading of a value. text goes through the extension codec's
/// best-effort decoding.
fn numeric(value: &TagValue) -> Option<f64> {
    match value {
        TagValue::Integer(i) => Some(*i as f64),
        TagValue::Float(f) => Some(*f),
        TagValue::Text(s) => match ExtensionCodec::decode(s) {
            TagValue::Integer(i) => Some(i as f64),
            TagValue::Float(f) => Some(f),
            _ => None,
        },
        _ => None,
    }
}

fn finite(value: f64) -> Option<f64> {
    if value.is_finite() {
        Some(value)
    } else {
        None
    }
}
