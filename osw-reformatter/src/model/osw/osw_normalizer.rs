use super::{
    ext_codec::ExtensionCodec,
    field_table::InvalidValuePolicy,
    osw_rules::{rules_for, SubtypeRule},
    osw_subtype::{EntityCategory, OswSubtype},
    tag_value::TagSet,
};
use crate::model::osm::OsmError;
use itertools::Itertools;

/// finds the first rule of the category's table that accepts these tags
pub fn classify(tags: &TagSet, category: &EntityCategory) -> Option<&'static SubtypeRule> {
    rules_for(category)
        .iter()
        .find(|rule| rule.matches(tags, category))
}

/// classifies a tag set and normalizes it against the matched subtype's
/// field table.
///
/// no input tag is discarded silently: each is kept (possibly converted),
/// escaped into the `ext:` namespace, or dropped by a strict field with a
/// debug log entry.
pub fn classify_and_normalize(
    tags: &TagSet,
    category: &EntityCategory,
) -> Result<(OswSubtype, TagSet), OsmError> {
    let rule = classify(tags, category).ok_or_else(|| OsmError::SchemaViolation {
        category: category.to_string(),
        tags: describe(tags),
    })?;
    Ok((rule.subtype, normalize_with_rule(tags, rule)))
}

/// normalizes a tag set against a single rule.
pub fn normalize_with_rule(tags: &TagSet, rule: &SubtypeRule) -> TagSet {
    let mut out = TagSet::new();

    // extension tags are carried verbatim and take precedence over anything
    // escaped below
    for (key, value) in tags.iter().filter(|(k, _)| ExtensionCodec::is_escaped(k)) {
        out.insert(key.clone(), value.clone());
    }

    for (key, value) in tags.iter().filter(|(k, _)| !ExtensionCodec::is_escaped(k)) {
        match rule.field(key) {
            None => {
                ExtensionCodec::escape_into(&mut out, key, value);
            }
            Some(spec) => match spec.validate(value) {
                Some(valid) => {
                    out.insert(key.clone(), valid);
                }
                None if spec.on_invalid == InvalidValuePolicy::Drop => {
                    log::debug!(
                        "dropping invalid value '{value}' for {} field '{key}'",
                        rule.subtype
                    );
                }
                None => {
                    ExtensionCodec::escape_into(&mut out, key, value);
                }
            },
        }
    }

    for spec in rule.fields() {
        if let (false, Some(default)) = (out.contains_key(spec.key), spec.default_value()) {
            out.insert(String::from(spec.key), default);
        }
    }
    out
}

fn describe(tags: &TagSet) -> String {
    let pairs = tags.iter().map(|(k, v)| format!("{k}={v}")).join(", ");
    format!("{{{pairs}}}")
}
