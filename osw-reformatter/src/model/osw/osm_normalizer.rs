use super::{
    ext_codec::ExtensionCodec,
    osw_layer::OswLayer,
    osw_normalizer,
    osw_subtype::EntityCategory,
    tag_value::{format_float, TagSet, TagValue},
};
use crate::model::osm::OsmError;
use serde_json::{Map, Value};

/// feature properties that are native entity attributes and pass through
/// unescaped
pub const NATIVE_KEYS: &[&str] = &["_id"];

/// feature properties describing topology. the raw format expresses them
/// as node references, so they never become tags.
pub const STRUCTURAL_KEYS: &[&str] = &["_u_id", "_v_id", "_w_id"];

pub const ELEVATION_KEY: &str = "ext:elevation";
pub const OSM_ID_KEY: &str = "ext:osm_id";

/// the entity category features of a layer are classified under
pub fn category_for_layer(layer: OswLayer) -> EntityCategory {
    match layer {
        OswLayer::Nodes => EntityCategory::Node,
        OswLayer::Points => EntityCategory::Point,
        OswLayer::Edges | OswLayer::Lines => EntityCategory::Way { closed: false },
        OswLayer::Zones | OswLayer::Polygons => EntityCategory::Way { closed: true },
    }
}

/// converts the properties of a walkway feature into raw OSM tags.
///
/// schema keys holding valid values are kept as written. anything else is
/// escaped into the `ext:` namespace, including values a forward strict
/// field would have dropped, so that nothing is lost on the way back.
pub fn osm_tags_from_properties(properties: &Map<String, Value>, layer: OswLayer) -> TagSet {
    let input: TagSet = properties
        .iter()
        .filter_map(|(k, v)| TagValue::from_json(v).map(|tv| (k.clone(), tv)))
        .collect();
    let rule = osw_normalizer::classify(&input, &category_for_layer(layer));

    let mut out = TagSet::new();
    // extension text is carried verbatim; only typed JSON values are encoded
    for (key, value) in input.iter().filter(|(k, _)| ExtensionCodec::is_escaped(k)) {
        let encoded = match value {
            TagValue::Text(s) => s.clone(),
            other => ExtensionCodec::encode(other),
        };
        out.insert(key.clone(), TagValue::Text(encoded));
    }
    for (key, value) in input.iter().filter(|(k, _)| !ExtensionCodec::is_escaped(k)) {
        if NATIVE_KEYS.contains(&key.as_str()) {
            out.insert(key.clone(), TagValue::Text(value.to_string()));
            continue;
        }
        if STRUCTURAL_KEYS.contains(&key.as_str()) {
            continue;
        }
        let valid = rule
            .and_then(|r| r.field(key))
            .map(|spec| spec.validate(value).is_some())
            .unwrap_or(false);
        if valid {
            out.insert(key.clone(), TagValue::Text(value.to_string()));
        } else {
            ExtensionCodec::escape_into(&mut out, key, value);
        }
    }

    if layer == OswLayer::Zones || properties.contains_key("_w_id") {
        out.entry(String::from("area"))
            .or_insert_with(|| TagValue::from("yes"));
    }
    out
}

/// stores an elevation read from a third coordinate as `ext:elevation`.
/// an elevation already present in the tags is kept.
pub fn apply_elevation(tags: &mut TagSet, elevation: f64) -> Result<(), OsmError> {
    if !elevation.is_finite() {
        return Err(OsmError::InvalidFeature(
            String::from("elevation"),
            format!("elevation must be a finite number, found {elevation}"),
        ));
    }
    tags.entry(String::from(ELEVATION_KEY))
        .or_insert_with(|| TagValue::Text(format_float(elevation)));
    Ok(())
}

/// the numeric id a feature asks for: `ext:osm_id` first, then `_id`.
pub fn preferred_id(properties: &Map<String, Value>) -> Option<i64> {
    [OSM_ID_KEY, "_id"]
        .iter()
        .filter_map(|key| properties.get(*key))
        .find_map(|value| match value {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        })
}

#[cfg(test)]
mod tests {
    use super::{apply_elevation, osm_tags_from_properties, preferred_id};
    use crate::model::osw::{
        osw_layer::OswLayer,
        osw_normalizer::classify_and_normalize,
        osw_subtype::EntityCategory,
        tag_value::{text_tags, TagSet, TagValue},
    };
    use serde_json::{json, Map, Value};

    fn props(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("test properties must be an object"),
        }
    }

    #[test]
    fn test_filter_tags_escapes_invalid_and_unknown() {
        let properties = props(json!({
            "highway": "footway",
            "climb": "sideways",
            "incline": "steep",
            "width": "NaN",
            "mystery": "value",
            "nested": {"a": 1},
            "listval": [1, 2],
            "_id": "5",
            "_u_id": "1",
            "_v_id": "2",
        }));
        let tags = osm_tags_from_properties(&properties, OswLayer::Edges);
        let get = |k: &str| tags.get(k).map(|v| v.to_string());
        assert_eq!(get("highway"), Some(String::from("footway")));
        assert_eq!(get("ext:climb"), Some(String::from("sideways")));
        assert_eq!(get("ext:incline"), Some(String::from("steep")));
        assert_eq!(get("ext:width"), Some(String::from("NaN")));
        assert_eq!(get("ext:mystery"), Some(String::from("value")));
        assert_eq!(get("ext:nested"), Some(String::from(r#"{"a": 1}"#)));
        assert_eq!(get("ext:listval"), Some(String::from("[1, 2]")));
        assert_eq!(get("_id"), Some(String::from("5")));
        assert!(!tags.contains_key("climb"));
        assert!(!tags.contains_key("incline"));
        assert!(!tags.contains_key("width"));
        assert!(!tags.contains_key("_u_id"));
        assert!(!tags.contains_key("_v_id"));
    }

    #[test]
    fn test_valid_values_kept_verbatim() {
        let properties = props(json!({
            "highway": "footway",
            "width": "1.525",
            "incline": 0.1,
            "surface": "asphalt",
        }));
        let tags = osm_tags_from_properties(&properties, OswLayer::Edges);
        assert_eq!(tags.get("width"), Some(&TagValue::from("1.525")));
        assert_eq!(tags.get("incline"), Some(&TagValue::from("0.1")));
        assert_eq!(tags.get("surface"), Some(&TagValue::from("asphalt")));
    }

    #[test]
    fn test_stairs_climb() {
        let properties = props(json!({"highway": "steps", "climb": "up"}));
        let tags = osm_tags_from_properties(&properties, OswLayer::Edges);
        assert_eq!(tags.get("climb"), Some(&TagValue::from("up")));
        let properties = props(json!({"highway": "steps", "climb": "sideways"}));
        let tags = osm_tags_from_properties(&properties, OswLayer::Edges);
        assert!(!tags.contains_key("climb"));
        assert_eq!(tags.get("ext:climb"), Some(&TagValue::from("sideways")));
    }

    #[test]
    fn test_zone_gets_area() {
        let properties = props(json!({"highway": "pedestrian", "_w_id": ["1"]}));
        let tags = osm_tags_from_properties(&properties, OswLayer::Zones);
        assert_eq!(tags.get("area"), Some(&TagValue::from("yes")));
        assert!(!tags.contains_key("_w_id"));
    }

    #[test]
    fn test_existing_extension_tags_kept() {
        let properties = props(json!({
            "highway": "footway",
            "ext:detail": "{ \"name\": \"Bob\" }",
            "ext:broken": "{oops}",
            "ext:none": null,
        }));
        let tags = osm_tags_from_properties(&properties, OswLayer::Edges);
        assert_eq!(tags.get("ext:detail"), Some(&TagValue::from("{ \"name\": \"Bob\" }")));
        assert_eq!(tags.get("ext:broken"), Some(&TagValue::from("{oops}")));
        assert!(!tags.contains_key("ext:none"));
    }

    #[test]
    fn test_typed_extension_values_encoded() {
        let properties = props(json!({
            "highway": "footway",
            "ext:meta": {"b": 1, "a": 2},
            "ext:count": 3,
        }));
        let tags = osm_tags_from_properties(&properties, OswLayer::Edges);
        assert_eq!(tags.get("ext:meta"), Some(&TagValue::from(r#"{"a": 2, "b": 1}"#)));
        assert_eq!(tags.get("ext:count"), Some(&TagValue::from("3")));
    }

    #[test]
    fn test_extension_text_stable_through_both_directions() {
        let raw = text_tags([
            ("highway", "footway"),
            ("ext:meta", r#"{"b":1,"a":2}"#),
            ("ext:list", "[1,2]"),
        ]);
        let (_, forward) =
            match classify_and_normalize(&raw, &EntityCategory::Way { closed: false }) {
                Ok(result) => result,
                Err(e) => panic!("{e}"),
            };
        let properties: Map<String, Value> = forward
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect();
        let restored = osm_tags_from_properties(&properties, OswLayer::Edges);
        for key in ["ext:meta", "ext:list"] {
            assert_eq!(restored.get(key), raw.get(key), "{key}");
        }
    }

    #[test]
    fn test_apply_elevation() {
        let mut tags = TagSet::new();
        apply_elevation(&mut tags, 3.0).expect("finite elevation");
        assert_eq!(tags.get("ext:elevation"), Some(&TagValue::from("3.0")));
        let mut flat = TagSet::new();
        apply_elevation(&mut flat, 0.0).expect("finite elevation");
        assert_eq!(flat.get("ext:elevation"), Some(&TagValue::from("0.0")));
        let mut bad = TagSet::new();
        assert!(apply_elevation(&mut bad, f64::NAN).is_err());
        assert!(bad.is_empty());
    }

    #[test]
    fn test_preferred_id() {
        assert_eq!(preferred_id(&props(json!({"_id": "12"}))), Some(12));
        assert_eq!(
            preferred_id(&props(json!({"_id": "12", "ext:osm_id": "99"}))),
            Some(99)
        );
        assert_eq!(preferred_id(&props(json!({"_id": "n1"}))), None);
        assert_eq!(preferred_id(&props(json!({"_id": 7}))), Some(7));
    }
}
