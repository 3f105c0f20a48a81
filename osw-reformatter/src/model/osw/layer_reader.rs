use super::osw_layer::OswLayer;
use crate::model::osm::OsmError;
use geojson::{Feature, GeoJson};
use std::path::Path;

/// reads the features of one layer file. a bare Feature is accepted as a
/// collection of one; a bare Geometry is not a valid layer.
pub fn read_layer(filepath: &Path, layer: OswLayer) -> Result<Vec<Feature>, OsmError> {
    let path_str = filepath.to_string_lossy().to_string();
    let contents = std::fs::read_to_string(filepath)
        .map_err(|e| OsmError::IoError(path_str.clone(), e))?;
    let geojson = contents
        .parse::<GeoJson>()
        .map_err(|e| OsmError::GeoJsonError(path_str.clone(), e.to_string()))?;
    let features = match geojson {
        GeoJson::FeatureCollection(fc) => fc.features,
        GeoJson::Feature(f) => vec![f],
        GeoJson::Geometry(_) => {
            return Err(OsmError::InvalidFeature(
                layer.to_string(),
                format!("{path_str} holds a bare geometry, expected features"),
            ))
        }
    };
    log::debug!("read {} {layer} features from {path_str}", features.len());
    Ok(features)
}

/// the string form of a feature's `_id` property, if present
pub fn feature_id(feature: &Feature) -> Option<String> {
    feature
        .properties
        .as_ref()
        .and_then(|p| p.get("_id"))
        .and_then(|v| match v {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
}

#[cfg(test)]
mod tests {
    use super::{feature_id, read_layer};
    use crate::model::osw::osw_layer::OswLayer;

    #[test]
    fn test_read_layer() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("x.graph.nodes.geojson");
        let doc = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","geometry":{"type":"Point","coordinates":[1.0,2.0]},"properties":{"_id":"4"}},
            {"type":"Feature","geometry":{"type":"Point","coordinates":[1.5,2.5]},"properties":{"_id":5}}
        ]}"#;
        std::fs::write(&path, doc).expect("write fixture");
        let features = read_layer(&path, OswLayer::Nodes).expect("parses");
        assert_eq!(features.len(), 2);
        assert_eq!(feature_id(&features[0]), Some(String::from("4")));
        assert_eq!(feature_id(&features[1]), Some(String::from("5")));
    }

    #[test]
    fn test_read_missing_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("missing.geojson");
        assert!(read_layer(&path, OswLayer::Edges).is_err());
    }
}
