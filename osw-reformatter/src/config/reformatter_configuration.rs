use crate::model::ReformatterError;
use serde::{Deserialize, Serialize};

/// defines behaviors for both conversion directions. every field is
/// optional in a configuration file and falls back to its default.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(default)]
pub struct ReformatterConfiguration {
    /// decimal places kept when hashing coordinates for node deduplication.
    /// OSM stores coordinates at 1e-7 degrees.
    pub coordinate_precision: u32,
    pub simplify: bool,
    pub merge_ways: bool,
    pub ignore_invalid_entities: bool,
    /// create untagged nodes for edge shape points missing from the node
    /// layer instead of dropping them as orphans
    pub materialize_shape_points: bool,
    pub count_entities: bool,
    pub parallelize: bool,
    pub overwrite: bool,
    /// value of the `generator` attribute of written OSM XML
    pub generator: String,
}

impl Default for ReformatterConfiguration {
    fn default() -> Self {
        Self {
            coordinate_precision: 7,
            simplify: true,
            merge_ways: true,
            ignore_invalid_entities: true,
            materialize_shape_points: false,
            count_entities: true,
            parallelize: true,
            overwrite: true,
            generator: String::from("osw-reformatter"),
        }
    }
}

impl TryFrom<&String> for ReformatterConfiguration {
    type Error = ReformatterError;

    fn try_from(f: &String) -> Result<Self, Self::Error> {
        if f.ends_with(".toml") {
            let s = std::fs::read_to_string(f).map_err(|e| {
                ReformatterError::ConfigurationError(format!("failure reading {f}: {e}"))
            })?;
            toml::from_str(&s).map_err(|e| {
                ReformatterError::ConfigurationError(format!("failure decoding {f}: {e}"))
            })
        } else if f.ends_with(".json") {
            let s = std::fs::read_to_string(f).map_err(|e| {
                ReformatterError::ConfigurationError(format!("failure reading {f}: {e}"))
            })?;
            serde_json::from_str(&s).map_err(|e| {
                ReformatterError::ConfigurationError(format!("failure decoding {f}: {e}"))
            })
        } else {
            Err(ReformatterError::ConfigurationError(format!(
                "unsupported file type: {f}"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ReformatterConfiguration;
    use crate::model::ReformatterError;

    #[test]
    fn test_partial_toml() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("conf.toml");
        std::fs::write(&path, "simplify = false\ncoordinate_precision = 6\n").expect("write");
        let conf = ReformatterConfiguration::try_from(&path.to_string_lossy().to_string())
            .expect("valid toml");
        assert!(!conf.simplify);
        assert_eq!(conf.coordinate_precision, 6);
        assert!(conf.merge_ways);
        assert_eq!(conf.generator, "osw-reformatter");
    }

    #[test]
    fn test_json() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("conf.json");
        std::fs::write(&path, r#"{"overwrite": false, "generator": "tests"}"#).expect("write");
        let conf = ReformatterConfiguration::try_from(&path.to_string_lossy().to_string())
            .expect("valid json");
        assert!(!conf.overwrite);
        assert_eq!(conf.generator, "tests");
    }

    #[test]
    fn test_unsupported_extension() {
        match ReformatterConfiguration::try_from(&String::from("conf.yaml")) {
            Err(ReformatterError::ConfigurationError(_)) => {}
            other => panic!("expected configuration error, found {other:?}"),
        }
    }
}
