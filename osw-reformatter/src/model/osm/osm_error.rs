use thiserror::Error;

use super::graph::{OsmEntityKind, OsmNodeId, OsmWayId};

#[derive(Error, Debug)]
pub enum OsmError {
    #[error("tag set does not match any {category} subtype: {tags}")]
    SchemaViolation { category: String, tags: String },
    #[error("way '{0}' references node '{1}' not in graph")]
    DanglingReference(OsmWayId, OsmNodeId),
    #[error("feature '{0}' has coordinate {1} with no matching node")]
    OrphanGeometry(String, String),
    #[error("degenerate geometry for {0}: {1}")]
    DegenerateGeometry(String, String),
    #[error("{0} reference '{1}' in {2} has no assigned id")]
    UnresolvedReference(OsmEntityKind, i64, String),
    #[error("{0} '{1}' occurs more than once")]
    DuplicateEntity(OsmEntityKind, i64),
    #[error("layer {0} contains duplicate feature id '{1}'")]
    DuplicateFeatureId(String, String),
    #[error("attempting to get node '{0}' not in graph")]
    GraphMissingNodeId(OsmNodeId),
    #[error("attempting to get way '{0}' not in graph")]
    GraphMissingWayId(OsmWayId),
    #[error("failure reading .pbf file: {source}")]
    PbfLibError { source: osmpbf::Error },
    #[error("failure reading OSM XML {0}: {1}")]
    XmlReadError(String, String),
    #[error("failure writing OSM XML {0}: {1}")]
    XmlWriteError(String, String),
    #[error("failure reading GeoJSON {0}: {1}")]
    GeoJsonError(String, String),
    #[error("invalid feature in layer {0}: {1}")]
    InvalidFeature(String, String),
    #[error("failure with file {0}: {1}")]
    IoError(String, std::io::Error),
    #[error("unsupported OSM source file type: {0}")]
    UnsupportedSource(String),
    #[error("{0}")]
    InternalError(String),
}
