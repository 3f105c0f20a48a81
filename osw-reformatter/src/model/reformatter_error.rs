use super::osm::OsmError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReformatterError {
    #[error("failure reading run configuration: {0}")]
    ConfigurationError(String),
    #[error("input bundle is missing required layer: {0}")]
    MissingLayer(String),
    #[error(transparent)]
    OsmError {
        #[from]
        source: OsmError,
    },
    #[error("failure with file system: {source}")]
    StdIoError {
        #[from]
        source: std::io::Error,
    },
    #[error("failure decoding JSON: {source}")]
    SerdeJsonError {
        #[from]
        source: serde_json::Error,
    },
    #[error("failure reading zip archive: {source}")]
    ZipError {
        #[from]
        source: zip::result::ZipError,
    },
}
