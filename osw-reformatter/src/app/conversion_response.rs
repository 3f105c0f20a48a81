use crate::model::ReformatterError;
use serde::{Deserialize, Serialize};

/// the outcome of a top-level operation. a successful response lists the
/// files it generated; a failed one carries the error message and nothing
/// else.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ConversionResponse {
    pub status: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_files: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ConversionResponse {
    pub fn success(generated_files: Vec<String>) -> ConversionResponse {
        ConversionResponse {
            status: true,
            generated_files: Some(generated_files),
            error: None,
        }
    }

    pub fn failure(error: String) -> ConversionResponse {
        ConversionResponse {
            status: false,
            generated_files: None,
            error: Some(error),
        }
    }

    pub fn from_result(result: Result<Vec<String>, ReformatterError>) -> ConversionResponse {
        match result {
            Ok(files) => ConversionResponse::success(files),
            Err(e) => {
                log::error!("conversion failed: {e}");
                ConversionResponse::failure(e.to_string())
            }
        }
    }
}
