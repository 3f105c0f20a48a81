pub mod bundle_ops;
mod conversion_response;
mod osm2osw;
mod osw2osm;
pub mod xml_document_ops;

pub use conversion_response::ConversionResponse;
pub use osm2osw::Osm2Osw;
pub use osw2osm::Osw2Osm;
