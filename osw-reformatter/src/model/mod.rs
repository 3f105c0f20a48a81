pub mod osm;
pub mod osw;
mod reformatter_error;

pub use reformatter_error::ReformatterError;
