pub mod ext_codec;
pub mod field_table;
pub mod layer_reader;
pub mod layer_writer;
pub mod osm_normalizer;
pub mod osw_feature;
pub mod osw_layer;
pub mod osw_normalizer;
pub mod osw_rules;
pub mod osw_subtype;
pub mod tag_value;

pub use ext_codec::ExtensionCodec;
pub use layer_writer::OswWriter;
pub use osw_feature::{OswDataset, OswFeature};
pub use osw_layer::OswLayer;
pub use osw_normalizer::classify_and_normalize;
pub use osw_subtype::{EntityCategory, OswSubtype};
pub use tag_value::{TagSet, TagValue};
