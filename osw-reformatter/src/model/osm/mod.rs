mod entity_counter;
pub mod graph;
mod osm_element;
mod osm_error;
mod osm_source;
pub mod xml;

pub use entity_counter::{count_entities, EntityCounter, EntityCounts};
pub use osm_element::OsmElement;
pub use osm_error::OsmError;
pub use osm_source::OsmSource;
