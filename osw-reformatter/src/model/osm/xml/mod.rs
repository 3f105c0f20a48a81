mod osm_xml_reader;
mod osm_xml_writer;

pub use osm_xml_reader::{for_each_element, read_osm_xml};
pub use osm_xml_writer::OsmXmlWriter;
