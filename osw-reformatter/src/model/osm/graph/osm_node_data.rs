use super::OsmNodeId;
use crate::model::osw::{
    osm_normalizer::ELEVATION_KEY,
    tag_value::{TagSet, TagValue},
    OswSubtype,
};
use geo::{Coord, Point};

/// an OSM node. tags are raw OSM tags until the node is classified, after
/// which they hold the normalized tag set of its subtype.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct OsmNodeData {
    pub osmid: OsmNodeId,
    /// longitude
    pub x: f64,
    /// latitude
    pub y: f64,
    pub elevation: Option<f64>,
    pub tags: TagSet,
    pub subtype: Option<OswSubtype>,
    pub version: Option<u32>,
    pub visible: Option<bool>,
}

impl OsmNodeData {
    pub fn new(osmid: OsmNodeId, x: f64, y: f64) -> OsmNodeData {
        OsmNodeData {
            osmid,
            x,
            y,
            ..Default::default()
        }
    }

    pub fn with_tags(mut self, tags: TagSet) -> OsmNodeData {
        self.tags = tags;
        self
    }

    pub fn get_point(&self) -> Point<f64> {
        Point::new(self.x, self.y)
    }

    pub fn get_coord(&self) -> Coord<f64> {
        Coord::from((self.x, self.y))
    }

    /// the elevation of this node, falling back to a numeric `ext:elevation` tag
    pub fn get_elevation(&self) -> Option<f64> {
        self.elevation.or_else(|| {
            self.tags
                .get(ELEVATION_KEY)
                .and_then(TagValue::as_f64)
                .filter(|e| e.is_finite())
        })
    }
}

impl From<&osmpbf::elements::Node<'_>> for OsmNodeData {
    fn from(node: &osmpbf::elements::Node) -> Self {
        let tags = node
            .tags()
            .map(|(k, v)| (String::from(k), TagValue::from(v)))
            .collect();
        OsmNodeData::new(OsmNodeId(node.id()), node.lon(), node.lat()).with_tags(tags)
    }
}

impl From<&osmpbf::dense::DenseNode<'_>> for OsmNodeData {
    fn from(node: &osmpbf::dense::DenseNode<'_>) -> Self {
        let tags = node
            .tags()
            .map(|(k, v)| (String::from(k), TagValue::from(v)))
            .collect();
        OsmNodeData::new(OsmNodeId(node.id()), node.lon(), node.lat()).with_tags(tags)
    }
}

#[cfg(test)]
mod tests {
    use super::OsmNodeData;
    use crate::model::osm::graph::OsmNodeId;
    use crate::model::osw::tag_value::text_tags;

    #[test]
    fn test_elevation_from_tag() {
        let node = OsmNodeData::new(OsmNodeId(1), 0.0, 0.0)
            .with_tags(text_tags([("ext:elevation", "3.5")]));
        assert_eq!(node.get_elevation(), Some(3.5));
        let bad = OsmNodeData::new(OsmNodeId(2), 0.0, 0.0)
            .with_tags(text_tags([("ext:elevation", "NaN")]));
        assert_eq!(bad.get_elevation(), None);
    }
}
