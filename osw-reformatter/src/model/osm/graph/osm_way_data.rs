use super::{OsmNodeId, OsmNodes, OsmWayId};
use crate::model::{
    osm::OsmError,
    osw::{tag_value::TagValue, OswSubtype, TagSet},
};
use geo::{Coord, LineString};
use itertools::Itertools;

#[derive(Default, Debug, Clone, PartialEq)]
pub struct OsmWayData {
    pub osmid: OsmWayId,
    pub nodes: Vec<OsmNodeId>,
    pub tags: TagSet,
    pub subtype: Option<OswSubtype>,
    /// full-resolution geometry, stored when simplification removes
    /// interstitial node references from this way.
    pub geometry: Option<LineString<f64>>,
    /// when ways are merged or split, the ids of the source ways are stored
    /// here. the Way.osmid remains present in any aggregate way_ids collection.
    pub way_ids: Vec<OsmWayId>,
    pub version: Option<u32>,
    pub visible: Option<bool>,
}

impl OsmWayData {
    pub fn new(osmid: OsmWayId, nodes: Vec<OsmNodeId>) -> OsmWayData {
        OsmWayData {
            osmid,
            nodes,
            way_ids: vec![osmid],
            ..Default::default()
        }
    }

    pub fn with_tags(mut self, tags: TagSet) -> OsmWayData {
        self.tags = tags;
        self
    }

    /// true when the way returns to its first node
    pub fn is_closed(&self) -> bool {
        self.nodes.len() > 2 && self.nodes.first() == self.nodes.last()
    }

    /// true when the way belongs to the routable walkway network
    pub fn is_network(&self) -> bool {
        self.subtype.map(|s| s.is_network()).unwrap_or(false)
    }

    pub fn src_node_id(&self) -> Option<&OsmNodeId> {
        self.nodes.first()
    }

    pub fn dst_node_id(&self) -> Option<&OsmNodeId> {
        self.nodes.last()
    }

    /// resolves the node references of this way into coordinates, failing
    /// on the first reference not found in `raw_nodes`.
    pub fn create_linestring(&self, raw_nodes: &OsmNodes) -> Result<LineString<f64>, OsmError> {
        let coords = self
            .nodes
            .iter()
            .map(|id| {
                raw_nodes
                    .get(id)
                    .map(|node| Coord::from((node.x, node.y)))
                    .ok_or(OsmError::DanglingReference(self.osmid, *id))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(LineString::new(coords))
    }

    /// the geometry of this way: the stored full-resolution geometry when
    /// present, otherwise the coordinates of its node references.
    pub fn get_linestring(&self, raw_nodes: &OsmNodes) -> Result<LineString<f64>, OsmError> {
        match &self.geometry {
            Some(g) => Ok(g.clone()),
            None => self.create_linestring(raw_nodes),
        }
    }
}

impl From<&osmpbf::elements::Way<'_>> for OsmWayData {
    fn from(way: &osmpbf::elements::Way) -> Self {
        // remove consecutive duplicates in the node path
        let mut nodes = way.refs().map(OsmNodeId).collect_vec();
        nodes.dedup();
        if nodes.is_empty() {
            log::warn!(
                "way {} had {} nodes but after deduplication has 0",
                way.id(),
                way.refs().len()
            );
        }
        let tags = way
            .tags()
            .map(|(k, v)| (String::from(k), TagValue::from(v)))
            .collect();
        OsmWayData::new(OsmWayId(way.id()), nodes).with_tags(tags)
    }
}

#[cfg(test)]
mod tests {
    use super::OsmWayData;
    use crate::model::osm::{
        graph::{OsmNodeData, OsmNodeId, OsmNodes, OsmWayId},
        OsmError,
    };
    use geo::line_string;

    fn nodes() -> OsmNodes {
        [(1, 0.0, 0.0), (2, 1.0, 0.0), (3, 1.0, 1.0)]
            .into_iter()
            .map(|(id, x, y)| (OsmNodeId(id), OsmNodeData::new(OsmNodeId(id), x, y)))
            .collect()
    }

    #[test]
    fn test_create_linestring() {
        let way = OsmWayData::new(OsmWayId(7), vec![OsmNodeId(1), OsmNodeId(2), OsmNodeId(3)]);
        let line = way.create_linestring(&nodes()).expect("all nodes present");
        assert_eq!(line, line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0)]);
    }

    #[test]
    fn test_dangling_reference() {
        let way = OsmWayData::new(OsmWayId(7), vec![OsmNodeId(1), OsmNodeId(9)]);
        match way.create_linestring(&nodes()) {
            Err(OsmError::DanglingReference(w, n)) => {
                assert_eq!(w, OsmWayId(7));
                assert_eq!(n, OsmNodeId(9));
            }
            other => panic!("expected dangling reference, found {other:?}"),
        }
    }

    #[test]
    fn test_is_closed() {
        let open = OsmWayData::new(OsmWayId(1), vec![OsmNodeId(1), OsmNodeId(2)]);
        assert!(!open.is_closed());
        let ring = OsmWayData::new(
            OsmWayId(2),
            vec![OsmNodeId(1), OsmNodeId(2), OsmNodeId(3), OsmNodeId(1)],
        );
        assert!(ring.is_closed());
        let back_and_forth = OsmWayData::new(OsmWayId(3), vec![OsmNodeId(1), OsmNodeId(1)]);
        assert!(!back_and_forth.is_closed());
    }
}
