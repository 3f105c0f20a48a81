use super::graph::{OsmEntityKind, OsmNodeData, OsmRelationData, OsmWayData};

/// one record of a raw entity stream
#[derive(Debug, Clone, PartialEq)]
pub enum OsmElement {
    Node(OsmNodeData),
    Way(OsmWayData),
    Relation(OsmRelationData),
}

impl OsmElement {
    pub fn kind(&self) -> OsmEntityKind {
        match self {
            OsmElement::Node(_) => OsmEntityKind::Node,
            OsmElement::Way(_) => OsmEntityKind::Way,
            OsmElement::Relation(_) => OsmEntityKind::Relation,
        }
    }

    pub fn id(&self) -> i64 {
        match self {
            OsmElement::Node(n) => n.osmid.0,
            OsmElement::Way(w) => w.osmid.0,
            OsmElement::Relation(r) => r.osmid.0,
        }
    }
}

impl From<osmpbf::Element<'_>> for OsmElement {
    fn from(element: osmpbf::Element<'_>) -> Self {
        match element {
            osmpbf::Element::Node(node) => OsmElement::Node(OsmNodeData::from(&node)),
            // from documentation on DenseNode:
            // if you want to match on `Node`, you also likely want to match `DenseNode`.
            osmpbf::Element::DenseNode(dense) => OsmElement::Node(OsmNodeData::from(&dense)),
            osmpbf::Element::Way(way) => OsmElement::Way(OsmWayData::from(&way)),
            osmpbf::Element::Relation(relation) => {
                OsmElement::Relation(OsmRelationData::from(&relation))
            }
        }
    }
}
