mod graph_builder;
mod osm_entity_kind;
mod osm_graph;
mod osm_node_data;
mod osm_node_id;
mod osm_relation_data;
mod osm_relation_id;
mod osm_way_data;
mod osm_way_id;

pub use graph_builder::{BuildSummary, GraphBuilder};
use indexmap::IndexMap;
pub use osm_entity_kind::OsmEntityKind;
pub use osm_graph::OsmGraph;
pub use osm_node_data::OsmNodeData;
pub use osm_node_id::OsmNodeId;
pub use osm_relation_data::{OsmRelationData, OsmRelationMember};
pub use osm_relation_id::OsmRelationId;
pub use osm_way_data::OsmWayData;
pub use osm_way_id::OsmWayId;

// entity collections keep insertion order so that output and sequential
// remapping follow the order entities were read
pub type OsmNodes = IndexMap<OsmNodeId, OsmNodeData>;
pub type OsmWays = IndexMap<OsmWayId, OsmWayData>;
pub type OsmRelations = IndexMap<OsmRelationId, OsmRelationData>;
