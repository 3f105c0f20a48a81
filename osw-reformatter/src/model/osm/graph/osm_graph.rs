use super::{
    OsmEntityKind, OsmNodeData, OsmNodeId, OsmNodes, OsmRelationData,
    OsmRelations, OsmWayData, OsmWayId, OsmWays,
};
use crate::model::osm::OsmError;
use itertools::Itertools;
use std::collections::{HashMap, HashSet};

/// owns every entity of one conversion, keyed by id in insertion order.
/// adjacency is never stored; degrees are derived from way node references
/// whenever they are needed.
#[derive(Default, Debug, Clone)]
pub struct OsmGraph {
    nodes: OsmNodes,
    ways: OsmWays,
    relations: OsmRelations,
}

impl OsmGraph {
    pub fn empty() -> OsmGraph {
        OsmGraph::default()
    }

    /// creates a graph from its entity collections, confirming that every
    /// way reference resolves to a node.
    pub fn new(
        nodes: OsmNodes,
        ways: OsmWays,
        relations: OsmRelations,
    ) -> Result<OsmGraph, OsmError> {
        let graph = OsmGraph {
            nodes,
            ways,
            relations,
        };
        graph.validate_references()?;
        Ok(graph)
    }

    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn n_ways(&self) -> usize {
        self.ways.len()
    }

    pub fn n_relations(&self) -> usize {
        self.relations.len()
    }

    pub fn contains_node(&self, node_id: &OsmNodeId) -> bool {
        self.nodes.contains_key(node_id)
    }

    pub fn contains_way(&self, way_id: &OsmWayId) -> bool {
        self.ways.contains_key(way_id)
    }

    pub fn insert_node(&mut self, node: OsmNodeData) -> Result<(), OsmError> {
        if self.nodes.contains_key(&node.osmid) {
            return Err(OsmError::DuplicateEntity(OsmEntityKind::Node, node.osmid.0));
        }
        self.nodes.insert(node.osmid, node);
        Ok(())
    }

    pub fn insert_way(&mut self, way: OsmWayData) -> Result<(), OsmError> {
        if self.ways.contains_key(&way.osmid) {
            return Err(OsmError::DuplicateEntity(OsmEntityKind::Way, way.osmid.0));
        }
        self.ways.insert(way.osmid, way);
        Ok(())
    }

    pub fn insert_relation(&mut self, relation: OsmRelationData) -> Result<(), OsmError> {
        if self.relations.contains_key(&relation.osmid) {
            return Err(OsmError::DuplicateEntity(
                OsmEntityKind::Relation,
                relation.osmid.0,
            ));
        }
        self.relations.insert(relation.osmid, relation);
        Ok(())
    }

    pub fn get_node_data(&self, node_id: &OsmNodeId) -> Result<&OsmNodeData, OsmError> {
        self.nodes
            .get(node_id)
            .ok_or(OsmError::GraphMissingNodeId(*node_id))
    }

    pub fn get_node_data_mut(&mut self, node_id: &OsmNodeId) -> Result<&mut OsmNodeData, OsmError> {
        self.nodes
            .get_mut(node_id)
            .ok_or(OsmError::GraphMissingNodeId(*node_id))
    }

    pub fn get_way_data(&self, way_id: &OsmWayId) -> Result<&OsmWayData, OsmError> {
        self.ways
            .get(way_id)
            .ok_or(OsmError::GraphMissingWayId(*way_id))
    }

    pub fn get_way_data_mut(&mut self, way_id: &OsmWayId) -> Result<&mut OsmWayData, OsmError> {
        self.ways
            .get_mut(way_id)
            .ok_or(OsmError::GraphMissingWayId(*way_id))
    }

    pub fn nodes(&self) -> impl Iterator<Item = &OsmNodeData> {
        self.nodes.values()
    }

    pub fn ways(&self) -> impl Iterator<Item = &OsmWayData> {
        self.ways.values()
    }

    pub fn relations(&self) -> impl Iterator<Item = &OsmRelationData> {
        self.relations.values()
    }

    pub fn nodes_mut(&mut self) -> impl Iterator<Item = &mut OsmNodeData> {
        self.nodes.values_mut()
    }

    pub fn ways_mut(&mut self) -> impl Iterator<Item = &mut OsmWayData> {
        self.ways.values_mut()
    }

    pub fn relations_mut(&mut self) -> impl Iterator<Item = &mut OsmRelationData> {
        self.relations.values_mut()
    }

    /// the node collection, used to resolve way geometries
    pub fn nodes_map(&self) -> &OsmNodes {
        &self.nodes
    }

    /// removes ways in a single pass, preserving the order of the rest
    pub fn retain_ways<F>(&mut self, mut keep: F)
    where
        F: FnMut(&OsmWayId, &OsmWayData) -> bool,
    {
        self.ways.retain(|id, way| keep(id, way));
    }

    /// removes nodes in a single pass, preserving the order of the rest
    pub fn retain_nodes<F>(&mut self, mut keep: F)
    where
        F: FnMut(&OsmNodeId, &OsmNodeData) -> bool,
    {
        self.nodes.retain(|id, node| keep(id, node));
    }

    pub fn into_parts(self) -> (OsmNodes, OsmWays, OsmRelations) {
        (self.nodes, self.ways, self.relations)
    }

    /// the largest way id in the graph, or 0 for a graph without ways
    pub fn max_way_id(&self) -> i64 {
        self.ways.keys().map(|id| id.0).max().unwrap_or(0).max(0)
    }

    /// ids of every node referenced by some way
    pub fn referenced_node_ids(&self) -> HashSet<OsmNodeId> {
        self.ways
            .values()
            .flat_map(|w| w.nodes.iter().copied())
            .collect()
    }

    /// ids of every node referenced by a walkway network way
    pub fn network_node_ids(&self) -> HashSet<OsmNodeId> {
        self.ways
            .values()
            .filter(|w| w.is_network())
            .flat_map(|w| w.nodes.iter().copied())
            .collect()
    }

    /// the number of network segments touching each node. a node interior to
    /// one way has degree 2; a way endpoint contributes 1.
    pub fn network_degrees(&self) -> HashMap<OsmNodeId, usize> {
        let mut degrees: HashMap<OsmNodeId, usize> = HashMap::new();
        for way in self.ways.values().filter(|w| w.is_network()) {
            for (src, dst) in way.nodes.iter().tuple_windows() {
                *degrees.entry(*src).or_default() += 1;
                *degrees.entry(*dst).or_default() += 1;
            }
        }
        degrees
    }

    /// first and last node of every network way
    pub fn network_endpoints(&self) -> HashSet<OsmNodeId> {
        self.ways
            .values()
            .filter(|w| w.is_network())
            .flat_map(|w| [w.src_node_id(), w.dst_node_id()])
            .flatten()
            .copied()
            .collect()
    }

    /// every (way, node) reference pair whose node is missing from the graph
    pub fn dangling_references(&self) -> Vec<(OsmWayId, OsmNodeId)> {
        self.ways
            .values()
            .flat_map(|w| {
                w.nodes
                    .iter()
                    .filter(|n| !self.nodes.contains_key(*n))
                    .map(|n| (w.osmid, *n))
            })
            .collect_vec()
    }

    pub fn validate_references(&self) -> Result<(), OsmError> {
        match self.dangling_references().first() {
            Some((way_id, node_id)) => Err(OsmError::DanglingReference(*way_id, *node_id)),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::OsmGraph;
    use crate::model::{
        osm::{
            graph::{OsmNodeData, OsmNodeId, OsmWayData, OsmWayId},
            OsmError,
        },
        osw::OswSubtype,
    };

    fn node(id: i64) -> OsmNodeData {
        OsmNodeData::new(OsmNodeId(id), id as f64, 0.0)
    }

    fn footway(id: i64, refs: &[i64]) -> OsmWayData {
        let mut way = OsmWayData::new(OsmWayId(id), refs.iter().map(|r| OsmNodeId(*r)).collect());
        way.subtype = Some(OswSubtype::Footway);
        way
    }

    #[test]
    fn test_duplicate_insert() {
        let mut graph = OsmGraph::empty();
        graph.insert_node(node(1)).expect("first insert");
        match graph.insert_node(node(1)) {
            Err(OsmError::DuplicateEntity(_, 1)) => {}
            other => panic!("expected duplicate entity, found {other:?}"),
        }
    }

    #[test]
    fn test_degrees_and_endpoints() {
        let mut graph = OsmGraph::empty();
        for id in 1..=5 {
            graph.insert_node(node(id)).expect("insert");
        }
        graph.insert_way(footway(10, &[1, 2, 3])).expect("insert");
        graph.insert_way(footway(11, &[3, 4])).expect("insert");
        graph.insert_way(footway(12, &[2, 5])).expect("insert");
        let degrees = graph.network_degrees();
        assert_eq!(degrees.get(&OsmNodeId(1)), Some(&1));
        assert_eq!(degrees.get(&OsmNodeId(2)), Some(&3));
        assert_eq!(degrees.get(&OsmNodeId(3)), Some(&2));
        let endpoints = graph.network_endpoints();
        assert!(endpoints.contains(&OsmNodeId(3)));
        // way 12 starts at node 2
        assert!(endpoints.contains(&OsmNodeId(2)));
    }

    #[test]
    fn test_interior_vertex_is_not_endpoint() {
        let mut graph = OsmGraph::empty();
        for id in 1..=4 {
            graph.insert_node(node(id)).expect("insert");
        }
        graph.insert_way(footway(10, &[1, 2, 3])).expect("insert");
        graph.insert_way(footway(11, &[3, 4])).expect("insert");
        let degrees = graph.network_degrees();
        assert_eq!(degrees.get(&OsmNodeId(2)), Some(&2));
        let endpoints = graph.network_endpoints();
        assert!(!endpoints.contains(&OsmNodeId(2)));
        assert!(endpoints.contains(&OsmNodeId(1)));
        assert!(endpoints.contains(&OsmNodeId(3)));
        assert!(endpoints.contains(&OsmNodeId(4)));
    }

    #[test]
    fn test_validate_references() {
        let mut graph = OsmGraph::empty();
        graph.insert_node(node(1)).expect("insert");
        graph.insert_way(footway(10, &[1, 2])).expect("insert");
        match graph.validate_references() {
            Err(OsmError::DanglingReference(w, n)) => {
                assert_eq!(w, OsmWayId(10));
                assert_eq!(n, OsmNodeId(2));
            }
            other => panic!("expected dangling reference, found {other:?}"),
        }
    }

    #[test]
    fn test_retain_preserves_order() {
        let mut graph = OsmGraph::empty();
        for id in [5, 3, 9, 1] {
            graph.insert_node(node(id)).expect("insert");
        }
        graph.retain_nodes(|id, _| id.0 != 9);
        let ids = graph.nodes().map(|n| n.osmid.0).collect::<Vec<_>>();
        assert_eq!(ids, vec![5, 3, 1]);
    }
}
