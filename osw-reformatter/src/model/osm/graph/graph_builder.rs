use super::{OsmGraph, OsmNodeId, OsmWayId};
use crate::model::{
    osm::{OsmElement, OsmError},
    osw::{classify_and_normalize, EntityCategory},
};
use itertools::Itertools;
use kdam::tqdm;
use std::collections::HashSet;

/// counts of what happened to the entities handed to a [`GraphBuilder`]
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildSummary {
    pub nodes_read: usize,
    pub ways_read: usize,
    pub relations_read: usize,
    pub ways_unclassified: usize,
    pub ways_dangling: usize,
    pub duplicates: usize,
    pub nodes_classified: usize,
    pub vertices_untagged: usize,
    pub nodes_dropped: usize,
}

/// assembles an [`OsmGraph`] from a single pass over an entity stream.
///
/// ways are classified as they arrive. node classification depends on
/// whether a node is a network vertex, which is only known once every way
/// has been read, so nodes are classified in [`GraphBuilder::finalize`] along
/// with the reference check.
pub struct GraphBuilder {
    graph: OsmGraph,
    ignore_invalid: bool,
    summary: BuildSummary,
}

impl GraphBuilder {
    pub fn new(ignore_invalid: bool) -> GraphBuilder {
        GraphBuilder {
            graph: OsmGraph::empty(),
            ignore_invalid,
            summary: BuildSummary::default(),
        }
    }

    pub fn summary(&self) -> &BuildSummary {
        &self.summary
    }

    /// adds one entity. ways whose tags match no subtype are skipped. a
    /// duplicate id fails unless invalid entities are ignored.
    pub fn add_element(&mut self, element: OsmElement) -> Result<(), OsmError> {
        let result = match element {
            OsmElement::Node(node) => {
                self.summary.nodes_read += 1;
                if node.osmid.0 == 0 {
                    log::warn!("node missing OSMID at ({},{}) ignored", node.x, node.y);
                    return Ok(());
                }
                self.graph.insert_node(node)
            }
            OsmElement::Way(mut way) => {
                self.summary.ways_read += 1;
                let category = EntityCategory::Way {
                    closed: way.is_closed(),
                };
                match classify_and_normalize(&way.tags, &category) {
                    Ok((subtype, tags)) => {
                        way.subtype = Some(subtype);
                        way.tags = tags;
                        self.graph.insert_way(way)
                    }
                    Err(e) => {
                        log::debug!("skipping way {}: {e}", way.osmid);
                        self.summary.ways_unclassified += 1;
                        Ok(())
                    }
                }
            }
            OsmElement::Relation(relation) => {
                self.summary.relations_read += 1;
                self.graph.insert_relation(relation)
            }
        };
        match result {
            Err(e @ OsmError::DuplicateEntity(..)) if self.ignore_invalid => {
                log::warn!("{e}, keeping the first occurrence");
                self.summary.duplicates += 1;
                Ok(())
            }
            other => other,
        }
    }

    /// checks way references and classifies nodes, returning the finished graph.
    ///
    /// a node referenced by a network way is classified as a network node,
    /// any other node as a point. unclassified nodes still referenced by a
    /// way keep their position and lose their tags; unreferenced ones are
    /// removed.
    pub fn finalize(mut self) -> Result<(OsmGraph, BuildSummary), OsmError> {
        let dangling = self.graph.dangling_references();
        if let Some((way_id, node_id)) = dangling.first() {
            if !self.ignore_invalid {
                return Err(OsmError::DanglingReference(*way_id, *node_id));
            }
            let invalid_ways: HashSet<OsmWayId> = dangling.iter().map(|(w, _)| *w).collect();
            for (way_id, node_id) in dangling.iter().unique_by(|(w, _)| *w) {
                log::warn!("{}, removing way", OsmError::DanglingReference(*way_id, *node_id));
            }
            self.summary.ways_dangling = invalid_ways.len();
            self.graph.retain_ways(|id, _| !invalid_ways.contains(id));
        }

        let network = self.graph.network_node_ids();
        let referenced = self.graph.referenced_node_ids();
        let n_nodes = self.graph.n_nodes();
        let mut remove: HashSet<OsmNodeId> = HashSet::new();
        let iter = tqdm!(
            self.graph.nodes_mut(),
            desc = "classify nodes",
            total = n_nodes
        );
        for node in iter {
            let is_referenced = referenced.contains(&node.osmid);
            if node.tags.is_empty() {
                if !is_referenced {
                    remove.insert(node.osmid);
                }
                continue;
            }
            let category = if network.contains(&node.osmid) {
                EntityCategory::Node
            } else {
                EntityCategory::Point
            };
            match classify_and_normalize(&node.tags, &category) {
                Ok((subtype, tags)) => {
                    node.subtype = Some(subtype);
                    node.tags = tags;
                    self.summary.nodes_classified += 1;
                }
                Err(e) if is_referenced => {
                    log::debug!("node {} kept as an untagged vertex: {e}", node.osmid);
                    node.tags.clear();
                    self.summary.vertices_untagged += 1;
                }
                Err(e) => {
                    log::debug!("skipping node {}: {e}", node.osmid);
                    remove.insert(node.osmid);
                }
            }
        }
        eprintln!();
        self.summary.nodes_dropped = remove.len();
        self.graph.retain_nodes(|id, _| !remove.contains(id));

        log::info!(
            "built graph with {} nodes, {} ways, {} relations ({} ways unclassified, {} nodes dropped)",
            self.graph.n_nodes(),
            self.graph.n_ways(),
            self.graph.n_relations(),
            self.summary.ways_unclassified,
            self.summary.nodes_dropped
        );
        Ok((self.graph, self.summary))
    }
}
