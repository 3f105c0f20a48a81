use crate::model::osm::graph::OsmGraph;

/// the version given to visible entities written without one
pub const DEFAULT_VERSION: u32 = 1;

/// gives every visible entity without a version the default version,
/// returning how many entities were patched. run after a sequential remap.
pub fn ensure_version_attribute(graph: &mut OsmGraph) -> usize {
    let mut patched: usize = 0;
    let mut patch = |visible: Option<bool>, version: &mut Option<u32>| {
        if visible == Some(true) && version.is_none() {
            *version = Some(DEFAULT_VERSION);
            patched += 1;
        }
    };
    for node in graph.nodes_mut() {
        patch(node.visible, &mut node.version);
    }
    for way in graph.ways_mut() {
        patch(way.visible, &mut way.version);
    }
    for relation in graph.relations_mut() {
        patch(relation.visible, &mut relation.version);
    }
    log::debug!("added version {DEFAULT_VERSION} to {patched} visible entities");
    patched
}

#[cfg(test)]
mod tests {
    use super::ensure_version_attribute;
    use crate::model::osm::graph::{OsmGraph, OsmNodeData, OsmNodeId, OsmWayData, OsmWayId};

    #[test]
    fn test_visible_entities_get_version() {
        let mut graph = OsmGraph::empty();
        let mut visible = OsmNodeData::new(OsmNodeId(1), 0.0, 0.0);
        visible.visible = Some(true);
        let mut versioned = OsmNodeData::new(OsmNodeId(2), 0.0, 0.0);
        versioned.visible = Some(true);
        versioned.version = Some(4);
        let hidden = OsmNodeData::new(OsmNodeId(3), 0.0, 0.0);
        graph.insert_node(visible).expect("insert");
        graph.insert_node(versioned).expect("insert");
        graph.insert_node(hidden).expect("insert");
        let mut way = OsmWayData::new(OsmWayId(1), vec![OsmNodeId(1), OsmNodeId(2)]);
        way.visible = Some(true);
        graph.insert_way(way).expect("insert");

        assert_eq!(ensure_version_attribute(&mut graph), 2);
        let versions: Vec<Option<u32>> = graph.nodes().map(|n| n.version).collect();
        assert_eq!(versions, vec![Some(1), Some(4), None]);
        assert_eq!(graph.ways().next().map(|w| w.version), Some(Some(1)));
        assert_eq!(ensure_version_attribute(&mut graph), 0);
    }
}
