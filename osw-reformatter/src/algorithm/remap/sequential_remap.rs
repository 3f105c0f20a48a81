use crate::model::{
    osm::{
        graph::{
            OsmEntityKind, OsmGraph, OsmNodeId, OsmNodes, OsmRelationId, OsmRelations, OsmWayId,
            OsmWays,
        },
        OsmError,
    },
    osw::{TagSet, TagValue},
};
use std::collections::HashMap;

/// tags whose value repeats the id of the entity carrying them
pub const ID_MIRROR_TAGS: &[&str] = &["_id"];

/// renumbers nodes, ways and relations to 1..=n per kind in insertion order.
///
/// way node references and relation members are rewritten to the new ids,
/// as is any id mirror tag that held the entity's old id. a reference to an
/// id that does not exist in the graph fails the whole remap.
pub fn remap_sequential(graph: OsmGraph) -> Result<OsmGraph, OsmError> {
    let (nodes, ways, relations) = graph.into_parts();
    log::debug!(
        "replacing {} temporary node ids and {} temporary way ids",
        nodes.keys().filter(|id| id.is_temporary()).count(),
        ways.keys().filter(|id| id.is_temporary()).count()
    );
    let node_ids: HashMap<i64, i64> = sequential_ids(nodes.keys().map(|id| id.0));
    let way_ids: HashMap<i64, i64> = sequential_ids(ways.keys().map(|id| id.0));
    let relation_ids: HashMap<i64, i64> = sequential_ids(relations.keys().map(|id| id.0));

    let mut new_nodes = OsmNodes::with_capacity(nodes.len());
    for (old_id, mut node) in nodes.into_iter() {
        let new_id = lookup(&node_ids, OsmEntityKind::Node, old_id.0, "node list")?;
        node.osmid = OsmNodeId(new_id);
        rewrite_mirror_tags(&mut node.tags, old_id.0, new_id);
        new_nodes.insert(node.osmid, node);
    }

    let mut new_ways = OsmWays::with_capacity(ways.len());
    for (old_id, mut way) in ways.into_iter() {
        let new_id = lookup(&way_ids, OsmEntityKind::Way, old_id.0, "way list")?;
        let context = format!("way {old_id}");
        way.nodes = way
            .nodes
            .iter()
            .map(|n| lookup(&node_ids, OsmEntityKind::Node, n.0, &context).map(OsmNodeId))
            .collect::<Result<Vec<_>, _>>()?;
        way.osmid = OsmWayId(new_id);
        way.way_ids = vec![way.osmid];
        rewrite_mirror_tags(&mut way.tags, old_id.0, new_id);
        new_ways.insert(way.osmid, way);
    }

    let mut new_relations = OsmRelations::with_capacity(relations.len());
    for (old_id, mut relation) in relations.into_iter() {
        let new_id = lookup(&relation_ids, OsmEntityKind::Relation, old_id.0, "relation list")?;
        let context = format!("relation {old_id}");
        for member in relation.members.iter_mut() {
            let ids = match member.kind {
                OsmEntityKind::Node => &node_ids,
                OsmEntityKind::Way => &way_ids,
                OsmEntityKind::Relation => &relation_ids,
            };
            member.reference = lookup(ids, member.kind, member.reference, &context)?;
        }
        relation.osmid = OsmRelationId(new_id);
        rewrite_mirror_tags(&mut relation.tags, old_id.0, new_id);
        new_relations.insert(relation.osmid, relation);
    }

    log::info!(
        "remapped {} nodes, {} ways, {} relations to sequential ids",
        new_nodes.len(),
        new_ways.len(),
        new_relations.len()
    );
    OsmGraph::new(new_nodes, new_ways, new_relations)
}

fn sequential_ids(ids: impl Iterator<Item = i64>) -> HashMap<i64, i64> {
    ids.zip(1..).collect()
}

fn lookup(
    ids: &HashMap<i64, i64>,
    kind: OsmEntityKind,
    id: i64,
    context: &str,
) -> Result<i64, OsmError> {
    ids.get(&id)
        .copied()
        .ok_or_else(|| OsmError::UnresolvedReference(kind, id, String::from(context)))
}

fn rewrite_mirror_tags(tags: &mut TagSet, old_id: i64, new_id: i64) {
    for key in ID_MIRROR_TAGS {
        if let Some(value) = tags.get_mut(*key) {
            if value.to_string().trim() == old_id.to_string() {
                *value = TagValue::Text(new_id.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::remap_sequential;
    use crate::model::{
        osm::{
            graph::{
                OsmEntityKind, OsmGraph, OsmNodeData, OsmNodeId, OsmRelationData,
                OsmRelationId, OsmRelationMember, OsmWayData, OsmWayId,
            },
            OsmError,
        },
        osw::{tag_value::text_tags, TagValue},
    };
    use std::collections::HashSet;

    fn sample() -> OsmGraph {
        let mut graph = OsmGraph::empty();
        for id in [-5, 42, -1] {
            graph
                .insert_node(
                    OsmNodeData::new(OsmNodeId(id), 0.0, 0.0)
                        .with_tags(text_tags([("_id", id.to_string().as_str())])),
                )
                .expect("insert");
        }
        graph
            .insert_way(OsmWayData::new(OsmWayId(900), vec![OsmNodeId(42), OsmNodeId(-1)]))
            .expect("insert");
        graph
            .insert_way(
                OsmWayData::new(OsmWayId(-3), vec![OsmNodeId(-5), OsmNodeId(42)])
                    .with_tags(text_tags([("_id", "something else")])),
            )
            .expect("insert");
        graph
            .insert_relation(OsmRelationData::new(
                OsmRelationId(77),
                vec![
                    OsmRelationMember::new(OsmEntityKind::Way, -3, "outer"),
                    OsmRelationMember::new(OsmEntityKind::Node, 42, ""),
                ],
            ))
            .expect("insert");
        graph
    }

    #[test]
    fn test_ids_are_dense() {
        let graph = remap_sequential(sample()).expect("remaps");
        let node_ids: Vec<i64> = graph.nodes().map(|n| n.osmid.0).collect();
        let way_ids: Vec<i64> = graph.ways().map(|w| w.osmid.0).collect();
        let relation_ids: Vec<i64> = graph.relations().map(|r| r.osmid.0).collect();
        assert_eq!(node_ids, vec![1, 2, 3]);
        assert_eq!(way_ids, vec![1, 2]);
        assert_eq!(relation_ids, vec![1]);

        let valid: HashSet<i64> = node_ids.iter().copied().collect();
        for way in graph.ways() {
            assert!(way.nodes.iter().all(|n| valid.contains(&n.0)));
        }
    }

    #[test]
    fn test_references_rewritten() {
        let graph = remap_sequential(sample()).expect("remaps");
        let first = graph.get_way_data(&OsmWayId(1)).expect("way 1");
        assert_eq!(first.nodes, vec![OsmNodeId(2), OsmNodeId(3)]);
        let second = graph.get_way_data(&OsmWayId(2)).expect("way 2");
        assert_eq!(second.nodes, vec![OsmNodeId(1), OsmNodeId(2)]);
        assert_eq!(second.tags.get("_id"), Some(&TagValue::from("something else")));

        let relation = graph.relations().next().expect("relation");
        assert_eq!(relation.members[0].reference, 2);
        assert_eq!(relation.members[1].reference, 2);

        let node = graph.get_node_data(&OsmNodeId(2)).expect("node 2");
        assert_eq!(node.tags.get("_id"), Some(&TagValue::from("2")));
    }

    #[test]
    fn test_unresolved_reference() {
        let mut graph = sample();
        graph
            .insert_relation(OsmRelationData::new(
                OsmRelationId(78),
                vec![OsmRelationMember::new(OsmEntityKind::Way, 12345, "")],
            ))
            .expect("insert");
        match remap_sequential(graph) {
            Err(OsmError::UnresolvedReference(OsmEntityKind::Way, 12345, _)) => {}
            other => panic!("expected unresolved reference, found {other:?}"),
        }
    }
}
