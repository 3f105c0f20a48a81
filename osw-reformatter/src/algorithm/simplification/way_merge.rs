use crate::model::osm::{
    graph::{OsmGraph, OsmNodeId, OsmWayData, OsmWayId},
    OsmError,
};
use itertools::Itertools;
use std::collections::{HashMap, HashSet};

/// joins network ways end-to-start through untagged nodes where exactly two
/// network segments meet: one way ending at the node and one way starting
/// there. both ways must share a subtype and neither may be closed.
///
/// a merged way keeps the id of its earliest member in way iteration order.
/// tags are combined in that same order and the first value seen for a key
/// wins. returns the number of ways absorbed into another.
pub fn merge_ways(graph: &mut OsmGraph) -> Result<usize, OsmError> {
    let order: HashMap<OsmWayId, usize> = graph
        .ways()
        .enumerate()
        .map(|(idx, w)| (w.osmid, idx))
        .collect();
    let successors = find_successors(graph)?;
    if successors.is_empty() {
        return Ok(0);
    }
    let predecessors: HashSet<OsmWayId> = successors.values().copied().collect();

    // walk each chain from its head. ways that only appear inside a cycle of
    // mergeable ways have no head and are left untouched.
    let heads = graph
        .ways()
        .map(|w| w.osmid)
        .filter(|id| successors.contains_key(id) && !predecessors.contains(id))
        .collect_vec();
    let mut absorbed: HashSet<OsmWayId> = HashSet::new();
    let mut merged_ways: Vec<OsmWayData> = vec![];
    for head in heads {
        let mut chain = vec![head];
        let mut visited: HashSet<OsmWayId> = HashSet::from([head]);
        while let Some(next) = chain.last().and_then(|last| successors.get(last)) {
            if !visited.insert(*next) {
                break;
            }
            chain.push(*next);
        }
        let merged = merge_chain(graph, &chain, &order)?;
        absorbed.extend(chain.iter().filter(|id| **id != merged.osmid));
        merged_ways.push(merged);
    }

    for merged in merged_ways {
        let target = graph.get_way_data_mut(&merged.osmid)?;
        *target = merged;
    }
    graph.retain_ways(|id, _| !absorbed.contains(id));
    log::debug!("merged {} ways into their neighbors", absorbed.len());
    Ok(absorbed.len())
}

/// for each mergeable way, the way that continues it
fn find_successors(graph: &OsmGraph) -> Result<HashMap<OsmWayId, OsmWayId>, OsmError> {
    let degrees = graph.network_degrees();
    let mut starts: HashMap<OsmNodeId, Vec<&OsmWayData>> = HashMap::new();
    let mut ends: HashMap<OsmNodeId, Vec<&OsmWayData>> = HashMap::new();
    for way in graph.ways().filter(|w| w.is_network() && w.nodes.len() > 1) {
        if let (Some(src), Some(dst)) = (way.src_node_id(), way.dst_node_id()) {
            starts.entry(*src).or_default().push(way);
            ends.entry(*dst).or_default().push(way);
        }
    }

    let mut successors = HashMap::new();
    for (joint, ending) in ends.iter() {
        let (Some(starting), Some(2)) = (starts.get(joint), degrees.get(joint)) else {
            continue;
        };
        let (&[a], &[b]) = (ending.as_slice(), starting.as_slice()) else {
            continue;
        };
        let node = graph.get_node_data(joint)?;
        let mergeable = a.osmid != b.osmid
            && node.tags.is_empty()
            && a.subtype == b.subtype
            && !a.is_closed()
            && !b.is_closed()
            && a.src_node_id() != b.dst_node_id();
        if mergeable {
            successors.insert(a.osmid, b.osmid);
        }
    }
    Ok(successors)
}

/// combines a chain of ways, listed in travel order, into one way
fn merge_chain(
    graph: &OsmGraph,
    chain: &[OsmWayId],
    order: &HashMap<OsmWayId, usize>,
) -> Result<OsmWayData, OsmError> {
    let ways = chain
        .iter()
        .map(|id| graph.get_way_data(id))
        .collect::<Result<Vec<_>, _>>()?;
    let first = ways
        .iter()
        .min_by_key(|w| order.get(&w.osmid).copied().unwrap_or(usize::MAX))
        .ok_or_else(|| OsmError::InternalError(String::from("way chain is empty")))?;

    let mut merged = (*first).clone();
    merged.nodes = ways
        .iter()
        .enumerate()
        .flat_map(|(idx, w)| w.nodes.iter().skip(if idx == 0 { 0 } else { 1 }))
        .copied()
        .collect_vec();
    merged.way_ids = ways.iter().flat_map(|w| w.way_ids.iter().copied()).collect_vec();
    merged.geometry = None;

    let by_iteration = ways
        .iter()
        .sorted_by_key(|w| order.get(&w.osmid).copied().unwrap_or(usize::MAX));
    for way in by_iteration.filter(|w| w.osmid != merged.osmid) {
        for (key, value) in way.tags.iter() {
            match merged.tags.get(key) {
                None => {
                    merged.tags.insert(key.clone(), value.clone());
                }
                Some(existing) if existing != value => {
                    log::debug!(
                        "merging way {} into {}: keeping {key}={existing} over {value}",
                        way.osmid,
                        merged.osmid
                    );
                }
                Some(_) => {}
            }
        }
    }
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::merge_ways;
    use crate::model::{
        osm::graph::{OsmGraph, OsmNodeData, OsmNodeId, OsmWayData, OsmWayId},
        osw::{tag_value::text_tags, OswSubtype, TagValue},
    };

    fn graph_with(ways: Vec<OsmWayData>, n_nodes: i64) -> OsmGraph {
        let mut graph = OsmGraph::empty();
        for id in 1..=n_nodes {
            graph
                .insert_node(OsmNodeData::new(OsmNodeId(id), id as f64 * 0.001, 0.0))
                .expect("insert node");
        }
        for way in ways {
            graph.insert_way(way).expect("insert way");
        }
        graph
    }

    fn way(id: i64, refs: &[i64], subtype: OswSubtype, tags: &[(&str, &str)]) -> OsmWayData {
        let mut way = OsmWayData::new(OsmWayId(id), refs.iter().map(|r| OsmNodeId(*r)).collect())
            .with_tags(text_tags(tags.iter().copied()));
        way.subtype = Some(subtype);
        way
    }

    #[test]
    fn test_merge_chain_first_wins() {
        // iteration order puts the downstream way first
        let mut graph = graph_with(
            vec![
                way(20, &[3, 4, 5], OswSubtype::Footway, &[("highway", "footway"), ("surface", "gravel")]),
                way(10, &[1, 2, 3], OswSubtype::Footway, &[("highway", "footway"), ("surface", "asphalt"), ("lit", "yes")]),
            ],
            5,
        );
        let merged = merge_ways(&mut graph).expect("merges");
        assert_eq!(merged, 1);
        assert_eq!(graph.n_ways(), 1);
        let way = graph.get_way_data(&OsmWayId(20)).expect("earliest way id kept");
        assert_eq!(
            way.nodes,
            vec![OsmNodeId(1), OsmNodeId(2), OsmNodeId(3), OsmNodeId(4), OsmNodeId(5)]
        );
        assert_eq!(way.tags.get("surface"), Some(&TagValue::from("gravel")));
        assert_eq!(way.tags.get("lit"), Some(&TagValue::from("yes")));
        assert_eq!(way.way_ids, vec![OsmWayId(10), OsmWayId(20)]);
    }

    #[test]
    fn test_no_merge_across_subtypes() {
        let mut graph = graph_with(
            vec![
                way(10, &[1, 2], OswSubtype::Sidewalk, &[]),
                way(11, &[2, 3], OswSubtype::Crossing, &[]),
            ],
            3,
        );
        assert_eq!(merge_ways(&mut graph).expect("runs"), 0);
        assert_eq!(graph.n_ways(), 2);
    }

    #[test]
    fn test_no_merge_through_tagged_or_junction_node() {
        let mut graph = graph_with(
            vec![
                way(10, &[1, 2], OswSubtype::Footway, &[]),
                way(11, &[2, 3], OswSubtype::Footway, &[]),
                way(12, &[3, 4], OswSubtype::Footway, &[]),
                way(13, &[3, 5], OswSubtype::Footway, &[]),
            ],
            5,
        );
        graph
            .get_node_data_mut(&OsmNodeId(2))
            .expect("node 2")
            .tags = text_tags([("kerb", "lowered")]);
        assert_eq!(merge_ways(&mut graph).expect("runs"), 0);
        assert_eq!(graph.n_ways(), 4);
    }

    #[test]
    fn test_no_merge_against_direction() {
        let mut graph = graph_with(
            vec![
                way(10, &[1, 2], OswSubtype::Footway, &[]),
                way(11, &[3, 2], OswSubtype::Footway, &[]),
            ],
            3,
        );
        assert_eq!(merge_ways(&mut graph).expect("runs"), 0);
    }
}
