use super::way_merge;
use crate::model::osm::{
    graph::{OsmGraph, OsmNodeId, OsmWayData, OsmWayId},
    OsmError,
};
use geo::LineString;
use itertools::Itertools;
use kdam::tqdm;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimplificationSummary {
    pub ways_merged: usize,
    pub nodes_contracted: usize,
    pub ways_split: usize,
}

/// reduces the network to the vertices needed to reproduce its topology
/// and tagging.
///
/// a node is a required vertex when it carries tags, when the number of
/// network segments touching it is not 2, or when it ends a network way.
/// each network way stores its full geometry and is then cut at its
/// interior required vertices, so every resulting way runs between exactly
/// two vertices. the first part keeps the way id and later parts receive
/// ids above the largest way id in the graph. nodes that were spliced out
/// and are referenced by no other way are removed.
pub fn simplify_graph(graph: &mut OsmGraph, merge: bool) -> Result<SimplificationSummary, OsmError> {
    let ways_merged = if merge {
        way_merge::merge_ways(graph)?
    } else {
        0
    };

    let degrees = graph.network_degrees();
    let endpoints = graph.network_endpoints();
    let required = degrees
        .iter()
        .map(|(node_id, degree)| {
            let node = graph.get_node_data(node_id)?;
            let is_required =
                !node.tags.is_empty() || *degree != 2 || endpoints.contains(node_id);
            Ok((*node_id, is_required))
        })
        .collect::<Result<Vec<_>, OsmError>>()?
        .into_iter()
        .filter_map(|(id, is_required)| if is_required { Some(id) } else { None })
        .collect::<HashSet<_>>();

    let network_ways = graph
        .ways()
        .filter(|w| w.is_network() && w.geometry.is_none() && w.nodes.len() > 1)
        .map(|w| w.osmid)
        .collect_vec();
    let mut next_way_id = graph.max_way_id() + 1;
    let mut contracted: HashSet<OsmNodeId> = HashSet::new();
    let mut split_parts: Vec<OsmWayData> = vec![];

    let iter = tqdm!(
        network_ways.iter(),
        desc = "simplify ways",
        total = network_ways.len()
    );
    for way_id in iter {
        let way = graph.get_way_data(way_id)?;
        let line = way.create_linestring(graph.nodes_map())?;
        let last = way.nodes.len() - 1;
        let mut cuts = vec![0];
        for (idx, node_id) in way.nodes.iter().enumerate().take(last).skip(1) {
            if required.contains(node_id) {
                cuts.push(idx);
            } else {
                contracted.insert(*node_id);
            }
        }
        cuts.push(last);

        let mut parts = cuts
            .iter()
            .tuple_windows()
            .map(|(src, dst)| {
                let nodes = vec![way.nodes[*src], way.nodes[*dst]];
                let geometry = LineString::new(line.0[*src..=*dst].to_vec());
                (nodes, geometry)
            })
            .collect_vec()
            .into_iter();
        let (nodes, geometry) = parts.next().ok_or_else(|| {
            OsmError::InternalError(format!("way {way_id} has no simplified segment"))
        })?;
        for (part_nodes, part_geometry) in parts {
            split_parts.push(OsmWayData {
                osmid: OsmWayId(next_way_id),
                nodes: part_nodes,
                geometry: Some(part_geometry),
                version: None,
                ..way.clone()
            });
            next_way_id += 1;
        }

        let target = graph.get_way_data_mut(way_id)?;
        target.nodes = nodes;
        target.geometry = Some(geometry);
    }
    eprintln!();

    let ways_split = split_parts.len();
    for part in split_parts {
        graph.insert_way(part)?;
    }

    let still_referenced = graph.referenced_node_ids();
    let removable: HashSet<OsmNodeId> = contracted
        .into_iter()
        .filter(|id| !still_referenced.contains(id))
        .collect();
    graph.retain_nodes(|id, _| !removable.contains(id));

    let summary = SimplificationSummary {
        ways_merged,
        nodes_contracted: removable.len(),
        ways_split,
    };
    log::info!(
        "simplified graph: {} ways merged, {} nodes contracted, {} ways split",
        summary.ways_merged,
        summary.nodes_contracted,
        summary.ways_split
    );
    Ok(summary)
}
