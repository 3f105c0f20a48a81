use crate::model::{
    osm::{
        graph::{OsmGraph, OsmWayData},
        OsmError,
    },
    osw::{OswDataset, OswFeature, OswLayer, TagValue},
};
use geo::{Coord, Geometry, LineString, Polygon};
use itertools::Itertools;
use kdam::tqdm;
use wkt::ToWkt;

/// resolves the graph into walkway layer features.
///
/// every vertex of a network way becomes a node feature and every node
/// classified as a point becomes a point feature. ways become edges, lines,
/// zones or polygons by subtype. edges carry the ids of their two vertices,
/// zones the ids of their boundary nodes.
///
/// a way that cannot be resolved into valid geometry fails the conversion,
/// or with `ignore_invalid` is logged and left out.
pub fn construct_geometries(graph: &OsmGraph, ignore_invalid: bool) -> Result<OswDataset, OsmError> {
    let mut dataset = OswDataset::default();
    let network = graph.network_node_ids();
    let mut skipped: usize = 0;

    for node in graph.nodes() {
        let layer = match node.subtype.map(|s| s.layer()) {
            _ if network.contains(&node.osmid) => OswLayer::Nodes,
            Some(OswLayer::Points) => OswLayer::Points,
            _ => continue,
        };
        let feature = OswFeature::new(
            node.osmid.to_string(),
            layer,
            Geometry::Point(node.get_point()),
            node.tags.clone(),
        )
        .with_elevation(node.get_elevation());
        dataset.push(feature);
    }

    let iter = tqdm!(graph.ways(), desc = "construct geometries", total = graph.n_ways());
    for way in iter {
        match way_feature(graph, way) {
            Ok(Some(feature)) => dataset.push(feature),
            Ok(None) => {}
            Err(e) if ignore_invalid => {
                log::warn!("skipping way {}: {e}", way.osmid);
                skipped += 1;
            }
            Err(e) => return Err(e),
        }
    }
    eprintln!();

    log::info!(
        "constructed {} features ({} nodes, {} edges, {} points, {} lines, {} zones, {} polygons), {skipped} ways skipped",
        dataset.total(),
        dataset.len(OswLayer::Nodes),
        dataset.len(OswLayer::Edges),
        dataset.len(OswLayer::Points),
        dataset.len(OswLayer::Lines),
        dataset.len(OswLayer::Zones),
        dataset.len(OswLayer::Polygons),
    );
    Ok(dataset)
}

fn way_feature(graph: &OsmGraph, way: &OsmWayData) -> Result<Option<OswFeature>, OsmError> {
    let Some(subtype) = way.subtype else {
        return Ok(None);
    };
    let layer = subtype.layer();
    let line = way.get_linestring(graph.nodes_map())?;
    let id = way.osmid.to_string();
    let feature = match layer {
        OswLayer::Edges => {
            validate_line(way, &line)?;
            let (src, dst) = way
                .src_node_id()
                .zip(way.dst_node_id())
                .ok_or_else(|| degenerate(way, "way has no node references"))?;
            OswFeature::new(id, layer, Geometry::LineString(line), way.tags.clone())
                .with_property("_u_id", TagValue::Text(src.to_string()))
                .with_property("_v_id", TagValue::Text(dst.to_string()))
        }
        OswLayer::Lines => {
            validate_line(way, &line)?;
            OswFeature::new(id, layer, Geometry::LineString(line), way.tags.clone())
        }
        OswLayer::Zones => {
            let polygon = close_ring(way, line)?;
            let boundary = way
                .nodes
                .iter()
                .map(|n| serde_json::Value::String(n.to_string()))
                .collect_vec();
            OswFeature::new(id, layer, Geometry::Polygon(polygon), way.tags.clone())
                .with_property("_w_id", TagValue::Structured(serde_json::Value::Array(boundary)))
        }
        OswLayer::Polygons => {
            let polygon = close_ring(way, line)?;
            OswFeature::new(id, layer, Geometry::Polygon(polygon), way.tags.clone())
        }
        OswLayer::Nodes | OswLayer::Points => {
            return Err(OsmError::InternalError(format!(
                "way {} has node subtype {subtype}",
                way.osmid
            )))
        }
    };
    Ok(Some(feature))
}

fn validate_line(way: &OsmWayData, line: &LineString<f64>) -> Result<(), OsmError> {
    if line.0.len() < 2 {
        return Err(degenerate(way, "fewer than 2 coordinates"));
    }
    if line.0.iter().all_equal() {
        return Err(degenerate(way, "all coordinates are identical"));
    }
    Ok(())
}

/// builds a polygon from a way ring. a ring missing only its closing
/// coordinate is closed; anything shorter than a triangle is rejected.
fn close_ring(way: &OsmWayData, line: LineString<f64>) -> Result<Polygon<f64>, OsmError> {
    let mut coords: Vec<Coord<f64>> = line.0;
    let closed = coords.len() > 1 && coords.first() == coords.last();
    if !closed {
        if coords.len() < 3 {
            return Err(degenerate(way, "ring has fewer than 3 coordinates"));
        }
        if let Some(first) = coords.first().copied() {
            coords.push(first);
        }
    }
    if coords.len() < 4 || coords.iter().unique_by(|c| (c.x.to_bits(), c.y.to_bits())).count() < 3 {
        return Err(degenerate(way, "ring does not enclose an area"));
    }
    Ok(Polygon::new(LineString::new(coords), vec![]))
}

fn degenerate(way: &OsmWayData, reason: &str) -> OsmError {
    let shape = way
        .geometry
        .as_ref()
        .map(|g| g.wkt_string())
        .unwrap_or_else(|| format!("{} node references", way.nodes.len()));
    OsmError::DegenerateGeometry(format!("way {} ({shape})", way.osmid), String::from(reason))
}

#[cfg(test)]
mod tests {
    use super::construct_geometries;
    use crate::model::{
        osm::{
            graph::{OsmGraph, OsmNodeData, OsmNodeId, OsmWayData, OsmWayId},
            OsmError,
        },
        osw::{tag_value::text_tags, OswLayer, OswSubtype, TagValue},
    };
    use geo::Geometry;

    fn graph() -> OsmGraph {
        let mut graph = OsmGraph::empty();
        let coords = [(1, 0.0, 0.0), (2, 1.0, 0.0), (3, 1.0, 1.0), (4, 0.0, 1.0), (5, 5.0, 5.0)];
        for (id, x, y) in coords {
            graph
                .insert_node(OsmNodeData::new(OsmNodeId(id), x, y))
                .expect("insert");
        }
        let pole = graph.get_node_data_mut(&OsmNodeId(5)).expect("node 5");
        pole.subtype = Some(OswSubtype::PowerPole);
        pole.tags = text_tags([("power", "pole")]);
        pole.elevation = Some(12.5);
        graph
    }

    fn way(id: i64, refs: &[i64], subtype: OswSubtype) -> OsmWayData {
        let mut way = OsmWayData::new(OsmWayId(id), refs.iter().map(|r| OsmNodeId(*r)).collect());
        way.subtype = Some(subtype);
        way
    }

    #[test]
    fn test_layers() {
        let mut graph = graph();
        graph.insert_way(way(10, &[1, 2], OswSubtype::Footway)).expect("insert");
        graph
            .insert_way(way(11, &[1, 2, 3, 4], OswSubtype::PedestrianArea))
            .expect("insert");
        let dataset = construct_geometries(&graph, false).expect("constructs");

        assert_eq!(dataset.len(OswLayer::Nodes), 2);
        assert_eq!(dataset.len(OswLayer::Points), 1);
        assert_eq!(dataset.len(OswLayer::Edges), 1);
        assert_eq!(dataset.len(OswLayer::Zones), 1);

        let edge = &dataset.features(OswLayer::Edges)[0];
        assert_eq!(edge.properties.get("_u_id"), Some(&TagValue::from("1")));
        assert_eq!(edge.properties.get("_v_id"), Some(&TagValue::from("2")));
        assert_eq!(edge.properties.get("_id"), Some(&TagValue::from("10")));

        let zone = &dataset.features(OswLayer::Zones)[0];
        match &zone.geometry {
            Geometry::Polygon(p) => assert_eq!(p.exterior().0.len(), 5),
            other => panic!("expected polygon, found {other:?}"),
        }
        assert_eq!(
            zone.properties.get("_w_id").map(|v| v.to_string()),
            Some(String::from(r#"["1", "2", "3", "4"]"#))
        );

        let pole = &dataset.features(OswLayer::Points)[0];
        assert_eq!(pole.elevation, Some(12.5));
    }

    #[test]
    fn test_degenerate_edge() {
        let mut graph = graph();
        graph.insert_way(way(10, &[1], OswSubtype::Footway)).expect("insert");
        match construct_geometries(&graph, false) {
            Err(OsmError::DegenerateGeometry(..)) => {}
            other => panic!("expected degenerate geometry, found {other:?}"),
        }
        let dataset = construct_geometries(&graph, true).expect("skips invalid way");
        assert_eq!(dataset.len(OswLayer::Edges), 0);
    }

    #[test]
    fn test_degenerate_polygon() {
        let mut graph = graph();
        graph
            .insert_way(way(12, &[1, 2], OswSubtype::GenericPolygon))
            .expect("insert");
        match construct_geometries(&graph, false) {
            Err(OsmError::DegenerateGeometry(..)) => {}
            other => panic!("expected degenerate geometry, found {other:?}"),
        }
    }
}
