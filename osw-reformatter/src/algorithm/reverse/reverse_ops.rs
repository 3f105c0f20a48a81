use crate::{
    algorithm::{geometry::GeometryHash, remap::ID_MIRROR_TAGS},
    config::ReformatterConfiguration,
    model::{
        osm::{
            graph::{OsmGraph, OsmNodeData, OsmNodeId, OsmWayData, OsmWayId},
            OsmError,
        },
        osw::{
            layer_reader::feature_id,
            osm_normalizer::{apply_elevation, osm_tags_from_properties, preferred_id},
            OswLayer, TagSet, TagValue,
        },
    },
};
use geo::Coord;
use kdam::tqdm;
use serde::{Deserialize, Serialize};
use serde_json::Map;
use std::collections::{HashMap, HashSet};

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReverseSummary {
    pub features_read: usize,
    pub nodes_deduplicated: usize,
    pub shape_points_materialized: usize,
    pub orphan_references: usize,
    pub duplicate_lines: usize,
    pub features_skipped: usize,
}

/// a coordinate of a feature geometry with its optional third dimension
struct Position {
    coord: Coord<f64>,
    elevation: Option<f64>,
}

/// rebuilds a raw entity graph from walkway layers.
///
/// node layer features are deduplicated by [`GeometryHash`] into a shared
/// node set that the vertices of edges, lines, zones and polygons are then
/// resolved against. the node layer must be added before any way layer.
pub struct ReverseMapper {
    precision: u32,
    materialize_shape_points: bool,
    ignore_invalid: bool,
    graph: OsmGraph,
    node_lookup: HashMap<GeometryHash, OsmNodeId>,
    line_hashes: HashSet<(OswLayer, GeometryHash)>,
    next_node_id: i64,
    next_way_id: i64,
    summary: ReverseSummary,
}

impl ReverseMapper {
    pub fn new(config: &ReformatterConfiguration) -> ReverseMapper {
        ReverseMapper {
            precision: config.coordinate_precision,
            materialize_shape_points: config.materialize_shape_points,
            ignore_invalid: config.ignore_invalid_entities,
            graph: OsmGraph::empty(),
            node_lookup: HashMap::new(),
            line_hashes: HashSet::new(),
            next_node_id: -1,
            next_way_id: -1,
            summary: ReverseSummary::default(),
        }
    }

    pub fn summary(&self) -> &ReverseSummary {
        &self.summary
    }

    pub fn add_layer(&mut self, layer: OswLayer, features: &[geojson::Feature]) -> Result<(), OsmError> {
        let iter = tqdm!(
            features.iter(),
            desc = format!("reverse {layer}"),
            total = features.len()
        );
        for feature in iter {
            self.summary.features_read += 1;
            let result = match layer {
                OswLayer::Nodes => self.add_node_feature(feature, true),
                OswLayer::Points => self.add_node_feature(feature, false),
                OswLayer::Edges => self.add_way_feature(feature, layer, self.materialize_shape_points),
                OswLayer::Lines | OswLayer::Zones | OswLayer::Polygons => {
                    self.add_way_feature(feature, layer, true)
                }
            };
            if let Err(e) = result {
                if !self.ignore_invalid {
                    return Err(e);
                }
                log::warn!("skipping {layer} feature {}: {e}", describe(feature));
                self.summary.features_skipped += 1;
            }
        }
        eprintln!();
        Ok(())
    }

    pub fn finish(self) -> (OsmGraph, ReverseSummary) {
        log::info!(
            "rebuilt {} nodes, {} ways from {} features ({} nodes deduplicated, {} shape points, {} orphan references, {} duplicate lines, {} skipped)",
            self.graph.n_nodes(),
            self.graph.n_ways(),
            self.summary.features_read,
            self.summary.nodes_deduplicated,
            self.summary.shape_points_materialized,
            self.summary.orphan_references,
            self.summary.duplicate_lines,
            self.summary.features_skipped
        );
        (self.graph, self.summary)
    }

    /// adds a point feature as a node. with `shared`, the node joins the
    /// coordinate lookup and a feature at an already known coordinate
    /// contributes its tags to the existing node instead.
    fn add_node_feature(&mut self, feature: &geojson::Feature, shared: bool) -> Result<(), OsmError> {
        let position = match feature.geometry.as_ref().map(|g| &g.value) {
            Some(geojson::Value::Point(p)) => position(p)?,
            _ => return Err(invalid(feature, "expected a Point geometry")),
        };
        let empty = Map::new();
        let properties = feature.properties.as_ref().unwrap_or(&empty);
        let layer = if shared { OswLayer::Nodes } else { OswLayer::Points };
        let mut tags = osm_tags_from_properties(properties, layer);
        if let Some(z) = position.elevation {
            apply_elevation(&mut tags, z)?;
        }

        let hash = GeometryHash::from_coord(&position.coord, self.precision);
        if shared {
            if let Some(existing) = self.node_lookup.get(&hash) {
                let node = self.graph.get_node_data_mut(existing)?;
                for (key, value) in tags {
                    node.tags.entry(key).or_insert(value);
                }
                self.summary.nodes_deduplicated += 1;
                return Ok(());
            }
        }
        let node_id = self.allocate_node_id(preferred_id(properties));
        mirror_allocated_id(&mut tags, node_id.0);
        let mut node = OsmNodeData::new(node_id, position.coord.x, position.coord.y).with_tags(tags);
        node.elevation = position.elevation;
        node.visible = Some(true);
        self.graph.insert_node(node)?;
        if shared {
            self.node_lookup.insert(hash, node_id);
        }
        Ok(())
    }

    /// adds a line or polygon feature as a way. coordinates resolve to node
    /// layer nodes by hash. an edge endpoint without a match is an orphan and
    /// its reference is dropped; other unmatched coordinates become untagged
    /// nodes when `materialize` is set and are dropped otherwise.
    fn add_way_feature(
        &mut self,
        feature: &geojson::Feature,
        layer: OswLayer,
        materialize: bool,
    ) -> Result<(), OsmError> {
        let positions = match feature.geometry.as_ref().map(|g| &g.value) {
            Some(geojson::Value::LineString(line)) => {
                line.iter().map(|p| position(p)).collect::<Result<Vec<_>, _>>()?
            }
            Some(geojson::Value::Polygon(rings)) => {
                if rings.len() > 1 {
                    log::debug!(
                        "feature {} has {} interior rings that are not represented",
                        describe(feature),
                        rings.len() - 1
                    );
                }
                let exterior = rings
                    .first()
                    .ok_or_else(|| invalid(feature, "polygon has no exterior ring"))?;
                exterior.iter().map(|p| position(p)).collect::<Result<Vec<_>, _>>()?
            }
            _ => return Err(invalid(feature, "expected a LineString or Polygon geometry")),
        };

        let line_hash =
            GeometryHash::from_coords(positions.iter().map(|p| &p.coord), self.precision);
        if !self.line_hashes.insert((layer, line_hash)) {
            log::debug!("skipping duplicate {layer} geometry of {}", describe(feature));
            self.summary.duplicate_lines += 1;
            return Ok(());
        }

        let last = positions.len().saturating_sub(1);
        let mut refs: Vec<OsmNodeId> = Vec::with_capacity(positions.len());
        for (idx, p) in positions.iter().enumerate() {
            let hash = GeometryHash::from_coord(&p.coord, self.precision);
            if let Some(node_id) = self.node_lookup.get(&hash) {
                refs.push(*node_id);
                continue;
            }
            let is_endpoint = layer == OswLayer::Edges && (idx == 0 || idx == last);
            if is_endpoint || !materialize {
                let orphan = OsmError::OrphanGeometry(describe(feature), format_coord(&p.coord));
                log::warn!("{orphan}, dropping reference");
                self.summary.orphan_references += 1;
                continue;
            }
            let node_id = self.allocate_node_id(None);
            let mut node = OsmNodeData::new(node_id, p.coord.x, p.coord.y);
            if let Some(z) = p.elevation {
                apply_elevation(&mut node.tags, z)?;
                node.elevation = Some(z);
            }
            node.visible = Some(true);
            self.graph.insert_node(node)?;
            self.node_lookup.insert(hash, node_id);
            self.summary.shape_points_materialized += 1;
            refs.push(node_id);
        }
        refs.dedup();
        if refs.len() < 2 {
            return Err(OsmError::DegenerateGeometry(
                describe(feature),
                format!("{} resolved node references", refs.len()),
            ));
        }

        let empty = Map::new();
        let properties = feature.properties.as_ref().unwrap_or(&empty);
        let mut tags: TagSet = osm_tags_from_properties(properties, layer);
        let way_id = self.allocate_way_id(preferred_id(properties));
        mirror_allocated_id(&mut tags, way_id.0);
        let mut way = OsmWayData::new(way_id, refs).with_tags(tags);
        way.visible = Some(true);
        self.graph.insert_way(way)
    }

    fn allocate_node_id(&mut self, preferred: Option<i64>) -> OsmNodeId {
        match preferred.filter(|id| *id > 0 && !self.graph.contains_node(&OsmNodeId(*id))) {
            Some(id) => OsmNodeId(id),
            None => {
                let id = OsmNodeId(self.next_node_id);
                self.next_node_id -= 1;
                id
            }
        }
    }

    fn allocate_way_id(&mut self, preferred: Option<i64>) -> OsmWayId {
        match preferred.filter(|id| *id > 0 && !self.graph.contains_way(&OsmWayId(*id))) {
            Some(id) => OsmWayId(id),
            None => {
                let id = OsmWayId(self.next_way_id);
                self.next_way_id -= 1;
                id
            }
        }
    }
}

/// points a numeric id mirror tag at the id the entity was given, so a
/// feature whose requested id was taken does not repeat another entity's id.
/// non-numeric mirror values are kept as they are.
fn mirror_allocated_id(tags: &mut TagSet, allocated: i64) {
    for key in ID_MIRROR_TAGS {
        if let Some(value) = tags.get_mut(*key) {
            let numeric = value.to_string().trim().parse::<i64>().ok();
            if numeric.is_some_and(|id| id != allocated) {
                *value = TagValue::Text(allocated.to_string());
            }
        }
    }
}

fn position(p: &[f64]) -> Result<Position, OsmError> {
    let (x, y) = match p {
        [x, y, ..] => (*x, *y),
        _ => {
            return Err(OsmError::InvalidFeature(
                String::from("coordinate"),
                format!("position has {} values, expected at least 2", p.len()),
            ))
        }
    };
    let elevation = match p.get(2) {
        Some(z) if z.is_finite() => Some(*z),
        Some(z) => {
            return Err(OsmError::InvalidFeature(
                String::from("elevation"),
                format!("elevation must be a finite number, found {z}"),
            ))
        }
        None => None,
    };
    Ok(Position {
        coord: Coord { x, y },
        elevation,
    })
}

fn describe(feature: &geojson::Feature) -> String {
    feature_id(feature)
        .map(|id| format!("'{id}'"))
        .unwrap_or_else(|| String::from("<no _id>"))
}

fn format_coord(coord: &Coord<f64>) -> String {
    format!("({}, {})", coord.x, coord.y)
}

fn invalid(feature: &geojson::Feature, reason: &str) -> OsmError {
    let kind = feature
        .geometry
        .as_ref()
        .map(|g| match g.value {
            geojson::Value::Point(_) => "Point",
            geojson::Value::MultiPoint(_) => "MultiPoint",
            geojson::Value::LineString(_) => "LineString",
            geojson::Value::MultiLineString(_) => "MultiLineString",
            geojson::Value::Polygon(_) => "Polygon",
            geojson::Value::MultiPolygon(_) => "MultiPolygon",
            geojson::Value::GeometryCollection(_) => "GeometryCollection",
        })
        .unwrap_or("null");
    OsmError::InvalidFeature(describe(feature), format!("{reason}, found {kind}"))
}
