use super::{
    osw_layer::OswLayer,
    tag_value::{TagSet, TagValue},
};
use crate::model::osm::OsmError;
use geo::{Coord, Geometry, LineString};
use itertools::Itertools;
use std::collections::BTreeMap;

/// a single feature of a walkway layer
#[derive(Debug, Clone, PartialEq)]
pub struct OswFeature {
    pub id: String,
    pub layer: OswLayer,
    pub geometry: Geometry<f64>,
    /// third coordinate of a point feature
    pub elevation: Option<f64>,
    /// normalized tags plus the identifier properties (`_id`, `_u_id`, ...)
    pub properties: TagSet,
}

impl OswFeature {
    pub fn new(id: String, layer: OswLayer, geometry: Geometry<f64>, tags: TagSet) -> OswFeature {
        let mut properties = tags;
        properties.insert(String::from("_id"), TagValue::Text(id.clone()));
        OswFeature {
            id,
            layer,
            geometry,
            elevation: None,
            properties,
        }
    }

    pub fn with_elevation(mut self, elevation: Option<f64>) -> OswFeature {
        self.elevation = elevation;
        self
    }

    pub fn with_property(mut self, key: &str, value: TagValue) -> OswFeature {
        self.properties.insert(String::from(key), value);
        self
    }

    /// converts this feature into a GeoJSON feature. fails when the geometry
    /// is empty or not one of Point, LineString or Polygon.
    pub fn to_geojson(&self) -> Result<geojson::Feature, OsmError> {
        let value = match &self.geometry {
            Geometry::Point(p) => {
                let mut position = vec![p.x(), p.y()];
                if let Some(z) = self.elevation.filter(|z| z.is_finite()) {
                    position.push(z);
                }
                geojson::Value::Point(position)
            }
            Geometry::LineString(line) => {
                if line.0.len() < 2 {
                    return Err(self.invalid("linestring with fewer than 2 coordinates"));
                }
                geojson::Value::LineString(positions(line))
            }
            Geometry::Polygon(polygon) => {
                if polygon.exterior().0.len() < 4 {
                    return Err(self.invalid("polygon ring with fewer than 4 coordinates"));
                }
                let rings = std::iter::once(polygon.exterior())
                    .chain(polygon.interiors().iter())
                    .map(positions)
                    .collect_vec();
                geojson::Value::Polygon(rings)
            }
            _ => return Err(self.invalid("unsupported geometry type")),
        };
        let properties = self
            .properties
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect::<serde_json::Map<_, _>>();
        Ok(geojson::Feature {
            bbox: None,
            geometry: Some(geojson::Geometry::new(value)),
            id: None,
            properties: Some(properties),
            foreign_members: None,
        })
    }

    fn invalid(&self, message: &str) -> OsmError {
        OsmError::InvalidFeature(self.layer.to_string(), format!("{}: {message}", self.id))
    }
}

fn positions(line: &LineString<f64>) -> Vec<Vec<f64>> {
    line.coords().map(|c: &Coord<f64>| vec![c.x, c.y]).collect_vec()
}

/// the features produced by one forward conversion, grouped by layer in
/// the order they were constructed
#[derive(Debug, Clone, Default)]
pub struct OswDataset {
    layers: BTreeMap<OswLayer, Vec<OswFeature>>,
}

impl OswDataset {
    pub fn push(&mut self, feature: OswFeature) {
        self.layers.entry(feature.layer).or_default().push(feature);
    }

    pub fn features(&self, layer: OswLayer) -> &[OswFeature] {
        self.layers.get(&layer).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn len(&self, layer: OswLayer) -> usize {
        self.features(layer).len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.values().all(|v| v.is_empty())
    }

    pub fn total(&self) -> usize {
        self.layers.values().map(|v| v.len()).sum()
    }
}
