use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// the typed layers of a walkway network dataset, one file each
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OswLayer {
    Nodes,
    Edges,
    Points,
    Lines,
    Zones,
    Polygons,
}

impl OswLayer {
    pub const ALL: [OswLayer; 6] = [
        OswLayer::Nodes,
        OswLayer::Edges,
        OswLayer::Points,
        OswLayer::Lines,
        OswLayer::Zones,
        OswLayer::Polygons,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            OswLayer::Nodes => "nodes",
            OswLayer::Edges => "edges",
            OswLayer::Points => "points",
            OswLayer::Lines => "lines",
            OswLayer::Zones => "zones",
            OswLayer::Polygons => "polygons",
        }
    }

    /// layers written even when they hold no features
    pub fn is_mandatory(&self) -> bool {
        matches!(self, OswLayer::Nodes | OswLayer::Edges)
    }

    /// finds the layer a `.geojson` file holds by its file name, as in
    /// `bundle.graph.edges.geojson` or `osw_nodes_v2.geojson`. any token of
    /// the name may carry the layer; the last one naming a layer wins.
    pub fn from_filename(filename: &str) -> Option<OswLayer> {
        let lower = filename.to_lowercase();
        let stem = lower.strip_suffix(".geojson")?;
        let name = stem.rsplit('/').next().unwrap_or(stem);
        name.rsplit(&['.', '_', '-'][..]).find_map(|token| {
            OswLayer::ALL
                .into_iter()
                .find(|layer| layer.name() == token)
        })
    }

    pub fn filename(&self, file_prefix: &str) -> String {
        format!("{file_prefix}.graph.{}.geojson", self.name())
    }
}

impl Display for OswLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
