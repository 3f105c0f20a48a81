use super::osw_layer::OswLayer;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// the walkway schema classification of an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OswSubtype {
    Sidewalk,
    Crossing,
    TrafficIsland,
    Footway,
    Stairs,
    PedestrianArea,
    Pedestrian,
    LivingStreet,
    GenericZone,
    GenericPolygon,
    GenericLine,
    Kerb,
    PowerPole,
    Tree,
    FireHydrant,
    GenericPoint,
}

impl OswSubtype {
    pub fn layer(&self) -> OswLayer {
        use OswSubtype as S;
        match self {
            S::Sidewalk
            | S::Crossing
            | S::TrafficIsland
            | S::Footway
            | S::Stairs
            | S::Pedestrian
            | S::LivingStreet => OswLayer::Edges,
            S::PedestrianArea | S::GenericZone => OswLayer::Zones,
            S::GenericPolygon => OswLayer::Polygons,
            S::GenericLine => OswLayer::Lines,
            S::Kerb => OswLayer::Nodes,
            S::PowerPole | S::Tree | S::FireHydrant | S::GenericPoint => OswLayer::Points,
        }
    }

    /// true for subtypes that form the routable walkway network
    pub fn is_network(&self) -> bool {
        self.layer() == OswLayer::Edges
    }

    pub fn name(&self) -> &'static str {
        use OswSubtype as S;
        match self {
            S::Sidewalk => "sidewalk",
            S::Crossing => "crossing",
            S::TrafficIsland => "traffic_island",
            S::Footway => "footway",
            S::Stairs => "stairs",
            S::PedestrianArea => "pedestrian_area",
            S::Pedestrian => "pedestrian",
            S::LivingStreet => "living_street",
            S::GenericZone => "generic_zone",
            S::GenericPolygon => "generic_polygon",
            S::GenericLine => "generic_line",
            S::Kerb => "kerb",
            S::PowerPole => "power_pole",
            S::Tree => "tree",
            S::FireHydrant => "fire_hydrant",
            S::GenericPoint => "generic_point",
        }
    }
}

impl Display for OswSubtype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// the kind of entity a tag set belongs to, which selects the rule table
/// used to classify it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityCategory {
    /// a way; closed when its first and last node references match
    Way { closed: bool },
    /// a node that is a vertex of the walkway network
    Node,
    /// a standalone node
    Point,
}

impl Display for EntityCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityCategory::Way { closed: true } => write!(f, "closed way"),
            EntityCategory::Way { closed: false } => write!(f, "way"),
            EntityCategory::Node => write!(f, "node"),
            EntityCategory::Point => write!(f, "point"),
        }
    }
}
