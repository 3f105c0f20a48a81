use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OsmEntityKind {
    Node,
    Way,
    Relation,
}

impl Display for OsmEntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OsmEntityKind::Node => "node",
            OsmEntityKind::Way => "way",
            OsmEntityKind::Relation => "relation",
        };
        write!(f, "{s}")
    }
}

impl FromStr for OsmEntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "node" => Ok(OsmEntityKind::Node),
            "way" => Ok(OsmEntityKind::Way),
            "relation" => Ok(OsmEntityKind::Relation),
            other => Err(format!("unknown member type '{other}'")),
        }
    }
}
