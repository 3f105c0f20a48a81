use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// identifier of a node entity. negative values are temporary ids handed out
/// while a graph is being assembled and never survive a sequential remap.
#[derive(
    Debug, Default, Clone, Copy, Eq, PartialEq, PartialOrd, Ord, Deserialize, Serialize, Hash,
)]
pub struct OsmNodeId(pub i64);

impl OsmNodeId {
    pub fn is_temporary(&self) -> bool {
        self.0 < 0
    }
}

impl Display for OsmNodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
