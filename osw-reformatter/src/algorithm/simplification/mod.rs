mod simplify_ops;
mod way_merge;

pub use simplify_ops::{simplify_graph, SimplificationSummary};
pub use way_merge::merge_ways;
