mod reverse_ops;

pub use reverse_ops::{ReverseMapper, ReverseSummary};
