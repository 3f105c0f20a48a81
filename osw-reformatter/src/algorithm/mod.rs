pub mod geometry;
pub mod remap;
pub mod reverse;
pub mod simplification;
