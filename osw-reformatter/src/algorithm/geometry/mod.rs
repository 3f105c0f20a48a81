mod geometry_hash;
mod geometry_ops;

pub use geometry_hash::{GeometryHash, DEFAULT_PRECISION};
pub use geometry_ops::construct_geometries;
