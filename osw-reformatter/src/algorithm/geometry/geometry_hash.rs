use geo::Coord;
use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
};

/// decimal places used when no precision is configured. OSM stores
/// coordinates at 1e-7 degrees.
pub const DEFAULT_PRECISION: u32 = 7;
const MAX_PRECISION: u32 = 12;

/// a lookup key for coordinates that agree after rounding. two equal hashes
/// mean "same place at this precision" and nothing more.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GeometryHash(u64);

impl GeometryHash {
    pub fn from_coord(coord: &Coord<f64>, precision: u32) -> GeometryHash {
        let mut hasher = DefaultHasher::new();
        rounded(coord, precision).hash(&mut hasher);
        GeometryHash(hasher.finish())
    }

    /// hash of an ordered coordinate sequence. reversing the sequence
    /// produces a different hash.
    pub fn from_coords<'a, I>(coords: I, precision: u32) -> GeometryHash
    where
        I: IntoIterator<Item = &'a Coord<f64>>,
    {
        let mut hasher = DefaultHasher::new();
        for coord in coords {
            rounded(coord, precision).hash(&mut hasher);
        }
        GeometryHash(hasher.finish())
    }
}

fn rounded(coord: &Coord<f64>, precision: u32) -> (i64, i64) {
    let scale = 10f64.powi(precision.min(MAX_PRECISION) as i32);
    ((coord.x * scale).round() as i64, (coord.y * scale).round() as i64)
}

#[cfg(test)]
mod tests {
    use super::{GeometryHash, DEFAULT_PRECISION};
    use geo::coord;

    #[test]
    fn test_rounding() {
        let a = coord! { x: -122.31234561, y: 47.60000001 };
        let b = coord! { x: -122.31234559, y: 47.59999999 };
        let c = coord! { x: -122.3123457, y: 47.6 };
        assert_eq!(
            GeometryHash::from_coord(&a, DEFAULT_PRECISION),
            GeometryHash::from_coord(&b, DEFAULT_PRECISION)
        );
        assert_ne!(
            GeometryHash::from_coord(&a, DEFAULT_PRECISION),
            GeometryHash::from_coord(&c, DEFAULT_PRECISION)
        );
        assert_eq!(
            GeometryHash::from_coord(&a, 5),
            GeometryHash::from_coord(&c, 5)
        );
    }

    #[test]
    fn test_sequence_order() {
        let a = coord! { x: 0.0, y: 0.0 };
        let b = coord! { x: 1.0, y: 1.0 };
        let forward = GeometryHash::from_coords([&a, &b], DEFAULT_PRECISION);
        let backward = GeometryHash::from_coords([&b, &a], DEFAULT_PRECISION);
        assert_ne!(forward, backward);
        assert_eq!(forward, GeometryHash::from_coords(&[a, b], DEFAULT_PRECISION));
    }
}
