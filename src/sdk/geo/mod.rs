pub mod coordinate;
pub mod feature;

pub use coordinate::Coordinate;
pub use feature::{Feature, FeatureCollection, Geometry, Position, Ring};
