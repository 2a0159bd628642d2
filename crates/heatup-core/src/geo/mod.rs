//! Geographic primitives.
//!
//! `Position` is the validated coordinate value type used across the crate;
//! `distance_km` computes the haversine great-circle distance between two
//! positions on a spherical earth.

pub mod distance;
pub mod position;

pub use distance::{distance_km, EARTH_RADIUS_KM};
pub use position::{GeoError, Position};
