//! Proximity matching.
//!
//! The `ProximityEngine` turns a candidate set and a `MatchQuery` into a
//! distance-ranked result list, and picks out the single closest candidate
//! inside the near-field alert threshold. Both operations are synchronous
//! and pure.

pub mod engine;
pub mod error;

pub use engine::{ProximityEngine, NEAR_FIELD_KM};
pub use error::ProximityError;
