use serde::{Deserialize, Serialize};

use super::Category;
use crate::geo::Position;
use crate::proximity::ProximityError;

/// One discovery request: who is looking for `category` within `radius_km`
/// of `origin`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchQuery {
    pub origin: Position,
    #[serde(rename = "radiusKm")]
    pub radius_km: f64,
    pub category: Category,
}

impl MatchQuery {
    /// Build a query, rejecting a radius that is not strictly positive.
    pub fn new(origin: Position, radius_km: f64, category: Category) -> Result<Self, ProximityError> {
        let query = Self {
            origin,
            radius_km,
            category,
        };
        query.validate()?;
        Ok(query)
    }

    /// Check the query invariants. Fields are public, so the engine
    /// re-validates every query it receives.
    pub fn validate(&self) -> Result<(), ProximityError> {
        // NaN fails this comparison too
        if self.radius_km > 0.0 {
            Ok(())
        } else {
            Err(ProximityError::InvalidQuery(format!(
                "radius must be positive, got {} km",
                self.radius_km
            )))
        }
    }
}
