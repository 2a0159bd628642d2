use tracing::debug;

use super::ProximityError;
use crate::geo::distance_km;
use crate::models::{CandidateRecord, MatchQuery, RankedCandidate};

/// Fixed near-field alert radius in kilometers.
pub const NEAR_FIELD_KM: f64 = 0.5;

/// Stateless ranking over candidate sets.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProximityEngine;

impl ProximityEngine {
    pub fn new() -> Self {
        Self
    }

    /// Alert threshold for a query: the smaller of the fixed near-field
    /// radius and the query's discovery radius.
    pub fn near_field_threshold(query: &MatchQuery) -> f64 {
        NEAR_FIELD_KM.min(query.radius_km)
    }

    /// Candidates in the query category within the query radius, closest
    /// first. Equal distances keep their input order.
    pub fn rank(
        &self,
        candidates: &[CandidateRecord],
        query: &MatchQuery,
    ) -> Result<Vec<RankedCandidate>, ProximityError> {
        query.validate()?;

        let mut ranked = Self::within(candidates, query, query.radius_km);
        // sort_by is stable, which is what keeps tie order reproducible
        ranked.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));

        debug!(
            total = candidates.len(),
            matched = ranked.len(),
            category = %query.category,
            radius_km = query.radius_km,
            "Ranked candidates"
        );
        Ok(ranked)
    }

    /// The closest candidate in the query category inside the near-field
    /// threshold, if any. On equal distance the earliest input wins.
    pub fn nearest_alert(
        &self,
        candidates: &[CandidateRecord],
        query: &MatchQuery,
    ) -> Result<Option<RankedCandidate>, ProximityError> {
        query.validate()?;

        let threshold = Self::near_field_threshold(query);
        let nearest = Self::within(candidates, query, threshold)
            .into_iter()
            .reduce(|best, next| {
                if next.distance_km < best.distance_km {
                    next
                } else {
                    best
                }
            });

        if let Some(ref hit) = nearest {
            debug!(id = hit.id(), distance_km = hit.distance_km, threshold, "Near-field match");
        }
        Ok(nearest)
    }

    /// Category match and `distance <= limit_km`, in input order.
    fn within(candidates: &[CandidateRecord], query: &MatchQuery, limit_km: f64) -> Vec<RankedCandidate> {
        candidates
            .iter()
            .filter(|c| c.category == query.category)
            .filter_map(|c| {
                let distance = distance_km(query.origin, c.position);
                (distance <= limit_km).then(|| RankedCandidate {
                    candidate: c.clone(),
                    distance_km: distance,
                })
            })
            .collect()
    }
}
