//! Candidate sources.
//!
//! A `CandidateSource` supplies the people around an origin for one discovery
//! scan. The only implementation today is `MockCandidateSource`, which samples
//! random records; a real discovery backend slots in behind the same trait.

pub mod mock;

use async_trait::async_trait;

use crate::geo::Position;
use crate::models::CandidateRecord;

pub use mock::MockCandidateSource;

/// Smallest sampling radius used for a scan, in kilometers.
pub const MIN_SAMPLING_RADIUS_KM: f64 = 5.0;

/// Largest sampling radius used for a scan, in kilometers.
pub const MAX_SAMPLING_RADIUS_KM: f64 = 200.0;

/// Sampling radius used to populate candidates right after the position is known.
pub const INITIAL_SAMPLING_RADIUS_KM: f64 = 50.0;

#[async_trait]
pub trait CandidateSource: Send + Sync {
    /// Candidates around `origin`, sampled within `radius_km`.
    async fn candidates(&self, origin: Position, radius_km: f64) -> anyhow::Result<Vec<CandidateRecord>>;
}

/// Sampling radius for a scan at the given discovery radius.
pub fn sampling_radius_km(discovery_radius_km: f64) -> f64 {
    discovery_radius_km.clamp(MIN_SAMPLING_RADIUS_KM, MAX_SAMPLING_RADIUS_KM)
}
