use std::f64::consts::PI;
use std::sync::Mutex;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::debug;

use super::CandidateSource;
use crate::geo::Position;
use crate::models::{CandidateRecord, Category};

/// Records generated per scan unless configured otherwise.
pub const DEFAULT_CANDIDATE_COUNT: usize = 20;

/// Approximate kilometers per degree, applied on both axes.
const KM_PER_DEGREE: f64 = 111.0;

const MIN_AGE: u8 = 20;
const MAX_AGE_EXCLUSIVE: u8 = 40;

const NAMES: [&str; 10] = [
    "Alex", "Maria", "Ioana", "Andrei", "Sergiu", "Laura", "Mihai", "Elena", "Cristi", "Roxana",
];

const NOTES: [&str; 6] = [
    "Out tonight",
    "Looking to collaborate",
    "Available for gigs",
    "Travel buddy",
    "Quick meetup",
    "Local helper",
];

/// Generates uniformly sampled fake candidates around an origin.
pub struct MockCandidateSource {
    count: usize,
    rng: Mutex<StdRng>,
}

impl MockCandidateSource {
    pub fn new(count: usize) -> Self {
        Self {
            count,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Deterministic source for reproducible scans.
    pub fn with_seed(count: usize, seed: u64) -> Self {
        Self {
            count,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Generate `count` records within roughly `max_km` of `origin`.
    pub fn generate(&self, origin: Position, max_km: f64) -> Vec<CandidateRecord> {
        let mut rng = match self.rng.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        (0..self.count)
            .map(|i| {
                let (d_lat, d_lon) = random_offset(&mut *rng, max_km);
                CandidateRecord {
                    id: format!("p{}", i),
                    display_name: pick(&mut *rng, &NAMES).to_string(),
                    age: rng.gen_range(MIN_AGE..MAX_AGE_EXCLUSIVE),
                    position: wrap(origin.offset(d_lat, d_lon)),
                    category: *pick(&mut *rng, &Category::ALL),
                    note: pick(&mut *rng, &NOTES).to_string(),
                }
            })
            .collect()
    }
}

impl Default for MockCandidateSource {
    fn default() -> Self {
        Self::new(DEFAULT_CANDIDATE_COUNT)
    }
}

#[async_trait]
impl CandidateSource for MockCandidateSource {
    async fn candidates(&self, origin: Position, radius_km: f64) -> anyhow::Result<Vec<CandidateRecord>> {
        let records = self.generate(origin, radius_km);
        debug!(count = records.len(), %origin, radius_km, "Generated mock candidates");
        Ok(records)
    }
}

/// Random (lat, lon) offset in degrees: uniform distance in `[0, max_km)`,
/// uniform bearing.
fn random_offset<R: Rng>(rng: &mut R, max_km: f64) -> (f64, f64) {
    let r = rng.gen::<f64>() * max_km;
    let angle = rng.gen::<f64>() * 2.0 * PI;
    (r * angle.cos() / KM_PER_DEGREE, r * angle.sin() / KM_PER_DEGREE)
}

fn pick<'a, T, R: Rng>(rng: &mut R, items: &'a [T]) -> &'a T {
    // Pools are non-empty constants
    items.choose(rng).unwrap_or(&items[0])
}

/// Keep generated positions inside the valid coordinate ranges.
fn wrap(p: Position) -> Position {
    let latitude = p.latitude.clamp(-90.0, 90.0);
    let mut longitude = p.longitude;
    if longitude > 180.0 {
        longitude -= 360.0;
    } else if longitude < -180.0 {
        longitude += 360.0;
    }
    Position::new_unchecked(latitude, longitude)
}
