//! Core library for heatup.
//!
//! Provides the pieces a discovery client needs to find nearby people and
//! keep working offline:
//!
//! - [`geo`]: positions and great-circle distance
//! - [`proximity`]: radius/category filtering, ranking, near-field alerts
//! - [`source`]: candidate sources (mock generator today)
//! - [`location`]: bounded device location lookup with fallback
//! - [`notify`]: notification dispatch with inline fallback
//! - [`offline`]: versioned asset cache with install/activate/fetch lifecycle
//! - [`config`]: persisted user configuration

pub mod config;
pub mod geo;
pub mod location;
pub mod models;
pub mod notify;
pub mod offline;
pub mod proximity;
pub mod source;
pub mod utils;

pub use config::Config;
pub use geo::{distance_km, GeoError, Position};
pub use models::{CandidateRecord, Category, MatchQuery, RankedCandidate};
pub use proximity::{ProximityEngine, ProximityError};
