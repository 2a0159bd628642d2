//! Data models for discovery.
//!
//! - `CandidateRecord`, `Category`: people produced by a candidate source
//! - `RankedCandidate`: a candidate with its distance from a query origin
//! - `MatchQuery`: one validated discovery request

pub mod candidate;
pub mod query;

pub use candidate::{CandidateRecord, Category, RankedCandidate};
pub use query::MatchQuery;
