use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[cfg(feature = "ts")]
use ts_rs::TS;

use crate::geo::Position;

/// What a candidate is looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(TS))]
#[cfg_attr(feature = "ts", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Casual,
    Events,
    ShortTerm,
    LongTerm,
    Collab,
    Services,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Casual,
        Category::Events,
        Category::ShortTerm,
        Category::LongTerm,
        Category::Collab,
        Category::Services,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Casual => "casual",
            Category::Events => "events",
            Category::ShortTerm => "short_term",
            Category::LongTerm => "long_term",
            Category::Collab => "collab",
            Category::Services => "services",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == lower)
            .ok_or_else(|| format!("Unknown category: {}", s))
    }
}

/// A discoverable person near the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct CandidateRecord {
    pub id: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
    pub age: u8,
    pub position: Position,
    pub category: Category,
    pub note: String,
}

impl CandidateRecord {
    /// First character of the display name, for avatar badges.
    pub fn initial(&self) -> char {
        self.display_name.chars().next().unwrap_or('?')
    }
}

/// A candidate together with its distance from the query origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct RankedCandidate {
    #[serde(flatten)]
    pub candidate: CandidateRecord,
    #[serde(rename = "distanceKm")]
    pub distance_km: f64,
}

impl RankedCandidate {
    pub fn id(&self) -> &str {
        &self.candidate.id
    }

    pub fn category(&self) -> Category {
        self.candidate.category
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_str() {
        assert_eq!("casual".parse::<Category>(), Ok(Category::Casual));
        assert_eq!("SHORT_TERM".parse::<Category>(), Ok(Category::ShortTerm));
        assert_eq!(" long_term ".parse::<Category>(), Ok(Category::LongTerm));
        assert!("romance".parse::<Category>().is_err());
    }

    #[test]
    fn test_category_display_matches_serde() {
        for category in Category::ALL {
            let json = serde_json::to_string(&category).unwrap();
            assert_eq!(json, format!("\"{}\"", category));
        }
    }

    #[test]
    fn test_ranked_candidate_serializes_flat() {
        let ranked = RankedCandidate {
            candidate: CandidateRecord {
                id: "p3".to_string(),
                display_name: "Ioana".to_string(),
                age: 27,
                position: Position::new_unchecked(45.0, 25.0),
                category: Category::Collab,
                note: "Looking to collaborate".to_string(),
            },
            distance_km: 1.25,
        };

        let value = serde_json::to_value(&ranked).unwrap();
        assert_eq!(value["id"], "p3");
        assert_eq!(value["displayName"], "Ioana");
        assert_eq!(value["category"], "collab");
        assert_eq!(value["distanceKm"], 1.25);
        assert_eq!(ranked.candidate.initial(), 'I');
    }
}
