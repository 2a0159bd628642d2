//! Application configuration management.
//!
//! Holds discovery defaults, lookup timeouts and the offline asset manifest.
//! Configuration is stored at `~/.config/heatup/config.json`; missing fields
//! take their defaults.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::geo::Position;
use crate::location::DEFAULT_FALLBACK_POSITION;
use crate::models::Category;
use crate::offline::manifest::{DEFAULT_ASSETS, DEFAULT_CACHE_VERSION};
use crate::offline::CacheManifest;
use crate::source::mock::DEFAULT_CANDIDATE_COUNT;

/// Application name used for config/cache directory paths
const APP_NAME: &str = "heatup";

/// Config file name
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub default_radius_km: f64,
    pub min_radius_km: f64,
    pub max_radius_km: f64,
    pub default_category: Category,
    pub fallback_position: Position,
    pub location_timeout_secs: u64,
    pub notification_lookup_timeout_ms: u64,
    pub candidates_per_scan: usize,
    pub asset_base_url: String,
    pub cache_version: String,
    pub cache_assets: Vec<String>,
    /// Remove cache namespaces of older versions on activation.
    pub prune_stale_caches: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_radius_km: 10.0,
            min_radius_km: 1.0,
            max_radius_km: 200.0,
            default_category: Category::Casual,
            fallback_position: DEFAULT_FALLBACK_POSITION,
            location_timeout_secs: 10,
            notification_lookup_timeout_ms: 2000,
            candidates_per_scan: DEFAULT_CANDIDATE_COUNT,
            asset_base_url: "http://localhost:8080/".to_string(),
            cache_version: DEFAULT_CACHE_VERSION.to_string(),
            cache_assets: DEFAULT_ASSETS.iter().map(|s| s.to_string()).collect(),
            prune_stale_caches: false,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            Self::from_json(&contents)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn from_json(contents: &str) -> Result<Self> {
        serde_json::from_str(contents).context("Failed to parse config")
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    /// Bound a user-selected radius to the configured range.
    pub fn clamp_radius(&self, radius_km: f64) -> f64 {
        if radius_km.is_nan() {
            return self.default_radius_km;
        }
        // Must not panic if a hand-edited config has min > max
        radius_km.max(self.min_radius_km).min(self.max_radius_km)
    }

    pub fn manifest(&self) -> CacheManifest {
        CacheManifest::new(self.cache_version.clone(), self.cache_assets.iter().cloned())
    }

    pub fn location_timeout(&self) -> Duration {
        Duration::from_secs(self.location_timeout_secs)
    }

    pub fn notification_lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.notification_lookup_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.default_category, Category::Casual);
        assert_eq!(config.manifest(), CacheManifest::default());
        assert_eq!(config.notification_lookup_timeout(), Duration::from_secs(2));
        assert!(!config.prune_stale_caches);
    }

    #[test]
    fn test_json_round_trip() {
        let mut config = Config::default();
        config.default_category = Category::Services;
        config.cache_version = "heatup-pwa-v2".to_string();
        config.prune_stale_caches = true;

        let parsed = Config::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = Config::from_json(r#"{"default_category": "events", "max_radius_km": 50.0}"#).unwrap();
        assert_eq!(config.default_category, Category::Events);
        assert_eq!(config.max_radius_km, 50.0);
        assert_eq!(config.min_radius_km, 1.0);
        assert_eq!(config.cache_version, "heatup-pwa-v1");
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(Config::from_json("{ not json").is_err());
    }

    #[test]
    fn test_clamp_radius() {
        let config = Config::default();
        assert_eq!(config.clamp_radius(0.2), 1.0);
        assert_eq!(config.clamp_radius(35.0), 35.0);
        assert_eq!(config.clamp_radius(1000.0), 200.0);
        assert_eq!(config.clamp_radius(f64::NAN), 10.0);
    }
}
