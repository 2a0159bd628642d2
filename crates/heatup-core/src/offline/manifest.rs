use serde::{Deserialize, Serialize};

use super::request::normalize_path;

/// Cache version used by the default manifest.
pub const DEFAULT_CACHE_VERSION: &str = "heatup-pwa-v1";

/// Static shell assets pre-fetched on install.
pub const DEFAULT_ASSETS: [&str; 5] = ["/", "/index.html", "/styles.css", "/app.js", "/manifest.json"];

/// The fixed set of assets for one deployed version.
///
/// The version string names one manifest snapshot. Changing the asset list
/// means shipping a new version; entries are never migrated between versions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheManifest {
    version: String,
    paths: Vec<String>,
}

impl CacheManifest {
    /// Build a manifest. Paths are rooted at `/` and keep their order;
    /// duplicates are dropped.
    pub fn new<I, S>(version: impl Into<String>, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for path in paths {
            let path = normalize_path(path.into());
            if !unique.contains(&path) {
                unique.push(path);
            }
        }
        Self {
            version: version.into(),
            paths: unique,
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl Default for CacheManifest {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_VERSION, DEFAULT_ASSETS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_manifest() {
        let manifest = CacheManifest::default();
        assert_eq!(manifest.version(), "heatup-pwa-v1");
        assert_eq!(manifest.len(), 5);
        assert_eq!(manifest.paths()[0], "/");
    }

    #[test]
    fn test_duplicates_dropped_in_order() {
        let manifest = CacheManifest::new("v2", ["/a.js", "/b.css", "/a.js", "/c.png"]);
        assert_eq!(manifest.paths(), ["/a.js", "/b.css", "/c.png"]);
    }

    #[test]
    fn test_relative_and_rooted_paths_are_one_entry() {
        let manifest = CacheManifest::new("v2", ["app.js", "/app.js", "/", "index.html"]);
        assert_eq!(manifest.paths(), ["/app.js", "/", "/index.html"]);
        assert_eq!(manifest.len(), 3);
    }
}
