//! Versioned key/value storage for cached responses.
//!
//! Each cache version gets its own namespace. Two backends are provided:
//! `MemoryCacheStorage` for tests and ephemeral use, and `DiskCacheStorage`
//! which keeps one directory per namespace with a JSON metadata file and a
//! raw body file per entry.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use super::error::StorageError;
use super::request::AssetResponse;

/// Summary of one stored entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryInfo {
    pub key: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub size: usize,
    pub cached_at: DateTime<Utc>,
}

impl EntryInfo {
    pub fn age_minutes(&self) -> i64 {
        (Utc::now() - self.cached_at).num_minutes()
    }

    pub fn age_display(&self) -> String {
        let minutes = self.age_minutes();
        if minutes < 1 {
            // Also covers clock skew
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            format!("{}h ago", minutes / 60)
        } else {
            format!("{}d ago", minutes / 1440)
        }
    }
}

/// Namespaced response store keyed by request identity.
pub trait CacheStorage: Send + Sync {
    /// Create the namespace if missing. Returns `true` if it was created.
    fn open(&self, namespace: &str) -> Result<bool, StorageError>;

    fn put(&self, namespace: &str, key: &str, response: &AssetResponse) -> Result<(), StorageError>;

    fn get(&self, namespace: &str, key: &str) -> Result<Option<AssetResponse>, StorageError>;

    /// Entries in a namespace, sorted by key. Missing namespaces are empty.
    fn entries(&self, namespace: &str) -> Result<Vec<EntryInfo>, StorageError>;

    fn namespaces(&self) -> Result<Vec<String>, StorageError>;

    /// Remove a namespace and everything in it. Returns `true` if it existed.
    fn delete_namespace(&self, namespace: &str) -> Result<bool, StorageError>;

    fn keys(&self, namespace: &str) -> Result<Vec<String>, StorageError> {
        Ok(self.entries(namespace)?.into_iter().map(|e| e.key).collect())
    }
}

fn validate_namespace(namespace: &str) -> Result<(), StorageError> {
    let valid = !namespace.is_empty()
        && namespace != "."
        && namespace != ".."
        && namespace
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidNamespace(namespace.to_string()))
    }
}

// ============================================================================
// In-memory storage
// ============================================================================

#[derive(Debug, Clone)]
struct MemoryEntry {
    response: AssetResponse,
    cached_at: DateTime<Utc>,
}

type Namespaces = HashMap<String, BTreeMap<String, MemoryEntry>>;

#[derive(Debug, Default)]
pub struct MemoryCacheStorage {
    namespaces: Mutex<Namespaces>,
}

impl MemoryCacheStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Namespaces> {
        match self.namespaces.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl CacheStorage for MemoryCacheStorage {
    fn open(&self, namespace: &str) -> Result<bool, StorageError> {
        validate_namespace(namespace)?;
        let mut namespaces = self.lock();
        if namespaces.contains_key(namespace) {
            return Ok(false);
        }
        namespaces.insert(namespace.to_string(), BTreeMap::new());
        Ok(true)
    }

    fn put(&self, namespace: &str, key: &str, response: &AssetResponse) -> Result<(), StorageError> {
        validate_namespace(namespace)?;
        self.lock().entry(namespace.to_string()).or_default().insert(
            key.to_string(),
            MemoryEntry {
                response: response.clone(),
                cached_at: Utc::now(),
            },
        );
        Ok(())
    }

    fn get(&self, namespace: &str, key: &str) -> Result<Option<AssetResponse>, StorageError> {
        Ok(self
            .lock()
            .get(namespace)
            .and_then(|entries| entries.get(key))
            .map(|entry| entry.response.clone()))
    }

    fn entries(&self, namespace: &str) -> Result<Vec<EntryInfo>, StorageError> {
        let namespaces = self.lock();
        let Some(entries) = namespaces.get(namespace) else {
            return Ok(Vec::new());
        };
        Ok(entries
            .iter()
            .map(|(key, entry)| EntryInfo {
                key: key.clone(),
                status: entry.response.status,
                content_type: entry.response.content_type.clone(),
                size: entry.response.body.len(),
                cached_at: entry.cached_at,
            })
            .collect())
    }

    fn namespaces(&self) -> Result<Vec<String>, StorageError> {
        let mut names: Vec<String> = self.lock().keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    fn delete_namespace(&self, namespace: &str) -> Result<bool, StorageError> {
        Ok(self.lock().remove(namespace).is_some())
    }
}

// ============================================================================
// On-disk storage
// ============================================================================

/// Metadata file written next to each body file.
#[derive(Debug, Serialize, Deserialize)]
struct StoredMeta {
    key: String,
    status: u16,
    content_type: Option<String>,
    cached_at: DateTime<Utc>,
}

pub struct DiskCacheStorage {
    cache_dir: PathBuf,
}

impl DiskCacheStorage {
    pub fn new(cache_dir: PathBuf) -> Result<Self, StorageError> {
        std::fs::create_dir_all(&cache_dir)?;
        Ok(Self { cache_dir })
    }

    fn namespace_dir(&self, namespace: &str) -> Result<PathBuf, StorageError> {
        validate_namespace(namespace)?;
        Ok(self.cache_dir.join(namespace))
    }

    /// File stem for a key: hex SHA-256, fixed length whatever the path.
    /// The key itself lives in the metadata file.
    fn entry_stem(key: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(key.as_bytes());
        hex::encode(hasher.finalize())
    }

    fn meta_path(dir: &std::path::Path, key: &str) -> PathBuf {
        dir.join(format!("{}.json", Self::entry_stem(key)))
    }

    fn body_path(dir: &std::path::Path, key: &str) -> PathBuf {
        dir.join(format!("{}.body", Self::entry_stem(key)))
    }

    fn read_meta(path: &std::path::Path) -> Result<StoredMeta, StorageError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}

impl CacheStorage for DiskCacheStorage {
    fn open(&self, namespace: &str) -> Result<bool, StorageError> {
        let dir = self.namespace_dir(namespace)?;
        if dir.is_dir() {
            return Ok(false);
        }
        std::fs::create_dir_all(&dir)?;
        debug!(namespace, "Created cache namespace");
        Ok(true)
    }

    fn put(&self, namespace: &str, key: &str, response: &AssetResponse) -> Result<(), StorageError> {
        let dir = self.namespace_dir(namespace)?;
        std::fs::create_dir_all(&dir)?;

        // Body first: a metadata file only exists once its body is complete
        std::fs::write(Self::body_path(&dir, key), &response.body)?;
        let meta = StoredMeta {
            key: key.to_string(),
            status: response.status,
            content_type: response.content_type.clone(),
            cached_at: Utc::now(),
        };
        std::fs::write(Self::meta_path(&dir, key), serde_json::to_string_pretty(&meta)?)?;
        Ok(())
    }

    fn get(&self, namespace: &str, key: &str) -> Result<Option<AssetResponse>, StorageError> {
        let dir = self.namespace_dir(namespace)?;
        let meta_path = Self::meta_path(&dir, key);
        if !meta_path.exists() {
            return Ok(None);
        }

        let meta = Self::read_meta(&meta_path)?;
        let body = std::fs::read(Self::body_path(&dir, key))?;
        Ok(Some(AssetResponse {
            status: meta.status,
            content_type: meta.content_type,
            body,
        }))
    }

    fn entries(&self, namespace: &str) -> Result<Vec<EntryInfo>, StorageError> {
        let dir = self.namespace_dir(namespace)?;
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut entries = Vec::new();
        for item in std::fs::read_dir(&dir)? {
            let path = item?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let meta = Self::read_meta(&path)?;
            let size = std::fs::metadata(Self::body_path(&dir, &meta.key))?.len() as usize;
            entries.push(EntryInfo {
                key: meta.key,
                status: meta.status,
                content_type: meta.content_type,
                size,
                cached_at: meta.cached_at,
            });
        }
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(entries)
    }

    fn namespaces(&self) -> Result<Vec<String>, StorageError> {
        let mut names = Vec::new();
        for item in std::fs::read_dir(&self.cache_dir)? {
            let item = item?;
            if item.file_type()?.is_dir() {
                if let Some(name) = item.file_name().to_str() {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    fn delete_namespace(&self, namespace: &str) -> Result<bool, StorageError> {
        let dir = self.namespace_dir(namespace)?;
        if !dir.is_dir() {
            return Ok(false);
        }
        std::fs::remove_dir_all(&dir)?;
        debug!(namespace, "Deleted cache namespace");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn html(body: &str) -> AssetResponse {
        AssetResponse::ok("text/html", body)
    }

    /// Behaviour every backend must share.
    fn exercise(storage: &dyn CacheStorage) {
        assert!(storage.namespaces().unwrap().is_empty());
        assert!(storage.open("heatup-pwa-v1").unwrap());
        assert!(!storage.open("heatup-pwa-v1").unwrap());

        storage.put("heatup-pwa-v1", "/index.html", &html("<h1>v1</h1>")).unwrap();
        storage.put("heatup-pwa-v1", "/", &html("root")).unwrap();
        storage.put("heatup-pwa-v2", "/index.html", &html("<h1>v2</h1>")).unwrap();

        assert_eq!(
            storage.get("heatup-pwa-v1", "/index.html").unwrap(),
            Some(html("<h1>v1</h1>"))
        );
        assert_eq!(
            storage.get("heatup-pwa-v2", "/index.html").unwrap(),
            Some(html("<h1>v2</h1>"))
        );
        assert_eq!(storage.get("heatup-pwa-v1", "/missing.css").unwrap(), None);
        assert_eq!(storage.get("heatup-pwa-v9", "/").unwrap(), None);

        assert_eq!(storage.keys("heatup-pwa-v1").unwrap(), vec!["/", "/index.html"]);
        assert_eq!(storage.namespaces().unwrap(), vec!["heatup-pwa-v1", "heatup-pwa-v2"]);

        let entries = storage.entries("heatup-pwa-v1").unwrap();
        assert_eq!(entries[1].size, "<h1>v1</h1>".len());
        assert_eq!(entries[1].content_type.as_deref(), Some("text/html"));

        assert!(storage.delete_namespace("heatup-pwa-v1").unwrap());
        assert!(!storage.delete_namespace("heatup-pwa-v1").unwrap());
        assert!(storage.keys("heatup-pwa-v1").unwrap().is_empty());
        assert_eq!(storage.namespaces().unwrap(), vec!["heatup-pwa-v2"]);
    }

    #[test]
    fn test_memory_storage() {
        exercise(&MemoryCacheStorage::new());
    }

    #[test]
    fn test_disk_storage() {
        let dir = tempfile::tempdir().unwrap();
        exercise(&DiskCacheStorage::new(dir.path().to_path_buf()).unwrap());
    }

    #[test]
    fn test_disk_storage_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        DiskCacheStorage::new(dir.path().to_path_buf())
            .unwrap()
            .put("v1", "/app.js", &AssetResponse::ok("text/javascript", vec![0u8, 159, 146, 150]))
            .unwrap();

        let reopened = DiskCacheStorage::new(dir.path().to_path_buf()).unwrap();
        let response = reopened.get("v1", "/app.js").unwrap().unwrap();
        assert_eq!(response.body, vec![0u8, 159, 146, 150]);
    }

    #[test]
    fn test_disk_storage_long_keys() {
        let dir = tempfile::tempdir().unwrap();
        let storage = DiskCacheStorage::new(dir.path().to_path_buf()).unwrap();
        let key = format!("/assets/{}.js", "a".repeat(200));
        let other = format!("/assets/{}.js", "b".repeat(200));

        storage.put("heatup-pwa-v1", &key, &html("long")).unwrap();
        storage.put("heatup-pwa-v1", &other, &html("other")).unwrap();

        assert_eq!(storage.get("heatup-pwa-v1", &key).unwrap(), Some(html("long")));
        assert_eq!(storage.keys("heatup-pwa-v1").unwrap(), vec![key, other]);
    }

    #[test]
    fn test_rejects_unsafe_namespaces() {
        let storage = MemoryCacheStorage::new();
        for bad in ["", "..", "../etc", "a/b", "v1 final"] {
            assert!(matches!(storage.open(bad), Err(StorageError::InvalidNamespace(_))));
        }
    }

    #[test]
    fn test_entry_age_display() {
        let mut info = EntryInfo {
            key: "/".to_string(),
            status: 200,
            content_type: None,
            size: 0,
            cached_at: Utc::now(),
        };
        assert_eq!(info.age_display(), "just now");

        info.cached_at = Utc::now() - Duration::minutes(5);
        assert_eq!(info.age_display(), "5m ago");

        info.cached_at = Utc::now() - Duration::minutes(150);
        assert_eq!(info.age_display(), "2h ago");

        info.cached_at = Utc::now() - Duration::days(3);
        assert_eq!(info.age_display(), "3d ago");
    }
}
