use std::fmt;
use std::sync::Arc;

use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::{debug, info, warn};

use super::clients::ClientRegistry;
use super::error::{FetchError, OfflineError, StorageError};
use super::fetcher::Fetcher;
use super::manifest::CacheManifest;
use super::request::{AssetRequest, AssetResponse};
use super::storage::CacheStorage;

/// Maximum concurrent network requests while installing.
const MAX_CONCURRENT_FETCHES: usize = 4;

/// Lifecycle state of an offline worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Parsed,
    Installing,
    Installed,
    Activating,
    Activated,
    /// Install failed; this worker will never control clients.
    Redundant,
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WorkerState::Parsed => "parsed",
            WorkerState::Installing => "installing",
            WorkerState::Installed => "installed",
            WorkerState::Activating => "activating",
            WorkerState::Activated => "activated",
            WorkerState::Redundant => "redundant",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    pub version: String,
    pub cached: usize,
    /// Ready to replace any previously active version without waiting for
    /// its clients to close.
    pub skip_waiting: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationReport {
    pub version: String,
    /// Clients that switched to this version.
    pub claimed: usize,
    /// Namespaces of older versions removed during activation.
    pub pruned: Vec<String>,
}

/// Install / activate / fetch lifecycle for one cache version.
pub struct OfflineWorker {
    manifest: CacheManifest,
    storage: Arc<dyn CacheStorage>,
    fetcher: Arc<dyn Fetcher>,
    clients: ClientRegistry,
    state: WorkerState,
    prune_stale: bool,
    skip_waiting: bool,
}

impl OfflineWorker {
    pub fn new(
        manifest: CacheManifest,
        storage: Arc<dyn CacheStorage>,
        fetcher: Arc<dyn Fetcher>,
        clients: ClientRegistry,
    ) -> Self {
        Self {
            manifest,
            storage,
            fetcher,
            clients,
            state: WorkerState::Parsed,
            prune_stale: false,
            skip_waiting: false,
        }
    }

    /// Delete namespaces of other versions when activating.
    pub fn with_pruning(mut self, prune_stale: bool) -> Self {
        self.prune_stale = prune_stale;
        self
    }

    /// Pick up a version installed and activated in an earlier session.
    ///
    /// If storage already holds every manifest entry for this version the
    /// worker starts out activated and in control; otherwise it starts fresh
    /// and must be installed.
    pub fn restore(
        manifest: CacheManifest,
        storage: Arc<dyn CacheStorage>,
        fetcher: Arc<dyn Fetcher>,
        clients: ClientRegistry,
    ) -> Result<Self, StorageError> {
        let mut worker = Self::new(manifest, storage, fetcher, clients);

        let keys = worker.storage.keys(worker.version())?;
        let complete = !worker.manifest.is_empty()
            && worker
                .manifest
                .paths()
                .iter()
                .all(|p| keys.iter().any(|k| k == AssetRequest::get(p.as_str()).cache_key()));

        if complete {
            worker.state = WorkerState::Activated;
            worker.clients.claim(worker.manifest.version());
            debug!(version = worker.version(), "Restored active cache version");
        }
        Ok(worker)
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    pub fn version(&self) -> &str {
        self.manifest.version()
    }

    pub fn manifest(&self) -> &CacheManifest {
        &self.manifest
    }

    pub fn skip_waiting(&self) -> bool {
        self.skip_waiting
    }

    // ===== Install =====

    /// Fetch and store every manifest entry. All or nothing: if any fetch
    /// fails or returns a non-success status, nothing is kept and the worker
    /// becomes redundant.
    pub async fn install(&mut self) -> Result<InstallReport, OfflineError> {
        self.transition(WorkerState::Parsed, "install")?;
        self.state = WorkerState::Installing;
        info!(version = self.version(), assets = self.manifest.len(), "Installing offline assets");

        match self.populate().await {
            Ok(cached) => {
                self.state = WorkerState::Installed;
                self.skip_waiting = true;
                info!(version = self.version(), cached, "Offline assets installed");
                Ok(InstallReport {
                    version: self.version().to_string(),
                    cached,
                    skip_waiting: self.skip_waiting,
                })
            }
            Err(e) => {
                self.state = WorkerState::Redundant;
                warn!(version = self.version(), error = %e, "Offline install failed");
                Err(e)
            }
        }
    }

    async fn populate(&self) -> Result<usize, OfflineError> {
        let version = self.version();
        let created = self.storage.open(version)?;

        let result = match self.fetch_all().await {
            Ok(responses) => self.store_all(&responses),
            Err(e) => Err(e),
        };

        // Leave no partial population behind. A namespace that existed before
        // this install is left alone.
        if result.is_err() && created {
            if let Err(e) = self.storage.delete_namespace(version) {
                warn!(version, error = %e, "Failed to discard partial install");
            }
        }
        result
    }

    async fn fetch_all(&self) -> Result<Vec<(String, AssetResponse)>, OfflineError> {
        let version = self.version();
        let fetcher = &self.fetcher;

        stream::iter(self.manifest.paths())
            .map(|path| async move {
                let request = AssetRequest::get(path.as_str());
                let failed = |reason: String| OfflineError::InstallFailed {
                    version: version.to_string(),
                    path: path.clone(),
                    reason,
                };

                let response = fetcher.fetch(&request).await.map_err(|e| failed(e.to_string()))?;
                if !response.is_success() {
                    return Err(failed(format!("HTTP status {}", response.status)));
                }
                debug!(%request, bytes = response.body.len(), "Fetched asset for install");
                Ok::<_, OfflineError>((request.cache_key().to_string(), response))
            })
            .buffered(MAX_CONCURRENT_FETCHES)
            .try_collect()
            .await
    }

    fn store_all(&self, responses: &[(String, AssetResponse)]) -> Result<usize, OfflineError> {
        for (key, response) in responses {
            self.storage
                .put(self.version(), key, response)
                .map_err(|e| OfflineError::InstallFailed {
                    version: self.version().to_string(),
                    path: key.clone(),
                    reason: e.to_string(),
                })?;
        }
        Ok(responses.len())
    }

    // ===== Activate =====

    /// Take control of every open client immediately. Only legal once the
    /// install has completed.
    pub async fn activate(&mut self) -> Result<ActivationReport, OfflineError> {
        self.transition(WorkerState::Installed, "activate")?;
        self.state = WorkerState::Activating;

        let pruned = if self.prune_stale {
            match self.prune_stale_versions() {
                Ok(pruned) => pruned,
                Err(e) => {
                    warn!(error = %e, "Failed to prune stale cache versions");
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        let claimed = self.clients.claim(self.version());
        self.state = WorkerState::Activated;
        info!(version = self.version(), claimed, pruned = pruned.len(), "Offline worker activated");

        Ok(ActivationReport {
            version: self.version().to_string(),
            claimed,
            pruned,
        })
    }

    /// Delete every namespace that does not belong to this version.
    pub fn prune_stale_versions(&self) -> Result<Vec<String>, StorageError> {
        let mut pruned = Vec::new();
        for namespace in self.storage.namespaces()? {
            if namespace != self.version() && self.storage.delete_namespace(&namespace)? {
                debug!(namespace = %namespace, "Pruned stale cache version");
                pruned.push(namespace);
            }
        }
        Ok(pruned)
    }

    // ===== Fetch =====

    /// Answer a request cache-first. A miss goes to the network and the
    /// network result is returned as-is, without being cached. Until the
    /// worker is activated every request goes straight to the network.
    pub async fn handle_fetch(&self, request: &AssetRequest) -> Result<AssetResponse, FetchError> {
        if self.state == WorkerState::Activated && request.is_cacheable() {
            match self.storage.get(self.version(), request.cache_key()) {
                Ok(Some(response)) => {
                    debug!(%request, "Cache hit");
                    return Ok(response);
                }
                Ok(None) => debug!(%request, "Cache miss"),
                Err(e) => warn!(%request, error = %e, "Cache lookup failed, using network"),
            }
        }

        self.fetcher.fetch(request).await
    }

    fn transition(&self, expected: WorkerState, event: &'static str) -> Result<(), OfflineError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(OfflineError::InvalidTransition {
                state: self.state,
                event,
            })
        }
    }
}
