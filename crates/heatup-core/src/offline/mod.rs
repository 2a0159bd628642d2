//! Offline asset cache.
//!
//! `OfflineWorker` runs the install / activate / fetch lifecycle over a
//! versioned `CacheStorage`:
//!
//! - Install fetches every path in the `CacheManifest` and stores them under
//!   the manifest's version, or stores nothing if any fetch fails
//! - Activate claims every open client so their requests are intercepted
//!   right away, optionally pruning namespaces left by older versions
//! - Fetch answers from the cache when it can and falls through to the
//!   network otherwise, without writing the network result back
//!
//! Storage persists across sessions, one namespace per version string.

pub mod clients;
pub mod error;
pub mod fetcher;
pub mod manifest;
pub mod request;
pub mod storage;
pub mod worker;

pub use clients::{ClientId, ClientRegistry};
pub use error::{FetchError, OfflineError, StorageError};
pub use fetcher::{Fetcher, HttpFetcher};
pub use manifest::CacheManifest;
pub use request::{AssetRequest, AssetResponse, Method};
pub use storage::{CacheStorage, DiskCacheStorage, EntryInfo, MemoryCacheStorage};
pub use worker::{ActivationReport, InstallReport, OfflineWorker, WorkerState};
