use thiserror::Error;

use super::worker::WorkerState;

/// Failure to get any response from the network.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Network unreachable: {0}")]
    Unreachable(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Invalid cache namespace: {0}")]
    InvalidNamespace(String),

    #[error("Cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt cache entry: {0}")]
    Corrupt(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum OfflineError {
    #[error("Install of {version} failed at {path}: {reason}")]
    InstallFailed {
        version: String,
        path: String,
        reason: String,
    },

    #[error("Cannot {event} while {state}")]
    InvalidTransition {
        state: WorkerState,
        event: &'static str,
    },

    #[error(transparent)]
    Storage(#[from] StorageError),
}
