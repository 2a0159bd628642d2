//! Device location lookup.
//!
//! The platform lookup is asynchronous and may fail or never answer. Callers
//! go through [`resolve_position`], which bounds the wait and substitutes a
//! fallback position so discovery is never blocked.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

use crate::geo::Position;

/// Position used when the device location cannot be determined.
pub const DEFAULT_FALLBACK_POSITION: Position = Position::new_unchecked(45.1555, 23.3489);

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LocationError {
    #[error("Location permission denied")]
    Denied,

    #[error("Location unavailable: {0}")]
    Unavailable(String),

    #[error("Location lookup timed out after {0:?}")]
    Timeout(Duration),
}

#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn current_position(&self) -> Result<Position, LocationError>;
}

/// How a position was obtained.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResolvedPosition {
    Device(Position),
    Fallback(Position),
}

impl ResolvedPosition {
    pub fn position(&self) -> Position {
        match self {
            ResolvedPosition::Device(p) | ResolvedPosition::Fallback(p) => *p,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, ResolvedPosition::Fallback(_))
    }
}

/// Ask the provider for the device position, waiting at most `timeout`.
/// Any failure resolves to `fallback`.
pub async fn resolve_position(
    provider: &dyn LocationProvider,
    timeout: Duration,
    fallback: Position,
) -> ResolvedPosition {
    let result = match tokio::time::timeout(timeout, provider.current_position()).await {
        Ok(result) => result,
        Err(_) => Err(LocationError::Timeout(timeout)),
    };

    match result {
        Ok(position) => {
            debug!(%position, "Device position resolved");
            ResolvedPosition::Device(position)
        }
        Err(e) => {
            warn!(error = %e, fallback = %fallback, "Location lookup failed, using fallback position");
            ResolvedPosition::Fallback(fallback)
        }
    }
}

/// Provider with no location capability at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLocation;

#[async_trait]
impl LocationProvider for NoLocation {
    async fn current_position(&self) -> Result<Position, LocationError> {
        Err(LocationError::Unavailable("no location capability".to_string()))
    }
}

/// Provider that always reports the same position.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation(pub Position);

#[async_trait]
impl LocationProvider for FixedLocation {
    async fn current_position(&self) -> Result<Position, LocationError> {
        Ok(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct DeniedLocation;

    #[async_trait]
    impl LocationProvider for DeniedLocation {
        async fn current_position(&self) -> Result<Position, LocationError> {
            Err(LocationError::Denied)
        }
    }

    struct HangingLocation;

    #[async_trait]
    impl LocationProvider for HangingLocation {
        async fn current_position(&self) -> Result<Position, LocationError> {
            std::future::pending().await
        }
    }

    const TIMEOUT: Duration = Duration::from_millis(50);

    #[tokio::test]
    async fn test_device_position_used_when_available() {
        let here = Position::new_unchecked(44.43, 26.10);
        let resolved = resolve_position(&FixedLocation(here), TIMEOUT, DEFAULT_FALLBACK_POSITION).await;
        assert_eq!(resolved, ResolvedPosition::Device(here));
        assert!(!resolved.is_fallback());
    }

    #[tokio::test]
    async fn test_denied_uses_fallback() {
        let resolved = resolve_position(&DeniedLocation, TIMEOUT, DEFAULT_FALLBACK_POSITION).await;
        assert_eq!(resolved.position(), DEFAULT_FALLBACK_POSITION);
        assert!(resolved.is_fallback());
    }

    #[tokio::test]
    async fn test_no_capability_uses_fallback() {
        let resolved = resolve_position(&NoLocation, TIMEOUT, DEFAULT_FALLBACK_POSITION).await;
        assert!(resolved.is_fallback());
    }

    #[tokio::test]
    async fn test_hanging_lookup_times_out_to_fallback() {
        let resolved = resolve_position(&HangingLocation, TIMEOUT, DEFAULT_FALLBACK_POSITION).await;
        assert_eq!(resolved, ResolvedPosition::Fallback(DEFAULT_FALLBACK_POSITION));
    }
}
