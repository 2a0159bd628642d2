use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// De-duplication tag for proximity alerts. A later alert with the same tag
/// replaces the earlier one instead of stacking.
pub const PROXIMITY_TAG: &str = "heatup-prox";

/// Icon shown with delivered notifications.
pub const DEFAULT_ICON: &str = "icons/icon-192.png";

/// Notification permission as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    Granted,
    Denied,
    /// Not yet asked.
    Default,
}

/// Whether the device can show notifications at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Unsupported,
    Supported(Permission),
}

/// Resolved delivery state for one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    Unsupported,
    Unauthorized,
    AuthorizedWithChannel,
    AuthorizedNoChannel,
}

impl fmt::Display for DispatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchState::Unsupported => write!(f, "unsupported"),
            DispatchState::Unauthorized => write!(f, "unauthorized"),
            DispatchState::AuthorizedWithChannel => write!(f, "authorized with channel"),
            DispatchState::AuthorizedNoChannel => write!(f, "authorized without channel"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Shown through the background channel.
    Delivered,
    /// Presented inline instead.
    FallbackShown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub icon: Option<String>,
    pub tag: String,
}

impl Notification {
    pub fn proximity(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            icon: Some(DEFAULT_ICON.to_string()),
            tag: PROXIMITY_TAG.to_string(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum NotifyError {
    #[error("Notification channel rejected message: {0}")]
    Rejected(String),
}

/// A background delivery channel, e.g. an active worker registration.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    async fn show(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// Looks up the currently registered background channel, if any.
#[async_trait]
pub trait ChannelRegistry: Send + Sync {
    async fn lookup(&self) -> Option<Arc<dyn NotificationChannel>>;
}

/// Inline, alert-style presentation.
pub trait FallbackPresenter: Send + Sync {
    fn present(&self, title: &str, body: &str);
}
