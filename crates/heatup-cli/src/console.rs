//! Terminal implementations of the notification and network collaborators.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use heatup_core::notify::{
    ChannelRegistry, FallbackPresenter, Notification, NotificationChannel, NotifyError,
};
use heatup_core::offline::{AssetRequest, AssetResponse, FetchError, Fetcher};
use tracing::debug;

/// Inline presentation: the message is printed straight to stdout.
#[derive(Debug, Default)]
pub struct ConsolePresenter;

impl FallbackPresenter for ConsolePresenter {
    fn present(&self, title: &str, body: &str) {
        println!("{}\n{}", title, body);
    }
}

/// Background channel that prints notifications, keeping only the latest one
/// per tag.
#[derive(Debug, Default)]
pub struct ConsoleChannel {
    shown: Mutex<HashMap<String, Notification>>,
}

impl ConsoleChannel {
    /// Notifications currently on display.
    #[cfg(test)]
    pub fn visible(&self) -> usize {
        self.shown.lock().map(|s| s.len()).unwrap_or(0)
    }
}

#[async_trait]
impl NotificationChannel for ConsoleChannel {
    async fn show(&self, notification: &Notification) -> Result<(), NotifyError> {
        let mut shown = self
            .shown
            .lock()
            .map_err(|_| NotifyError::Rejected("channel state poisoned".to_string()))?;
        if shown.insert(notification.tag.clone(), notification.clone()).is_some() {
            debug!(tag = %notification.tag, "Replaced notification");
        }
        println!("[{}] {}\n{}", notification.tag, notification.title, notification.body);
        Ok(())
    }
}

/// Registration lookup backed by the offline worker's state: a channel is
/// registered only while a cache version is active.
pub struct ConsoleRegistry {
    channel: Option<Arc<ConsoleChannel>>,
}

impl ConsoleRegistry {
    pub fn new(channel: Option<Arc<ConsoleChannel>>) -> Self {
        Self { channel }
    }
}

#[async_trait]
impl ChannelRegistry for ConsoleRegistry {
    async fn lookup(&self) -> Option<Arc<dyn NotificationChannel>> {
        self.channel
            .clone()
            .map(|c| c as Arc<dyn NotificationChannel>)
    }
}

/// Network that is never reachable, for exercising offline behaviour.
#[derive(Debug, Default)]
pub struct UnreachableNetwork;

#[async_trait]
impl Fetcher for UnreachableNetwork {
    async fn fetch(&self, request: &AssetRequest) -> Result<AssetResponse, FetchError> {
        Err(FetchError::Unreachable(format!("offline: {}", request)))
    }
}
