use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use super::types::{
    Capability, ChannelRegistry, DispatchOutcome, DispatchState, FallbackPresenter, Notification,
    NotificationChannel, Permission,
};

/// Upper bound on waiting for the channel registration lookup.
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(2);

pub struct NotificationDispatcher {
    capability: Capability,
    registry: Arc<dyn ChannelRegistry>,
    fallback: Arc<dyn FallbackPresenter>,
    lookup_timeout: Duration,
}

impl NotificationDispatcher {
    pub fn new(
        capability: Capability,
        registry: Arc<dyn ChannelRegistry>,
        fallback: Arc<dyn FallbackPresenter>,
    ) -> Self {
        Self {
            capability,
            registry,
            fallback,
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
        }
    }

    pub fn with_lookup_timeout(mut self, timeout: Duration) -> Self {
        self.lookup_timeout = timeout;
        self
    }

    /// Update the capability, e.g. after the user answers a permission prompt.
    pub fn set_capability(&mut self, capability: Capability) {
        self.capability = capability;
    }

    pub fn capability(&self) -> Capability {
        self.capability
    }

    /// Show a proximity alert. Resolves within the lookup timeout even when
    /// the registration lookup never answers.
    pub async fn dispatch(&self, title: &str, body: &str) -> DispatchOutcome {
        let (state, channel) = self.resolve().await;
        debug!(%state, title, "Dispatching notification");

        let Some(channel) = channel else {
            return self.present_inline(title, body);
        };

        let notification = Notification::proximity(title, body);
        match channel.show(&notification).await {
            Ok(()) => DispatchOutcome::Delivered,
            Err(e) => {
                // No retry on the channel; present inline once
                warn!(error = %e, tag = %notification.tag, "Background delivery failed");
                self.present_inline(title, body)
            }
        }
    }

    /// Work out which delivery state applies right now.
    pub async fn state(&self) -> DispatchState {
        self.resolve().await.0
    }

    async fn resolve(&self) -> (DispatchState, Option<Arc<dyn NotificationChannel>>) {
        match self.capability {
            Capability::Unsupported => (DispatchState::Unsupported, None),
            Capability::Supported(Permission::Granted) => match self.lookup_channel().await {
                Some(channel) => (DispatchState::AuthorizedWithChannel, Some(channel)),
                None => (DispatchState::AuthorizedNoChannel, None),
            },
            Capability::Supported(_) => (DispatchState::Unauthorized, None),
        }
    }

    async fn lookup_channel(&self) -> Option<Arc<dyn NotificationChannel>> {
        match tokio::time::timeout(self.lookup_timeout, self.registry.lookup()).await {
            Ok(channel) => channel,
            Err(_) => {
                warn!(timeout = ?self.lookup_timeout, "Channel registration lookup timed out");
                None
            }
        }
    }

    fn present_inline(&self, title: &str, body: &str) -> DispatchOutcome {
        self.fallback.present(title, body);
        DispatchOutcome::FallbackShown
    }
}
