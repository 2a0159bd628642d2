//! Notification dispatch.
//!
//! Alerts go through a background notification channel when the device
//! supports notifications, permission is granted and a channel is registered.
//! In every other case the message is presented inline by a
//! `FallbackPresenter`. Dispatch never fails from the caller's point of view;
//! the difference shows up only in the returned `DispatchOutcome`.

pub mod dispatcher;
pub mod types;

pub use dispatcher::{NotificationDispatcher, DEFAULT_LOOKUP_TIMEOUT};
pub use types::{
    Capability, ChannelRegistry, DispatchOutcome, DispatchState, FallbackPresenter, Notification,
    NotificationChannel, NotifyError, Permission, DEFAULT_ICON, PROXIMITY_TAG,
};
