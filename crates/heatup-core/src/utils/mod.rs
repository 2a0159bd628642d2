//! Utility functions for display formatting.

pub mod format;

pub use format::{alert_body, alert_title, format_distance, ping_title, profile_summary};
