//! Staleness filter for live events
//!
//! Events replayed from history bypass this filter.

use std::time::Duration;

use chrono::{DateTime, Utc};
use poll_core::RawEvent;

use super::context::BotSettings;

/// Drops live events stamped too far in the past
#[derive(Debug, Clone, Copy)]
pub struct StalenessFilter {
    enabled: bool,
    threshold: Duration,
}

impl StalenessFilter {
    pub fn new(enabled: bool, threshold: Duration) -> Self {
        Self { enabled, threshold }
    }

    pub fn from_settings(settings: &BotSettings) -> Self {
        Self::new(settings.filter_stale_events, settings.stale_event_threshold)
    }

    /// Check whether `event` is older than the threshold relative to `now`
    ///
    /// Events with an unreadable timestamp are never stale.
    pub fn is_stale_at(&self, event: &RawEvent, now: DateTime<Utc>) -> bool {
        if !self.enabled {
            return false;
        }
        let Some(sent_at) = event.sent_at() else {
            return false;
        };
        match (now - sent_at).to_std() {
            Ok(age) => age > self.threshold,
            // Sent "in the future" (clock skew)
            Err(_) => false,
        }
    }

    pub fn is_stale(&self, event: &RawEvent) -> bool {
        self.is_stale_at(event, Utc::now())
    }
}
