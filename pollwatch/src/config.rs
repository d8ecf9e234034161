//! Configuration for the polling watcher.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, WatcherError};

/// Default event channel capacity.
///
/// One is the closest bounded analogue to a rendezvous channel: the poll
/// loop can stage a single undelivered event before it blocks on the
/// consumer.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1;

/// Configuration for a polling watcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatcherConfig {
    /// Delay between two consecutive tree scans. Must be greater than zero.
    pub interval: Duration,

    /// Bound of the event delivery channel. Must be at least one.
    ///
    /// Delivery backpressures: once this many events are undelivered, the
    /// poll loop stalls until the consumer catches up, delaying all further
    /// diff work and the next scan.
    pub channel_capacity: usize,

    /// Whether tree scans follow symbolic links.
    pub follow_symlinks: bool,

    /// Maximum scan depth below the root (None = unlimited).
    pub max_depth: Option<usize>,
}

impl WatcherConfig {
    /// Create a config with the given poll interval and defaults otherwise.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            follow_symlinks: false,
            max_depth: None,
        }
    }

    /// Set the event channel capacity.
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    /// Follow symbolic links during scans.
    pub fn follow_symlinks(mut self) -> Self {
        self.follow_symlinks = true;
        self
    }

    /// Limit scan depth below the root.
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Validate the configuration. Performs no filesystem access.
    pub(crate) fn validate(&self) -> Result<()> {
        if self.interval.is_zero() {
            return Err(WatcherError::InvalidInterval);
        }
        if self.channel_capacity == 0 {
            return Err(WatcherError::InvalidCapacity);
        }
        Ok(())
    }
}
