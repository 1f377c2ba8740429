//! # Binding Configuration
//!
//! This module provides configuration for [`Binding`](crate::Binding)
//! construction.
//!
//! ## Quick Start
//!
//! For most channels, the defaults work out of the box:
//!
//! ```
//! use pvbind::BindingConfig;
//!
//! let config = BindingConfig::default();
//! assert!(config.monitored);
//! ```
//!
//! ## Builder Pattern
//!
//! For custom configurations, use the builder:
//!
//! ```
//! use pvbind::BindingConfig;
//! use std::time::Duration;
//!
//! let config = BindingConfig::builder()
//!     .monitored(false)                              // polling-only channel
//!     .size(128)                                     // array element count
//!     .put_timeout(Duration::from_millis(500))       // default write deadline
//!     .build();
//! ```
//!
//! ## Configuration Options Reference
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `monitored` | `true` | Subscribe to the handle and forward change events |
//! | `size` | None | Expected element count passed on plain gets |
//! | `put_timeout` | None | Default deadline applied by `put` (None = wait for ack indefinitely) |
//!
//! ## Monitored vs Polling Channels
//!
//! A monitored binding subscribes to the handle at construction and keeps
//! a forwarding task alive until `destroy()`; listeners and
//! `wait_for_value` work as documented. An unmonitored binding spawns
//! nothing: gets and puts work, listeners never fire, and
//! `wait_for_value` can only succeed on its initial check. Use it for
//! channels that are written or polled but never observed.

use std::time::Duration;

/// Configuration for one binding.
#[derive(Debug, Clone)]
pub struct BindingConfig {
    /// Subscribe to the handle and forward change events.
    pub monitored: bool,
    /// Expected element count passed on plain gets, for array-typed
    /// variables whose length is not known ahead of time.
    pub size: Option<usize>,
    /// Default deadline applied by `put`. `None` waits for the
    /// acknowledgment indefinitely.
    pub put_timeout: Option<Duration>,
}

impl BindingConfig {
    /// Configuration with defaults (monitored, no size, no deadline).
    pub fn new() -> Self {
        Self {
            monitored: true,
            size: None,
            put_timeout: None,
        }
    }

    /// Start building a custom configuration.
    pub fn builder() -> BindingConfigBuilder {
        BindingConfigBuilder {
            config: Self::new(),
        }
    }
}

impl Default for BindingConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for [`BindingConfig`].
#[derive(Debug)]
pub struct BindingConfigBuilder {
    config: BindingConfig,
}

impl BindingConfigBuilder {
    /// Whether the binding subscribes to the handle and forwards change
    /// events.
    pub fn monitored(mut self, monitored: bool) -> Self {
        self.config.monitored = monitored;
        self
    }

    /// Expected element count passed on plain gets.
    pub fn size(mut self, size: usize) -> Self {
        self.config.size = Some(size);
        self
    }

    /// Default deadline applied by `put`.
    pub fn put_timeout(mut self, timeout: Duration) -> Self {
        self.config.put_timeout = Some(timeout);
        self
    }

    pub fn build(self) -> BindingConfig {
        self.config
    }
}
