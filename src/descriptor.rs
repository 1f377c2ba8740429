//! # Channel Descriptors
//!
//! Declarative description of a channel binding, supplied by application
//! setup code.
//!
//! Rather than scanning application structs for channel metadata, the
//! application states its wiring explicitly: a descriptor names the
//! channel, says whether it is monitored and how many elements it
//! carries, and attaching it to a handle and codec yields a configured
//! [`Binding`].
//!
//! ```
//! use pvbind::prelude::*;
//! use pvbind::sim::SimulatedVariable;
//! use pvbind::ChannelDescriptor;
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<()> {
//! let var = Arc::new(SimulatedVariable::new("BEAM:CURRENT", 0.0f64));
//!
//! let binding = ChannelDescriptor::new("BEAM:CURRENT")
//!     .monitored(true)
//!     .attach(Arc::clone(&var), IdentityCodec::<f64>::new());
//!
//! assert_eq!(binding.name(), "BEAM:CURRENT");
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use crate::binding::Binding;
use crate::codec::Codec;
use crate::config::BindingConfig;
use crate::handle::ProcessVariable;

/// Declarative description of one channel binding.
///
/// Carries the channel name plus the binding configuration; attaching it
/// to a handle and codec yields a [`Binding`].
#[derive(Debug, Clone)]
pub struct ChannelDescriptor {
    name: String,
    config: BindingConfig,
}

impl ChannelDescriptor {
    /// Descriptor for the named channel with default configuration
    /// (monitored, no fixed element count).
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            config: BindingConfig::new(),
        }
    }

    /// The channel name this descriptor refers to.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the binding subscribes to the handle and forwards change
    /// events.
    pub fn monitored(mut self, monitored: bool) -> Self {
        self.config.monitored = monitored;
        self
    }

    /// Expected element count for array-typed channels whose length is
    /// not known ahead of time.
    pub fn size(mut self, size: usize) -> Self {
        self.config.size = Some(size);
        self
    }

    /// Default deadline applied to waiting writes.
    pub fn put_timeout(mut self, timeout: Duration) -> Self {
        self.config.put_timeout = Some(timeout);
        self
    }

    /// The configuration this descriptor resolves to.
    pub fn config(&self) -> &BindingConfig {
        &self.config
    }

    /// Attach the described binding to a handle and codec.
    ///
    /// The handle is expected to refer to the channel this descriptor
    /// names; the descriptor does not resolve names itself (discovery
    /// belongs to the protocol client).
    pub fn attach<V, C>(self, variable: Arc<V>, codec: C) -> Binding<V, C>
    where
        V: ProcessVariable,
        C: Codec<Raw = V::Raw>,
    {
        Binding::attach_with(variable, codec, self.config)
    }
}
