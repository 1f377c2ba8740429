//! # pvbind
//!
//! **Typed, observable bindings for control-system process variables.**
//!
//! A control-system client library exposes remote process variables as
//! raw wire values — scalars or fixed-size arrays of primitive types —
//! delivered through caches, fetches, writes, and monitor subscriptions.
//! This crate is the convenience layer on top: it wraps one raw variable
//! handle in a typed, convertible, change-notifying value cell with
//! proper waiting semantics and listener lifecycle.
//!
//! The protocol itself (connection establishment, wire encoding, monitor
//! plumbing) is the job of the external protocol client, consumed here
//! through the narrow [`ProcessVariable`] trait.
//!
//! ## Quick Start
//!
//! ```
//! use pvbind::prelude::*;
//! use pvbind::sim::SimulatedVariable;
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<()> {
//! // The protocol client supplies the handle; the simulation stands in.
//! let var = Arc::new(SimulatedVariable::new("DOOR:OPEN", 0));
//!
//! // Bind it with a codec: wire i32 <-> application bool.
//! let binding = Binding::attach(Arc::clone(&var), BoolCodec);
//!
//! // Typed reads and writes.
//! assert!(!binding.value()?);
//! binding.put(&true).await?;
//!
//! // Typed change notifications.
//! let token = binding.subscribe(|change| {
//!     println!("{} -> {}", change.old, change.new);
//! })?;
//! binding.unsubscribe(token)?;
//!
//! binding.destroy();
//! # Ok(())
//! # }
//! ```
//!
//! ---
//!
//! # Architecture Overview
//!
//! ## Conceptual Model
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                        User Application                          │
//! │     get / put / wait_for_value          subscribe / unsubscribe  │
//! └───────────────┬─────────────────────────────────┬────────────────┘
//!                 ▼                                 ▼
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                      Binding<V, C>                               │
//! │   encode/decode via Codec            ChangeNotifier              │
//! │        │          ▲                       ▲                      │
//! │        │          │     forwarding task   │ decoded (old, new)   │
//! │        │          └───────────────────────┘                      │
//! └────────┼──────────▲──────────────────────────────────────────────┘
//!          │ raw      │ raw (old, new) pairs
//!          ▼          │
//! ┌──────────────────────────────────────────────────────────────────┐
//! │              ProcessVariable (protocol client)                   │
//! │   cached · fetch · put · put_no_wait · monitor · state           │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Responsibilities
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`binding`] | The typed variable binding: get/put/wait, event forwarding, teardown |
//! | [`codec`] | Pure wire ↔ application value conversion |
//! | [`notifier`] | Token-based listener registry with snapshot delivery |
//! | [`handle`] | The `ProcessVariable` trait required from the protocol client |
//! | [`config`] | Per-binding configuration and builder |
//! | [`descriptor`] | Declarative channel descriptors for application wiring |
//! | [`error`] | Error types: [`Error`], [`Result`] |
//! | [`sim`] | In-process simulated variable for demos and tests (`sim` feature) |
//!
//! ## Key Concepts
//!
//! ### One Conversion per Value
//!
//! Every value a binding hands to a caller or listener has passed through
//! its codec exactly once, and every value sent downstream has passed
//! through the reverse codec exactly once. Waiting compares in wire
//! representation precisely so no value is converted twice.
//!
//! ### Listeners Never See Raw Events
//!
//! The binding's forwarding task decodes each raw `(old, new)` transition
//! and republishes it under the `"value"` key through the binding's own
//! [`ChangeNotifier`]. Delivery is synchronous against a snapshot of the
//! subscribers registered at publish time.
//!
//! ### Teardown Is Loud
//!
//! `destroy()` is idempotent, but using a destroyed binding is a
//! programming error: every operation fails with
//! [`Error::AlreadyDestroyed`] rather than silently doing nothing.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `sim` | Yes | In-process simulated process variable |

pub mod binding;
pub mod codec;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod handle;
pub mod notifier;

#[cfg(feature = "sim")]
pub mod sim;

pub use binding::Binding;
pub use codec::{
    BoolArrayCodec, BoolCodec, ByteStringCodec, Codec, IdentityCodec, LinearCodec,
};
pub use config::{BindingConfig, BindingConfigBuilder};
pub use descriptor::ChannelDescriptor;
pub use error::*;
pub use handle::{ConnectionState, ProcessVariable, RawChange};
pub use notifier::{Change, ChangeNotifier, SubscriptionId, VALUE};

pub mod prelude {
    pub use crate::binding::Binding;
    pub use crate::codec::{
        BoolArrayCodec, BoolCodec, ByteStringCodec, Codec, IdentityCodec, LinearCodec,
    };
    pub use crate::config::BindingConfig;
    pub use crate::error::{Error, Result};
    pub use crate::handle::{ConnectionState, ProcessVariable, RawChange};
    pub use crate::notifier::SubscriptionId;
}
