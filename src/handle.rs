//! # Process Variable Abstraction
//!
//! This module defines the narrow interface the binding layer requires
//! from the external protocol client, allowing bindings to work with both
//! a real network client (production) and an in-process simulation
//! (testing, demos).
//!
//! The protocol client owns connection establishment, wire encoding, and
//! monitor subscriptions. A [`ProcessVariable`] is its per-channel
//! primitive: a named remote value with a local cache, asynchronous
//! fetch/write, and a monitor subscription delivering `(old, new)` pairs.
//!
//! ## Monitor Subscriptions
//!
//! [`ProcessVariable::monitor`] returns an [`mpsc::Receiver`] of
//! [`RawChange`] events. The protocol client delivers events from its own
//! network tasks; dropping the receiver unsubscribes. Each call creates an
//! independent subscription.
//!
//! ## Write Acknowledgment
//!
//! [`ProcessVariable::put`] resolves when the server acknowledges the
//! write. It carries no deadline of its own — callers that need one layer
//! it on top (as [`Binding::put_timeout`](crate::Binding::put_timeout)
//! does), so a slow acknowledgment suspends only the task that asked
//! for it.

use std::future::Future;

use tokio::sync::mpsc;

use crate::error::TransportError;

/// Connection state of a remote process variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No connection to the server holding the variable.
    Disconnected,
    /// Connection establishment in progress.
    Connecting,
    /// Connected; cached value is maintained by the client.
    Connected,
    /// Channel was closed and will not reconnect.
    Closed,
}

impl ConnectionState {
    /// Whether the variable is currently usable for fetch/write.
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }
}

/// A raw value transition delivered by a monitor subscription.
#[derive(Debug, Clone, PartialEq)]
pub struct RawChange<E> {
    /// The value before the transition.
    pub old: E,
    /// The value after the transition.
    pub new: E,
}

/// The per-channel primitive of the external protocol client.
///
/// Implemented by the production network client and by
/// [`SimulatedVariable`](crate::sim::SimulatedVariable). Consumers are
/// generic over this trait, never over a concrete client.
pub trait ProcessVariable: Send + Sync + 'static {
    /// The wire representation of this variable's value.
    type Raw: Clone + PartialEq + Send + Sync + 'static;

    /// The channel name of this variable.
    fn name(&self) -> &str;

    /// Current connection state.
    fn state(&self) -> ConnectionState;

    /// The client-maintained cached value. Never performs I/O.
    fn cached(&self) -> Self::Raw;

    /// Fetch the value.
    ///
    /// With `force = false` the client decides between its cache and a
    /// network read per its own semantics; with `force = true` it must
    /// perform a fresh network read. `expected_count` passes an explicit
    /// element count for array-typed variables whose length is not known
    /// ahead of time.
    fn fetch(
        &self,
        force: bool,
        expected_count: Option<usize>,
    ) -> impl Future<Output = Result<Self::Raw, TransportError>> + Send;

    /// Write a value and resolve once the server acknowledges it.
    fn put(&self, value: Self::Raw) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Write a value without waiting for acknowledgment.
    fn put_no_wait(&self, value: Self::Raw) -> Result<(), TransportError>;

    /// Subscribe to value transitions.
    ///
    /// Events arrive asynchronously from the client's network tasks.
    /// Dropping the receiver unsubscribes.
    fn monitor(&self) -> mpsc::Receiver<RawChange<Self::Raw>>;
}
