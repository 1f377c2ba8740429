//! # Typed Variable Bindings
//!
//! A [`Binding`] wraps one [`ProcessVariable`] handle in a typed,
//! convertible, change-notifying value cell. It is the user-facing API of
//! this crate: everything the application does with a remote variable
//! goes through a binding.
//!
//! ## Role in the Architecture
//!
//! ```text
//!  protocol client ──(raw (old, new) pairs)──▶ forwarding task
//!                                                  │ decode via Codec
//!                                                  ▼
//!                                            ChangeNotifier ──▶ listeners
//!
//!  caller ──▶ Binding::get/put ──(encode/decode via Codec)──▶ handle
//! ```
//!
//! The binding registers itself as an observer of the handle at
//! construction (a monitor subscription drained by a spawned forwarding
//! task) and unregisters on [`destroy`](Binding::destroy). Every value a
//! binding emits to listeners or returns to callers has passed through
//! the codec exactly once; every value it sends downstream has passed
//! through the reverse codec exactly once.
//!
//! ## Lifecycle
//!
//! `destroy()` is idempotent. It stops the forwarding task, closes the
//! notifier (removing all listeners) and marks the binding dead; any
//! subsequent get/put/wait/subscribe fails with
//! [`Error::AlreadyDestroyed`]. Dropping the binding destroys it.
//!
//! ## Example
//!
//! ```
//! use pvbind::prelude::*;
//! use pvbind::sim::SimulatedVariable;
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<()> {
//! let var = Arc::new(SimulatedVariable::new("DOOR:OPEN", 0));
//! let binding = Binding::attach(Arc::clone(&var), BoolCodec);
//!
//! assert!(!binding.value()?);
//!
//! binding.put(&true).await?;
//! assert_eq!(var.cached(), 1);
//!
//! binding.destroy();
//! assert!(matches!(binding.value(), Err(Error::AlreadyDestroyed)));
//! # Ok(())
//! # }
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time;
use tracing::{debug, error, warn};

use crate::codec::Codec;
use crate::config::BindingConfig;
use crate::error::{Error, Result};
use crate::handle::{ConnectionState, ProcessVariable, RawChange};
use crate::notifier::{self, Change, ChangeNotifier, SubscriptionId};

// ============================================================================
// BINDING
// ============================================================================

/// Typed, observable binding to one remote process variable.
///
/// Generic over the handle type `V` (and hence the wire type `V::Raw`)
/// and a codec `C` converting between `V::Raw` and the application type
/// `C::Value`.
///
/// Operations take `&self`; share a binding across tasks behind an `Arc`.
pub struct Binding<V, C>
where
    V: ProcessVariable,
    C: Codec<Raw = V::Raw>,
{
    inner: Arc<BindingInner<V, C>>,
}

struct BindingInner<V, C>
where
    V: ProcessVariable,
    C: Codec<Raw = V::Raw>,
{
    variable: Arc<V>,
    codec: C,
    config: BindingConfig,
    notifier: ChangeNotifier<C::Value>,
    destroyed: AtomicBool,
    /// Set by the forwarding task when the monitor channel closes.
    source_closed: AtomicBool,
    /// Bumped on every raw update; wakes `wait_for_value` callers.
    tick: watch::Sender<u64>,
    forward_task: Mutex<Option<JoinHandle<()>>>,
}

impl<V, C> Binding<V, C>
where
    V: ProcessVariable,
    C: Codec<Raw = V::Raw>,
{
    /// Attach a binding to an already-constructed handle with the default
    /// configuration.
    ///
    /// Must be called within a tokio runtime: a monitored binding spawns
    /// its forwarding task here.
    pub fn attach(variable: Arc<V>, codec: C) -> Self {
        Self::attach_with(variable, codec, BindingConfig::new())
    }

    /// Attach a binding with an explicit configuration.
    pub fn attach_with(variable: Arc<V>, codec: C, config: BindingConfig) -> Self {
        let (tick, _) = watch::channel(0);
        let monitored = config.monitored;
        let inner = Arc::new(BindingInner {
            variable,
            codec,
            config,
            notifier: ChangeNotifier::new(),
            destroyed: AtomicBool::new(false),
            source_closed: AtomicBool::new(false),
            tick,
            forward_task: Mutex::new(None),
        });

        if monitored {
            let events = inner.variable.monitor();
            let task = tokio::spawn(forward_events(Arc::clone(&inner), events));
            *inner.forward_task.lock().expect("task slot poisoned") = Some(task);
            debug!(channel = inner.variable.name(), "binding attached (monitored)");
        } else {
            debug!(channel = inner.variable.name(), "binding attached (polling)");
        }

        Self { inner }
    }

    /// The channel name of the bound variable.
    pub fn name(&self) -> &str {
        self.inner.variable.name()
    }

    /// Connection state of the bound variable.
    pub fn connection_state(&self) -> ConnectionState {
        self.inner.variable.state()
    }

    /// The bound handle.
    pub fn variable(&self) -> &Arc<V> {
        &self.inner.variable
    }

    fn ensure_live(&self) -> Result<()> {
        if self.inner.destroyed.load(Ordering::SeqCst) {
            Err(Error::AlreadyDestroyed)
        } else {
            Ok(())
        }
    }

    // ------------------------------------------------------------------
    // Get
    // ------------------------------------------------------------------

    /// Decode the handle's current cached value. Never performs I/O.
    pub fn value(&self) -> Result<C::Value> {
        self.ensure_live()?;
        Ok(self.inner.codec.decode(&self.inner.variable.cached())?)
    }

    /// Get the value, letting the handle decide between its cache and a
    /// network read. A configured element count
    /// ([`BindingConfig::size`]) is passed through.
    pub async fn get(&self) -> Result<C::Value> {
        self.ensure_live()?;
        let raw = self.inner.variable.fetch(false, self.inner.config.size).await?;
        Ok(self.inner.codec.decode(&raw)?)
    }

    /// Get the value through a fresh network read, suspending until the
    /// read completes or fails.
    pub async fn get_forced(&self) -> Result<C::Value> {
        self.ensure_live()?;
        let raw = self.inner.variable.fetch(true, None).await?;
        Ok(self.inner.codec.decode(&raw)?)
    }

    /// Get the value passing an explicit expected element count, for
    /// array-typed variables whose length is not known ahead of time.
    pub async fn get_sized(&self, expected_count: usize) -> Result<C::Value> {
        self.ensure_live()?;
        let raw = self.inner.variable.fetch(false, Some(expected_count)).await?;
        Ok(self.inner.codec.decode(&raw)?)
    }

    // ------------------------------------------------------------------
    // Put
    // ------------------------------------------------------------------

    /// Encode and write a value, waiting for the server's acknowledgment.
    ///
    /// Waits indefinitely unless the binding was configured with a
    /// default deadline ([`BindingConfig::put_timeout`]).
    pub async fn put(&self, value: &C::Value) -> Result<()> {
        match self.inner.config.put_timeout {
            Some(timeout) => self.put_timeout(value, timeout).await,
            None => {
                self.ensure_live()?;
                let raw = self.inner.codec.encode(value)?;
                self.inner.variable.put(raw).await?;
                Ok(())
            }
        }
    }

    /// Encode and write a value, failing with [`Error::Timeout`] when the
    /// acknowledgment does not arrive within `timeout`.
    ///
    /// On timeout the write future is dropped; an acknowledgment arriving
    /// later resolves a dead continuation and cannot corrupt a subsequent
    /// operation.
    pub async fn put_timeout(&self, value: &C::Value, timeout: Duration) -> Result<()> {
        self.ensure_live()?;
        let raw = self.inner.codec.encode(value)?;
        match time::timeout(timeout, self.inner.variable.put(raw)).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(Error::Timeout),
        }
    }

    /// Encode and write a value without waiting for acknowledgment.
    pub fn put_no_wait(&self, value: &C::Value) -> Result<()> {
        self.ensure_live()?;
        let raw = self.inner.codec.encode(value)?;
        self.inner.variable.put_no_wait(raw)?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Wait
    // ------------------------------------------------------------------

    /// Suspend until the variable's current value equals `value`, or the
    /// timeout elapses (`None` waits indefinitely).
    ///
    /// The target is encoded once and compared against raw updates in
    /// wire representation, so conversion drift cannot affect the match.
    /// For floating-point wire types equality is the wire type's own
    /// `PartialEq`; NaN never matches.
    ///
    /// Fails with [`Error::Timeout`] on deadline expiry and
    /// [`Error::Interrupted`] when the binding is destroyed or its event
    /// source closes mid-wait.
    pub async fn wait_for_value(&self, value: &C::Value, timeout: Option<Duration>) -> Result<()> {
        self.ensure_live()?;
        let target = self.inner.codec.encode(value)?;
        let deadline = timeout.map(|t| time::Instant::now() + t);
        // Subscribe before the first check so an update landing between
        // the check and the wait still wakes us.
        let mut tick = self.inner.tick.subscribe();

        loop {
            if self.inner.variable.cached() == target {
                return Ok(());
            }
            if self.inner.destroyed.load(Ordering::SeqCst)
                || self.inner.source_closed.load(Ordering::SeqCst)
            {
                return Err(Error::Interrupted);
            }

            let changed = match deadline {
                Some(deadline) => match time::timeout_at(deadline, tick.changed()).await {
                    Ok(changed) => changed,
                    Err(_) => return Err(Error::Timeout),
                },
                None => tick.changed().await,
            };
            if changed.is_err() {
                return Err(Error::Interrupted);
            }
            // Re-check on every wake; the tick counter may coalesce
            // several raw updates into one wakeup.
        }
    }

    // ------------------------------------------------------------------
    // Listeners
    // ------------------------------------------------------------------

    /// Register a change listener. It receives decoded `(old, new)` pairs
    /// under the [`notifier::VALUE`] key; raw events never reach
    /// listeners.
    pub fn subscribe<F>(&self, listener: F) -> Result<SubscriptionId>
    where
        F: Fn(&Change<'_, C::Value>) + Send + Sync + 'static,
    {
        self.ensure_live()?;
        Ok(self.inner.notifier.subscribe(listener))
    }

    /// Remove a previously registered listener.
    pub fn unsubscribe(&self, id: SubscriptionId) -> Result<bool> {
        self.ensure_live()?;
        Ok(self.inner.notifier.unsubscribe(id))
    }

    // ------------------------------------------------------------------
    // Teardown
    // ------------------------------------------------------------------

    /// Destroy the binding: unregister from the handle and remove all
    /// listeners. Idempotent; the second call is a no-op.
    ///
    /// Safe to call concurrently with an in-flight delivery: the
    /// forwarding task's abort lands at its next await point, so a
    /// delivery already dispatched runs to completion and no new one
    /// starts.
    pub fn destroy(&self) {
        if self.inner.destroyed.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Some(task) = self
            .inner
            .forward_task
            .lock()
            .expect("task slot poisoned")
            .take()
        {
            task.abort();
        }
        self.inner.notifier.close();
        // Wake waiters so they observe the teardown.
        self.inner.tick.send_modify(|gen| *gen = gen.wrapping_add(1));
        debug!(channel = self.inner.variable.name(), "binding destroyed");
    }

    /// Whether `destroy()` has been called.
    pub fn is_destroyed(&self) -> bool {
        self.inner.destroyed.load(Ordering::SeqCst)
    }
}

impl<V, C> Drop for Binding<V, C>
where
    V: ProcessVariable,
    C: Codec<Raw = V::Raw>,
{
    fn drop(&mut self) {
        self.destroy();
    }
}

// ============================================================================
// EVENT FORWARDING
// ============================================================================

/// Drain the monitor subscription, decode both sides of each transition
/// independently, and republish through the notifier.
///
/// Decode is stateless, so decoding old and new separately is safe even
/// when decode is not injective. A transition that fails to decode is
/// reported and dropped; there is no caller on this path to surface the
/// error to.
async fn forward_events<V, C>(
    inner: Arc<BindingInner<V, C>>,
    mut events: mpsc::Receiver<RawChange<V::Raw>>,
) where
    V: ProcessVariable,
    C: Codec<Raw = V::Raw>,
{
    while let Some(RawChange { old, new }) = events.recv().await {
        // Wake waiters first; they compare in wire representation and do
        // not depend on the decode below.
        inner.tick.send_modify(|gen| *gen = gen.wrapping_add(1));

        match (inner.codec.decode(&old), inner.codec.decode(&new)) {
            (Ok(old), Ok(new)) => {
                let failed = inner.notifier.publish(notifier::VALUE, &old, &new);
                if !failed.is_empty() {
                    warn!(
                        channel = inner.variable.name(),
                        failed = failed.len(),
                        "listener panicked during value delivery"
                    );
                }
            }
            (Err(e), _) | (_, Err(e)) => {
                error!(
                    channel = inner.variable.name(),
                    error = %e,
                    "dropping undecodable monitor event"
                );
            }
        }
    }

    // Monitor channel closed under us; wake waiters so they fail with
    // Interrupted instead of sleeping to their deadline.
    inner.source_closed.store(true, Ordering::SeqCst);
    inner.tick.send_modify(|gen| *gen = gen.wrapping_add(1));
}
