//! # Simulated Process Variables
//!
//! An in-process [`ProcessVariable`] implementation for demos and tests.
//!
//! A [`SimulatedVariable`] plays the role of a channel on a control-system
//! server: it holds the current value, and every write posts a monitor
//! event carrying the `(old, new)` transition to all subscribers — the
//! same behavior a server-side process variable shows to a connected
//! client. Fault injection ([`disconnect`](SimulatedVariable::disconnect),
//! [`close`](SimulatedVariable::close)) and a configurable acknowledgment
//! latency make transport failures and deadline expiry testable without a
//! network.
//!
//! ```
//! use pvbind::prelude::*;
//! use pvbind::sim::SimulatedVariable;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let var = SimulatedVariable::new("VALVE:STATE", 0);
//! let mut events = var.monitor();
//!
//! var.post(1);
//! let change = events.recv().await.unwrap();
//! assert_eq!((change.old, change.new), (0, 1));
//! # }
//! ```

use std::sync::Mutex;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time;
use tracing::warn;

use crate::error::TransportError;
use crate::handle::{ConnectionState, ProcessVariable, RawChange};

/// Monitor queue depth per subscriber.
const DEFAULT_MONITOR_CAPACITY: usize = 16;

/// An in-process process variable.
///
/// Use behind an `Arc` and attach bindings to it; keep a clone of the
/// `Arc` to drive the "server side" (post values, inject faults).
pub struct SimulatedVariable<E> {
    name: String,
    latency: Option<Duration>,
    monitor_capacity: usize,
    state: Mutex<SimState<E>>,
}

struct SimState<E> {
    value: E,
    connection: ConnectionState,
    monitors: Vec<mpsc::Sender<RawChange<E>>>,
}

impl<E> SimulatedVariable<E>
where
    E: Clone + PartialEq + Send + Sync + 'static,
{
    /// A connected variable holding `initial`.
    pub fn new(name: impl Into<String>, initial: E) -> Self {
        Self {
            name: name.into(),
            latency: None,
            monitor_capacity: DEFAULT_MONITOR_CAPACITY,
            state: Mutex::new(SimState {
                value: initial,
                connection: ConnectionState::Connected,
                monitors: Vec::new(),
            }),
        }
    }

    /// Delay fetch results and write acknowledgments by `latency`.
    ///
    /// A write abandoned by its caller before the latency elapses is
    /// lost; late-landing acknowledgments are modeled by the scripted
    /// mock in the test suite, not here.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Override the per-subscriber monitor queue depth.
    pub fn with_monitor_capacity(mut self, capacity: usize) -> Self {
        self.monitor_capacity = capacity;
        self
    }

    /// Server-side write: replace the value and post the transition to
    /// every monitor subscriber.
    ///
    /// Posting is independent of the simulated connection state; the
    /// server keeps running while this client is disconnected.
    pub fn post(&self, new: E) {
        let (old, senders) = {
            let mut state = self.state.lock().expect("sim state poisoned");
            let old = std::mem::replace(&mut state.value, new.clone());
            (old, state.monitors.clone())
        };

        let mut saw_closed = false;
        for sender in &senders {
            match sender.try_send(RawChange {
                old: old.clone(),
                new: new.clone(),
            }) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    warn!(channel = %self.name, "monitor queue full, dropping event");
                }
                Err(mpsc::error::TrySendError::Closed(_)) => saw_closed = true,
            }
        }
        if saw_closed {
            let mut state = self.state.lock().expect("sim state poisoned");
            state.monitors.retain(|s| !s.is_closed());
        }
    }

    /// Drop the connection: fetch/put fail until [`connect`](Self::connect).
    pub fn disconnect(&self) {
        self.state.lock().expect("sim state poisoned").connection =
            ConnectionState::Disconnected;
    }

    /// Restore the connection.
    pub fn connect(&self) {
        self.state.lock().expect("sim state poisoned").connection = ConnectionState::Connected;
    }

    /// Close the channel permanently. Monitor subscriptions end; attached
    /// bindings observe the closure.
    pub fn close(&self) {
        let mut state = self.state.lock().expect("sim state poisoned");
        state.connection = ConnectionState::Closed;
        state.monitors.clear();
    }

    fn check_connected(&self) -> Result<(), TransportError> {
        let connection = self.state.lock().expect("sim state poisoned").connection;
        if connection.is_connected() {
            Ok(())
        } else {
            Err(TransportError::new(format!(
                "channel {} is {:?}",
                self.name, connection
            )))
        }
    }
}

impl<E> ProcessVariable for SimulatedVariable<E>
where
    E: Clone + PartialEq + Send + Sync + 'static,
{
    type Raw = E;

    fn name(&self) -> &str {
        &self.name
    }

    fn state(&self) -> ConnectionState {
        self.state.lock().expect("sim state poisoned").connection
    }

    fn cached(&self) -> E {
        self.state.lock().expect("sim state poisoned").value.clone()
    }

    /// Returns the stored value; `force` makes no difference locally and
    /// `expected_count` is accepted and ignored (count negotiation is a
    /// transport concern).
    async fn fetch(
        &self,
        _force: bool,
        _expected_count: Option<usize>,
    ) -> Result<E, TransportError> {
        self.check_connected()?;
        if let Some(latency) = self.latency {
            time::sleep(latency).await;
        }
        Ok(self.cached())
    }

    async fn put(&self, value: E) -> Result<(), TransportError> {
        self.check_connected()?;
        if let Some(latency) = self.latency {
            time::sleep(latency).await;
        }
        self.post(value);
        Ok(())
    }

    fn put_no_wait(&self, value: E) -> Result<(), TransportError> {
        self.check_connected()?;
        self.post(value);
        Ok(())
    }

    fn monitor(&self) -> mpsc::Receiver<RawChange<E>> {
        let (tx, rx) = mpsc::channel(self.monitor_capacity);
        self.state
            .lock()
            .expect("sim state poisoned")
            .monitors
            .push(tx);
        rx
    }
}
