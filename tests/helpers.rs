//! Shared test helpers: tracing setup and a scripted process variable.
//!
//! Included via `mod helpers;` from each test binary; not every binary
//! uses every helper.
#![allow(dead_code)]

use std::sync::Mutex;

use tokio::sync::{mpsc, oneshot};

use pvbind::{ConnectionState, ProcessVariable, RawChange, TransportError};

pub fn configure_tracing() {
    use std::sync::OnceLock;
    static TRACING_INIT: OnceLock<()> = OnceLock::new();
    TRACING_INIT.get_or_init(|| {
        tracing::subscriber::set_global_default(
            tracing_subscriber::fmt()
                .with_env_filter(
                    tracing_subscriber::EnvFilter::builder()
                        .with_default_directive(tracing::level_filters::LevelFilter::INFO.into())
                        .from_env_lossy(),
                )
                .with_test_writer()
                .finish(),
        )
        .expect("Configure tracing");
    });
}

/// Scripted [`ProcessVariable`] over an `i32` wire value.
///
/// Records every fetch and put so tests can assert exactly what the
/// binding delegated, and supports manual write acknowledgments for
/// deadline tests.
pub struct MockVariable {
    name: String,
    state: Mutex<MockState>,
}

struct MockState {
    value: i32,
    connection: ConnectionState,
    monitors: Vec<mpsc::Sender<RawChange<i32>>>,
    fetches: Vec<(bool, Option<usize>)>,
    puts: Vec<i32>,
    manual_acks: bool,
    pending_acks: Vec<oneshot::Sender<()>>,
    fail_transport: bool,
}

impl MockVariable {
    pub fn new(name: impl Into<String>, initial: i32) -> Self {
        Self {
            name: name.into(),
            state: Mutex::new(MockState {
                value: initial,
                connection: ConnectionState::Connected,
                monitors: Vec::new(),
                fetches: Vec::new(),
                puts: Vec::new(),
                manual_acks: false,
                pending_acks: Vec::new(),
                fail_transport: false,
            }),
        }
    }

    /// Replace the cached value and deliver the transition to monitors.
    pub fn post(&self, new: i32) {
        let (old, senders) = {
            let mut state = self.state.lock().unwrap();
            let old = std::mem::replace(&mut state.value, new);
            (old, state.monitors.clone())
        };
        for sender in senders {
            let _ = sender.try_send(RawChange { old, new });
        }
    }

    /// Write acknowledgments wait until [`release_ack`](Self::release_ack).
    pub fn set_manual_acks(&self, manual: bool) {
        self.state.lock().unwrap().manual_acks = manual;
    }

    /// Acknowledge the oldest pending write. Returns whether one existed.
    pub fn release_ack(&self) -> bool {
        let sender = {
            let mut state = self.state.lock().unwrap();
            if state.pending_acks.is_empty() {
                None
            } else {
                Some(state.pending_acks.remove(0))
            }
        };
        match sender {
            Some(tx) => {
                // A send error means the waiter gave up; the late
                // acknowledgment is simply discarded.
                let _ = tx.send(());
                true
            }
            None => false,
        }
    }

    pub fn pending_acks(&self) -> usize {
        self.state.lock().unwrap().pending_acks.len()
    }

    pub fn set_fail_transport(&self, fail: bool) {
        self.state.lock().unwrap().fail_transport = fail;
    }

    pub fn set_connection(&self, connection: ConnectionState) {
        self.state.lock().unwrap().connection = connection;
    }

    /// Every `(force, expected_count)` pair the binding passed to fetch.
    pub fn fetches(&self) -> Vec<(bool, Option<usize>)> {
        self.state.lock().unwrap().fetches.clone()
    }

    /// Every raw value the binding wrote, in order.
    pub fn puts(&self) -> Vec<i32> {
        self.state.lock().unwrap().puts.clone()
    }
}

impl ProcessVariable for MockVariable {
    type Raw = i32;

    fn name(&self) -> &str {
        &self.name
    }

    fn state(&self) -> ConnectionState {
        self.state.lock().unwrap().connection
    }

    fn cached(&self) -> i32 {
        self.state.lock().unwrap().value
    }

    async fn fetch(
        &self,
        force: bool,
        expected_count: Option<usize>,
    ) -> Result<i32, TransportError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_transport {
            return Err(TransportError::new("injected fetch failure"));
        }
        state.fetches.push((force, expected_count));
        Ok(state.value)
    }

    async fn put(&self, value: i32) -> Result<(), TransportError> {
        let ack = {
            let mut state = self.state.lock().unwrap();
            if state.fail_transport {
                return Err(TransportError::new("injected write failure"));
            }
            state.puts.push(value);
            state.value = value;
            if state.manual_acks {
                let (tx, rx) = oneshot::channel();
                state.pending_acks.push(tx);
                Some(rx)
            } else {
                None
            }
        };
        if let Some(rx) = ack {
            rx.await
                .map_err(|_| TransportError::new("ack channel dropped"))?;
        }
        Ok(())
    }

    fn put_no_wait(&self, value: i32) -> Result<(), TransportError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_transport {
            return Err(TransportError::new("injected write failure"));
        }
        state.puts.push(value);
        state.value = value;
        Ok(())
    }

    fn monitor(&self) -> mpsc::Receiver<RawChange<i32>> {
        let (tx, rx) = mpsc::channel(16);
        self.state.lock().unwrap().monitors.push(tx);
        rx
    }
}
