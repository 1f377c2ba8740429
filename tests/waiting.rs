//! Deadline behavior: wait_for_value, timed puts, interruption, late acks.
//!
//! All tests run under tokio's paused clock, so deadlines are exact and
//! nothing sleeps on the wall clock.

mod helpers;

use std::sync::Arc;
use std::time::Duration;

use helpers::{configure_tracing, MockVariable};
use pvbind::prelude::*;
use pvbind::sim::SimulatedVariable;
use pvbind::ChannelDescriptor;
use tokio::time::{self, Instant};

#[tokio::test(start_paused = true)]
async fn wait_for_value_times_out_within_margin() {
    configure_tracing();
    let var = Arc::new(MockVariable::new("TEST:MODE", 0));
    let binding = Binding::attach(Arc::clone(&var), BoolCodec);

    let started = Instant::now();
    let result = binding
        .wait_for_value(&true, Some(Duration::from_millis(50)))
        .await;
    let elapsed = started.elapsed();

    assert!(matches!(result, Err(Error::Timeout)));
    assert!(elapsed >= Duration::from_millis(50), "woke before the deadline");
    assert!(elapsed < Duration::from_millis(150), "overslept the deadline");
}

#[tokio::test(start_paused = true)]
async fn wait_for_value_returns_when_target_arrives() {
    let var = Arc::new(MockVariable::new("TEST:MODE", 0));
    let binding = Binding::attach(Arc::clone(&var), BoolCodec);

    let poster = Arc::clone(&var);
    tokio::spawn(async move {
        time::sleep(Duration::from_millis(10)).await;
        poster.post(1);
    });

    binding
        .wait_for_value(&true, Some(Duration::from_secs(5)))
        .await
        .unwrap();
}

#[tokio::test(start_paused = true)]
async fn wait_for_value_succeeds_immediately_on_match() {
    let var = Arc::new(MockVariable::new("TEST:MODE", 1));
    let binding = Binding::attach(Arc::clone(&var), BoolCodec);

    // Already equal: returns without consuming the deadline.
    let started = Instant::now();
    binding.wait_for_value(&true, None).await.unwrap();
    assert_eq!(started.elapsed(), Duration::ZERO);
}

/// The comparison runs in wire representation: raw `2` decodes to `true`,
/// but the encoded target is the canonical `1`, so it never matches.
#[tokio::test(start_paused = true)]
async fn wait_for_value_compares_wire_not_decoded() {
    let var = Arc::new(MockVariable::new("TEST:MODE", 2));
    let binding = Binding::attach(Arc::clone(&var), BoolCodec);

    assert!(binding.value().unwrap(), "2 decodes to true");
    let result = binding
        .wait_for_value(&true, Some(Duration::from_millis(50)))
        .await;
    assert!(matches!(result, Err(Error::Timeout)));
}

#[tokio::test(start_paused = true)]
async fn wait_for_value_interrupted_by_destroy() {
    let var = Arc::new(MockVariable::new("TEST:MODE", 0));
    let binding = Arc::new(Binding::attach(Arc::clone(&var), BoolCodec));

    let waiter = Arc::clone(&binding);
    let wait = tokio::spawn(async move { waiter.wait_for_value(&true, None).await });

    // Let the waiter park on the tick channel before tearing down.
    time::sleep(Duration::from_millis(1)).await;
    binding.destroy();

    let result = wait.await.unwrap();
    assert!(matches!(result, Err(Error::Interrupted)));
}

#[tokio::test(start_paused = true)]
async fn wait_for_value_interrupted_by_source_closure() {
    let var = Arc::new(SimulatedVariable::new("TEST:MODE", 0));
    let binding = Arc::new(Binding::attach(Arc::clone(&var), BoolCodec));

    let waiter = Arc::clone(&binding);
    let wait = tokio::spawn(async move { waiter.wait_for_value(&true, None).await });

    time::sleep(Duration::from_millis(1)).await;
    var.close();

    let result = wait.await.unwrap();
    assert!(matches!(result, Err(Error::Interrupted)));
}

#[tokio::test(start_paused = true)]
async fn put_timeout_fails_when_ack_is_late() {
    let var = Arc::new(MockVariable::new("TEST:SETPOINT", 0));
    let binding = Binding::attach(Arc::clone(&var), BoolCodec);

    var.set_manual_acks(true);
    let result = binding
        .put_timeout(&true, Duration::from_millis(100))
        .await;
    assert!(matches!(result, Err(Error::Timeout)));

    // The write itself reached the handle before the deadline.
    assert_eq!(var.puts(), vec![1]);
    assert_eq!(var.pending_acks(), 1);
}

/// A late acknowledgment resolves a dropped continuation; the binding
/// stays usable and the next write observes its own acknowledgment.
#[tokio::test(start_paused = true)]
async fn late_ack_is_discarded_without_corrupting_later_puts() {
    let var = Arc::new(MockVariable::new("TEST:SETPOINT", 0));
    let binding = Binding::attach(Arc::clone(&var), BoolCodec);

    var.set_manual_acks(true);
    let result = binding
        .put_timeout(&true, Duration::from_millis(100))
        .await;
    assert!(matches!(result, Err(Error::Timeout)));

    // The stale acknowledgment fires into the void.
    assert!(var.release_ack());

    var.set_manual_acks(false);
    binding.put(&false).await.unwrap();
    assert_eq!(var.puts(), vec![1, 0]);
    assert_eq!(var.cached(), 0);
}

#[tokio::test(start_paused = true)]
async fn configured_put_deadline_applies_to_plain_put() {
    let var = Arc::new(MockVariable::new("TEST:SETPOINT", 0));
    let binding = ChannelDescriptor::new("TEST:SETPOINT")
        .put_timeout(Duration::from_millis(50))
        .attach(Arc::clone(&var), BoolCodec);

    var.set_manual_acks(true);
    let result = binding.put(&true).await;
    assert!(matches!(result, Err(Error::Timeout)));
}

#[tokio::test(start_paused = true)]
async fn put_without_deadline_waits_for_the_ack() {
    let var = Arc::new(MockVariable::new("TEST:SETPOINT", 0));
    let binding = Arc::new(Binding::attach(Arc::clone(&var), BoolCodec));

    var.set_manual_acks(true);
    let writer = Arc::clone(&binding);
    let write = tokio::spawn(async move { writer.put(&true).await });

    // Give the write time to register, then acknowledge it.
    time::sleep(Duration::from_millis(1)).await;
    assert_eq!(var.pending_acks(), 1);
    assert!(var.release_ack());

    write.await.unwrap().unwrap();
    assert_eq!(var.puts(), vec![1]);
}
