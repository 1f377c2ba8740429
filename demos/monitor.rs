//! Channel Monitor Example
//!
//! This example demonstrates the binding layer against in-process
//! simulated variables: typed reads and writes, change listeners, and
//! waiting for a target value.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example monitor
//! ```
//!
//! # Example Output
//!
//! ```text
//! DOOR:OPEN       false -> true
//! BEAM:CURRENT    0 mA -> 80 mA
//! BEAM:CURRENT    80 mA -> 160 mA
//! BEAM:CURRENT    160 mA -> 200 mA
//! ramp complete, beam current 200 mA
//! door closed, wire value 0
//! ```

use std::sync::Arc;
use std::time::Duration;

use pvbind::prelude::*;
use pvbind::sim::SimulatedVariable;
use pvbind::ChannelDescriptor;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (set to WARN to reduce noise)
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .with_target(false)
        .init();

    // The simulated "server side": two channels a real deployment would
    // resolve through the protocol client.
    let door = Arc::new(SimulatedVariable::new("DOOR:OPEN", 0));
    let current = Arc::new(SimulatedVariable::new("BEAM:CURRENT", 0.0f64));

    // A boolean channel over an integer wire value.
    let door_binding = ChannelDescriptor::new("DOOR:OPEN")
        .attach(Arc::clone(&door), BoolCodec);

    // Raw counts on the wire, milliamps in the application.
    let current_binding = ChannelDescriptor::new("BEAM:CURRENT")
        .put_timeout(Duration::from_millis(500))
        .attach(Arc::clone(&current), LinearCodec::new(20.0, 0.0));

    door_binding.subscribe(|change| {
        println!("{:<15} {} -> {}", "DOOR:OPEN", change.old, change.new);
    })?;
    current_binding.subscribe(|change| {
        println!("{:<15} {} mA -> {} mA", "BEAM:CURRENT", change.old, change.new);
    })?;

    // Drive the server: open the door, ramp the current.
    door.post(1);
    tokio::spawn({
        let current = Arc::clone(&current);
        async move {
            for counts in [4.0, 8.0, 10.0] {
                tokio::time::sleep(Duration::from_millis(100)).await;
                current.post(counts);
            }
        }
    });

    // Block until the ramp reaches 200 mA (wire value 10.0).
    current_binding
        .wait_for_value(&200.0, Some(Duration::from_secs(2)))
        .await?;
    println!(
        "ramp complete, beam current {} mA",
        current_binding.value()?
    );

    // Typed write: encoded through the codec before hitting the wire.
    door_binding.put(&false).await?;
    println!("door closed, wire value {}", door.cached());

    door_binding.destroy();
    current_binding.destroy();
    Ok(())
}
