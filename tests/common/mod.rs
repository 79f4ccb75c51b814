//! Common test infrastructure for Chroma integration tests.
//!
//! Each test file compiles its own copy of this module, so items may appear
//! unused from the perspective of a single test file even though they're
//! used elsewhere.

#![allow(dead_code)]
#![allow(unused_imports)]

pub mod fake_transport;
pub mod mock_modbus_server;

pub use fake_transport::FakeTransport;
pub use mock_modbus_server::{MockModbusServer, RegisterWrite, Reply};

use chroma::services::DeliveryReport;
use std::time::Duration;
use tokio::sync::broadcast;

/// Collect every report already broadcast.
pub fn drain_reports(reports: &mut broadcast::Receiver<DeliveryReport>) -> Vec<DeliveryReport> {
    let mut collected = Vec::new();
    while let Ok(report) = reports.try_recv() {
        collected.push(report);
    }
    collected
}

/// Poll `condition` until it holds, panicking after about two seconds.
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..200 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not met in time");
}
