//! Modbus TCP register writes against an in-process server.

#![cfg(feature = "modbus")]

mod common;

use chroma::error::TransportError;
use chroma::models::ConnectionSettings;
use chroma::services::transport::{ModbusTransport, CMYKW_START_REGISTER};
use chroma::services::{Capabilities, DeliveryOutcome, DeviceAdapter, Transport};
use chroma_color::{rgb_to_cmykw, Cmykw, Rgb};
use common::{drain_reports, MockModbusServer, RegisterWrite, Reply};
use pretty_assertions::assert_eq;

#[tokio::test]
async fn test_deliver_writes_five_registers_from_zero() {
    let server = MockModbusServer::start(Reply::Ack).await;
    let transport = ModbusTransport::new(server.host(), server.port());

    let gold = rgb_to_cmykw(Rgb::new(212, 175, 55));
    transport.deliver(gold).await.unwrap();

    assert_eq!(
        server.writes(),
        vec![RegisterWrite {
            unit_id: 1,
            function: 0x10,
            address: CMYKW_START_REGISTER,
            values: vec![0, 17, 74, 17, 0],
        }]
    );
}

#[tokio::test]
async fn test_each_delivery_uses_a_fresh_connection() {
    let server = MockModbusServer::start(Reply::Ack).await;
    let transport = ModbusTransport::new(server.host(), server.port());

    transport.deliver(Cmykw::WHITE).await.unwrap();
    transport.deliver(Cmykw::BLACK).await.unwrap();

    assert_eq!(server.connections(), 2);
    let values: Vec<Vec<u16>> = server.writes().into_iter().map(|w| w.values).collect();
    assert_eq!(values, vec![vec![0, 0, 0, 0, 100], vec![0, 0, 0, 100, 0]]);
}

#[tokio::test]
async fn test_exception_response_is_device_rejection() {
    let server = MockModbusServer::start(Reply::Exception(0x02)).await;
    let transport = ModbusTransport::new(server.host(), server.port());

    let err = transport.deliver(Cmykw::WHITE).await.unwrap_err();
    assert!(matches!(err, TransportError::DeviceRejected(_)), "{err}");
    assert_eq!(server.writes().len(), 1);
}

#[tokio::test]
async fn test_probe_connects_without_writing() {
    let server = MockModbusServer::start(Reply::Ack).await;
    let transport = ModbusTransport::new(server.host(), server.port());

    transport.probe().await.unwrap();

    common::wait_until(|| server.connections() == 1).await;
    assert!(server.writes().is_empty());
}

#[tokio::test]
async fn test_adapter_delivers_over_modbus() {
    let server = MockModbusServer::start(Reply::Ack).await;
    let settings = ConnectionSettings {
        connection_type: "modbus".to_string(),
        plc_ip: server.host(),
        plc_port: u32::from(server.port()),
        ..Default::default()
    };

    let mut adapter = DeviceAdapter::configure(&settings, Capabilities::detect()).unwrap();
    let mut reports = adapter.subscribe();
    assert_eq!(
        adapter.status().detail,
        format!("Modbus TCP - {}:{}", server.host(), server.port())
    );

    assert!(adapter.submit(Cmykw::new(10, 20, 30, 40, 0)));
    adapter.close().await;

    let reports = drain_reports(&mut reports);
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].outcome, DeliveryOutcome::Delivered);
    assert_eq!(server.writes()[0].values, vec![10, 20, 30, 40, 0]);
}

#[tokio::test]
async fn test_adapter_survives_rejected_write() {
    let server = MockModbusServer::start(Reply::Exception(0x04)).await;
    let settings = ConnectionSettings {
        connection_type: "network".to_string(),
        plc_ip: server.host(),
        plc_port: u32::from(server.port()),
        ..Default::default()
    };

    let mut adapter = DeviceAdapter::configure(&settings, Capabilities::detect())
        .unwrap()
        .with_min_interval(std::time::Duration::ZERO);
    let mut reports = adapter.subscribe();

    assert!(adapter.submit(Cmykw::WHITE));
    assert!(adapter.submit(Cmykw::BLACK));
    adapter.close().await;

    let reports = drain_reports(&mut reports);
    assert_eq!(reports.len(), 2);
    assert!(reports
        .iter()
        .all(|report| matches!(report.outcome, DeliveryOutcome::Failed(_))));
    assert_eq!(server.writes().len(), 2);
}
