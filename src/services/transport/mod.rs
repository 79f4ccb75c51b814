//! Device transports
//!
//! A transport knows how to put one CMYKW instruction on the wire. The
//! [`DeviceAdapter`](crate::services::DeviceAdapter) owns exactly one and
//! never talks to the network or the serial line itself.

#[cfg(feature = "modbus")]
mod modbus;
#[cfg(feature = "serial")]
mod serial;

#[cfg(feature = "modbus")]
pub use modbus::{ModbusTransport, CMYKW_START_REGISTER};
#[cfg(feature = "serial")]
pub use serial::SerialTransport;

use crate::error::TransportError;
use crate::models::TransportKind;
use async_trait::async_trait;
use chroma_color::Cmykw;

/// One way of delivering a CMYKW tuple to the controller
#[async_trait]
pub trait Transport: Send + Sync {
    /// Write a single instruction.
    async fn deliver(&self, color: Cmykw) -> Result<(), TransportError>;

    /// Check that the controller is reachable without sending a color.
    async fn probe(&self) -> Result<(), TransportError>;

    /// Release any held connection.
    async fn close(&self) -> Result<(), TransportError> {
        Ok(())
    }

    fn kind(&self) -> TransportKind;

    /// Human-readable target, e.g. `Modbus TCP - 192.168.0.10:502`
    fn describe(&self) -> String;

    /// Whether a persistent connection is currently held.
    ///
    /// Transports that connect per delivery always report `true`.
    fn is_connected(&self) -> bool {
        true
    }
}

/// Transport support compiled into this build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub network: bool,
    pub serial: bool,
}

impl Capabilities {
    /// Detect available transports once at start-up.
    pub fn detect() -> Self {
        let caps = Self {
            network: cfg!(feature = "modbus"),
            serial: cfg!(feature = "serial"),
        };
        tracing::debug!(network = caps.network, serial = caps.serial, "Transport capabilities");
        caps
    }

    pub fn none() -> Self {
        Self {
            network: false,
            serial: false,
        }
    }

    pub fn supports(&self, kind: TransportKind) -> bool {
        match kind {
            TransportKind::None => true,
            TransportKind::Network => self.network,
            TransportKind::Serial => self.serial,
        }
    }
}

/// Serial command line: `C:000 M:017 Y:074 K:017 W:000\n`.
///
/// Channels are `u8`, so the three-digit field cannot overflow.
pub fn format_serial_line(color: Cmykw) -> String {
    format!(
        "C:{:03} M:{:03} Y:{:03} K:{:03} W:{:03}\n",
        color.c, color.m, color.y, color.k, color.w
    )
}

/// A serial device found on this machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialPortEntry {
    pub name: String,
    pub description: Option<String>,
}

/// List serial devices available for the serial transport.
#[cfg(feature = "serial")]
pub fn list_serial_ports() -> Result<Vec<SerialPortEntry>, TransportError> {
    serial::available_ports()
}

/// List serial devices available for the serial transport.
#[cfg(not(feature = "serial"))]
pub fn list_serial_ports() -> Result<Vec<SerialPortEntry>, TransportError> {
    Ok(Vec::new())
}
