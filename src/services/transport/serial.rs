use super::{format_serial_line, SerialPortEntry, Transport};
use crate::error::TransportError;
use crate::models::TransportKind;
use async_trait::async_trait;
use chroma_color::Cmykw;
use serialport::{SerialPort, SerialPortType};
use std::io::Write as _;
use std::sync::{Arc, Mutex};
use std::time::Duration;

const SERIAL_TIMEOUT: Duration = Duration::from_secs(1);

impl From<serialport::Error> for TransportError {
    fn from(e: serialport::Error) -> Self {
        TransportError::Serial(e.to_string())
    }
}

type PortHandle = Arc<Mutex<Option<Box<dyn SerialPort>>>>;

/// Line-oriented serial writer.
///
/// The port is opened once when the transport is created and kept open
/// between deliveries. If opening fails the transport stays usable but
/// disconnected: deliveries fail with [`TransportError::NotConnected`]
/// until a successful [`Transport::probe`] reopens it.
pub struct SerialTransport {
    path: String,
    baud_rate: u32,
    port: PortHandle,
}

impl SerialTransport {
    pub fn open(path: impl Into<String>, baud_rate: u32) -> Self {
        let path = path.into();
        let port = match open_port(&path, baud_rate) {
            Ok(port) => {
                tracing::info!(port = %path, baud_rate, "Serial connection established");
                Some(port)
            }
            Err(e) => {
                tracing::warn!(port = %path, baud_rate, error = %e, "Failed to open serial port");
                None
            }
        };

        Self {
            path,
            baud_rate,
            port: Arc::new(Mutex::new(port)),
        }
    }

    fn lock_err() -> TransportError {
        TransportError::Serial("serial port lock poisoned".to_string())
    }
}

fn open_port(path: &str, baud_rate: u32) -> Result<Box<dyn SerialPort>, serialport::Error> {
    tracing::debug!(port = %path, baud_rate, "Opening serial device");
    serialport::new(path, baud_rate)
        .timeout(SERIAL_TIMEOUT)
        .open()
}

#[async_trait]
impl Transport for SerialTransport {
    async fn deliver(&self, color: Cmykw) -> Result<(), TransportError> {
        let port = Arc::clone(&self.port);
        let line = format_serial_line(color);

        tokio::task::spawn_blocking(move || -> Result<(), TransportError> {
            let mut guard = port.lock().map_err(|_| Self::lock_err())?;
            let port = guard.as_mut().ok_or(TransportError::NotConnected)?;
            port.write_all(line.as_bytes())?;
            port.flush()?;
            tracing::trace!(line = %line.trim_end(), "Serial line written");
            Ok(())
        })
        .await
        .map_err(|e| TransportError::Worker(e.to_string()))?
    }

    async fn probe(&self) -> Result<(), TransportError> {
        let port = Arc::clone(&self.port);
        let path = self.path.clone();
        let baud_rate = self.baud_rate;

        tokio::task::spawn_blocking(move || -> Result<(), TransportError> {
            let mut guard = port.lock().map_err(|_| Self::lock_err())?;
            if guard.is_none() {
                *guard = Some(open_port(&path, baud_rate)?);
                tracing::info!(port = %path, baud_rate, "Serial connection re-established");
            }
            Ok(())
        })
        .await
        .map_err(|e| TransportError::Worker(e.to_string()))?
    }

    async fn close(&self) -> Result<(), TransportError> {
        let mut guard = self.port.lock().map_err(|_| Self::lock_err())?;
        if guard.take().is_some() {
            tracing::debug!(port = %self.path, "Serial port closed");
        }
        Ok(())
    }

    fn kind(&self) -> TransportKind {
        TransportKind::Serial
    }

    fn describe(&self) -> String {
        if self.is_connected() {
            format!("Serial - {} @ {} baud", self.path, self.baud_rate)
        } else {
            format!("Serial - {} (not connected)", self.path)
        }
    }

    fn is_connected(&self) -> bool {
        self.port
            .lock()
            .map(|port| port.is_some())
            .unwrap_or(false)
    }
}

pub(super) fn available_ports() -> Result<Vec<SerialPortEntry>, TransportError> {
    let ports = serialport::available_ports()?;

    Ok(ports
        .into_iter()
        .map(|port| {
            let description = match port.port_type {
                SerialPortType::UsbPort(info) => Some(
                    [info.manufacturer, info.product]
                        .into_iter()
                        .flatten()
                        .collect::<Vec<_>>()
                        .join(" "),
                )
                .filter(|text| !text.is_empty())
                .or_else(|| Some(format!("USB {:04x}:{:04x}", info.vid, info.pid))),
                SerialPortType::PciPort => Some("PCI".to_string()),
                SerialPortType::BluetoothPort => Some("Bluetooth".to_string()),
                SerialPortType::Unknown => None,
            };
            SerialPortEntry {
                name: port.port_name,
                description,
            }
        })
        .collect())
}
