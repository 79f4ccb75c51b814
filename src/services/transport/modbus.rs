use super::Transport;
use crate::error::TransportError;
use crate::models::TransportKind;
use async_trait::async_trait;
use chroma_color::Cmykw;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tokio_modbus::client::{tcp, Context};
use tokio_modbus::prelude::*;

/// First holding register of the C, M, Y, K, W block
pub const CMYKW_START_REGISTER: u16 = 0;

const UNIT_ID: u8 = 1;
const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

/// Modbus TCP register writer.
///
/// Holds no connection: every delivery connects, writes the five registers
/// in one request and disconnects again.
pub struct ModbusTransport {
    host: String,
    port: u16,
}

impl ModbusTransport {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    fn target(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    async fn resolve(&self) -> io::Result<SocketAddr> {
        tokio::net::lookup_host((self.host.as_str(), self.port))
            .await?
            .next()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "host has no address"))
    }

    async fn connect(&self) -> Result<Context, TransportError> {
        let attempt = async {
            let addr = self.resolve().await?;
            tcp::connect_slave(addr, Slave(UNIT_ID)).await
        };

        let result = match tokio::time::timeout(CONNECT_TIMEOUT, attempt).await {
            Ok(result) => result,
            Err(_) => Err(io::Error::new(io::ErrorKind::TimedOut, "connect timed out")),
        };

        result.map_err(|source| TransportError::Connect {
            target: self.target(),
            source,
        })
    }

    async fn disconnect(&self, mut ctx: Context) {
        if let Err(e) = ctx.disconnect().await {
            tracing::debug!(target = %self.target(), error = %e, "Modbus disconnect failed");
        }
    }
}

#[async_trait]
impl Transport for ModbusTransport {
    async fn deliver(&self, color: Cmykw) -> Result<(), TransportError> {
        let mut ctx = self.connect().await?;

        let registers = color.channels().map(u16::from);
        let result = ctx
            .write_multiple_registers(CMYKW_START_REGISTER, &registers)
            .await;
        self.disconnect(ctx).await;

        match result {
            Ok(Ok(())) => Ok(()),
            Ok(Err(exception)) => Err(TransportError::DeviceRejected(format!("{exception:?}"))),
            Err(e) => Err(TransportError::Protocol(e.to_string())),
        }
    }

    async fn probe(&self) -> Result<(), TransportError> {
        let ctx = self.connect().await?;
        self.disconnect(ctx).await;
        tracing::info!(target = %self.target(), "Modbus connection OK");
        Ok(())
    }

    fn kind(&self) -> TransportKind {
        TransportKind::Network
    }

    fn describe(&self) -> String {
        format!("Modbus TCP - {}", self.target())
    }
}
