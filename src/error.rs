use std::path::PathBuf;

use thiserror::Error;

/// Rejected connection settings.
///
/// Raised synchronously while turning persisted or user-edited settings
/// into a [`crate::models::DeviceConfig`]; the adapter stays disabled.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown connection type: {0}")]
    UnknownTransport(String),

    #[error("Invalid {field}: {value:?} is not a number")]
    NotANumber { field: &'static str, value: String },

    #[error("Invalid port: {0} (expected 1-65535)")]
    InvalidPort(u32),

    #[error("Invalid baud rate: {0}")]
    InvalidBaudRate(u32),

    #[error("Missing {0}")]
    Missing(&'static str),

    #[error("Failed to write config {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Config serialization error: {0}")]
    Serialize(#[from] serde_yaml::Error),
}

/// Failure of a single delivery attempt.
///
/// These never reach the caller of `submit`; they are logged and broadcast
/// as delivery reports.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Transport disabled")]
    Disabled,

    #[error("Could not connect to {target}: {source}")]
    Connect {
        target: String,
        source: std::io::Error,
    },

    #[error("No serial connection established")]
    NotConnected,

    #[error("Device rejected the write: {0}")]
    DeviceRejected(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Write failed: {0}")]
    Write(#[from] std::io::Error),

    #[error("Serial port error: {0}")]
    Serial(String),

    #[error("Delivery worker failed: {0}")]
    Worker(String),
}

/// Failure to persist the color history.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("History serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
