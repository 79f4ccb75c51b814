pub mod color_controller;
pub mod device_adapter;
pub mod history;
pub mod transport;

pub use color_controller::{ColorController, ColorEvent, ColorSnapshot};
pub use device_adapter::{
    ConnectionStatus, DeliveryOutcome, DeliveryReport, DeviceAdapter, RateLimiter,
    MIN_SEND_INTERVAL, QUEUE_DEPTH,
};
pub use history::{ColorHistory, HistoryEntry, DEFAULT_HISTORY_CAPACITY};
pub use transport::{
    format_serial_line, list_serial_ports, Capabilities, SerialPortEntry, Transport,
};
