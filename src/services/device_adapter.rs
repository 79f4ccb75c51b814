//! Rate-limited, non-blocking dispatch of CMYKW instructions.
//!
//! `submit` only decides admission: it checks the rate limiter, pushes the
//! color onto a bounded queue and returns. A single background task per
//! adapter drains the queue in order and performs the transport I/O, so the
//! caller never waits on a socket or a serial line and colors reach the
//! controller in the order they were accepted.

use crate::error::{ConfigError, TransportError};
use crate::models::{ConnectionSettings, DeviceConfig, TransportKind};
use crate::services::transport::{Capabilities, Transport};
use chroma_color::Cmykw;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::Instant;

#[cfg(feature = "modbus")]
use crate::services::transport::ModbusTransport;
#[cfg(feature = "serial")]
use crate::services::transport::SerialTransport;

/// Minimum time between two accepted submissions
pub const MIN_SEND_INTERVAL: Duration = Duration::from_millis(100);

/// Accepted colors waiting for the worker
pub const QUEUE_DEPTH: usize = 16;

const REPORT_CAPACITY: usize = 64;

/// Admission gate for `submit`
#[derive(Debug, Clone)]
pub struct RateLimiter {
    min_interval: Duration,
    last_accepted: Option<Instant>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_accepted: None,
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// True when a submission at `now` would be admitted.
    pub fn is_ready(&self, now: Instant) -> bool {
        self.last_accepted
            .map_or(true, |last| now.duration_since(last) >= self.min_interval)
    }

    /// Record an admitted submission.
    pub fn record(&mut self, now: Instant) {
        self.last_accepted = Some(now);
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(MIN_SEND_INTERVAL)
    }
}

/// Result of one delivery attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    Failed(String),
}

/// Broadcast after every delivery attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReport {
    pub color: Cmykw,
    pub outcome: DeliveryOutcome,
}

impl DeliveryReport {
    pub fn is_delivered(&self) -> bool {
        self.outcome == DeliveryOutcome::Delivered
    }
}

/// Connection summary for status display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionStatus {
    /// Whether `submit` can accept colors
    pub enabled: bool,
    /// Whether a persistent connection is held (always true for Modbus)
    pub connected: bool,
    pub kind: TransportKind,
    /// Target description, or the reason the adapter is disabled
    pub detail: String,
}

impl ConnectionStatus {
    pub fn is_ready(&self) -> bool {
        self.enabled && self.connected
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.detail)
    }
}

enum Dispatch {
    Disabled {
        reason: String,
    },
    Active {
        transport: Arc<dyn Transport>,
        queue: Option<mpsc::Sender<Cmykw>>,
        worker: Option<JoinHandle<()>>,
    },
}

/// Owns one transport and feeds it from a FIFO queue.
///
/// The adapter never switches transport in place. [`DeviceAdapter::reconfigure`]
/// closes the current transport before the replacement is opened, which
/// matters for serial ports: they are opened exclusively, so building the
/// new adapter while the old one still holds the device leaves the new one
/// disconnected. Construction of an active adapter spawns its worker, so it
/// must happen inside a Tokio runtime.
pub struct DeviceAdapter {
    kind: TransportKind,
    dispatch: Dispatch,
    limiter: RateLimiter,
    reports: broadcast::Sender<DeliveryReport>,
}

impl DeviceAdapter {
    /// Validate connection settings and build the matching adapter.
    ///
    /// Invalid settings are returned to the caller, who should keep (or
    /// build) a [`DeviceAdapter::disabled`] adapter instead. A transport
    /// this build cannot drive degrades to a disabled adapter.
    pub fn configure(
        settings: &ConnectionSettings,
        caps: Capabilities,
    ) -> Result<Self, ConfigError> {
        let config = settings.validate()?;
        Ok(Self::from_config(&config, caps))
    }

    /// Build an adapter for an already validated configuration.
    pub fn from_config(config: &DeviceConfig, caps: Capabilities) -> Self {
        Self::build(config, caps, report_channel())
    }

    /// An adapter that accepts nothing.
    pub fn disabled(kind: TransportKind, reason: impl Into<String>) -> Self {
        Self::inactive(kind, reason.into(), report_channel())
    }

    /// Drive an existing transport.
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self::spawn(transport, report_channel())
    }

    /// Replace this adapter's configuration.
    ///
    /// The current transport is drained and closed first, then the new one
    /// is built. Existing report subscriptions stay attached and the send
    /// interval is kept, but the rate limiter starts fresh. On invalid
    /// settings the adapter is left disabled and the error is returned.
    pub async fn reconfigure(
        &mut self,
        settings: &ConnectionSettings,
        caps: Capabilities,
    ) -> Result<(), ConfigError> {
        let validated = settings.validate();
        self.close().await;

        let reports = self.reports.clone();
        let limiter = RateLimiter::new(self.limiter.min_interval());

        let result = match validated {
            Ok(config) => {
                *self = Self::build(&config, caps, reports);
                Ok(())
            }
            Err(e) => {
                let kind = settings
                    .connection_type
                    .parse()
                    .unwrap_or(TransportKind::None);
                tracing::warn!(error = %e, "Rejected connection settings");
                *self = Self::inactive(kind, format!("No connection ({e})"), reports);
                Err(e)
            }
        };

        self.limiter = limiter;
        result
    }

    fn build(
        config: &DeviceConfig,
        caps: Capabilities,
        reports: broadcast::Sender<DeliveryReport>,
    ) -> Self {
        let kind = config.kind();

        if kind == TransportKind::None {
            return Self::inactive(TransportKind::None, "No connection".to_string(), reports);
        }

        if !caps.supports(kind) {
            tracing::warn!(transport = %kind, "Transport not available in this build, adapter disabled");
            return Self::inactive(
                kind,
                format!("No connection ({kind} support not available)"),
                reports,
            );
        }

        match build_transport(config) {
            Some(transport) => Self::spawn(transport, reports),
            None => Self::inactive(
                kind,
                format!("No connection ({kind} support not available)"),
                reports,
            ),
        }
    }

    fn inactive(
        kind: TransportKind,
        reason: String,
        reports: broadcast::Sender<DeliveryReport>,
    ) -> Self {
        tracing::info!(transport = %kind, reason = %reason, "Device adapter disabled");

        Self {
            kind,
            dispatch: Dispatch::Disabled { reason },
            limiter: RateLimiter::default(),
            reports,
        }
    }

    fn spawn(transport: Arc<dyn Transport>, reports: broadcast::Sender<DeliveryReport>) -> Self {
        let kind = transport.kind();
        let (queue, receiver) = mpsc::channel(QUEUE_DEPTH);

        let worker = tokio::spawn(run_worker(receiver, Arc::clone(&transport), reports.clone()));
        tracing::info!(transport = %transport.describe(), "Device adapter started");

        Self {
            kind,
            dispatch: Dispatch::Active {
                transport,
                queue: Some(queue),
                worker: Some(worker),
            },
            limiter: RateLimiter::default(),
            reports,
        }
    }

    /// Replace the default 100 ms send interval.
    pub fn with_min_interval(mut self, min_interval: Duration) -> Self {
        self.limiter = RateLimiter::new(min_interval);
        self
    }

    /// Offer a color for delivery.
    ///
    /// Returns `true` if the color was queued. Returns `false` without any
    /// I/O when the adapter is disabled or closed, when the previous
    /// accepted submission was less than the minimum interval ago, or when
    /// the queue is full. Never waits.
    pub fn submit(&mut self, color: Cmykw) -> bool {
        let Dispatch::Active {
            queue: Some(queue), ..
        } = &self.dispatch
        else {
            tracing::trace!(%color, "Adapter disabled, color not sent");
            return false;
        };

        let now = Instant::now();
        if !self.limiter.is_ready(now) {
            tracing::debug!(%color, "Submission rate limited");
            return false;
        }

        match queue.try_send(color) {
            Ok(()) => {
                self.limiter.record(now);
                tracing::debug!(%color, "Color queued for delivery");
                true
            }
            Err(TrySendError::Full(_)) => {
                tracing::warn!(%color, "Delivery queue full, color dropped");
                false
            }
            Err(TrySendError::Closed(_)) => {
                tracing::warn!(%color, "Delivery worker stopped, color dropped");
                false
            }
        }
    }

    /// Subscribe to delivery reports
    pub fn subscribe(&self) -> broadcast::Receiver<DeliveryReport> {
        self.reports.subscribe()
    }

    pub fn kind(&self) -> TransportKind {
        self.kind
    }

    /// Check if submissions can be accepted
    pub fn is_enabled(&self) -> bool {
        matches!(
            self.dispatch,
            Dispatch::Active {
                queue: Some(_),
                ..
            }
        )
    }

    pub fn status(&self) -> ConnectionStatus {
        match &self.dispatch {
            Dispatch::Disabled { reason } => ConnectionStatus {
                enabled: false,
                connected: false,
                kind: self.kind,
                detail: reason.clone(),
            },
            Dispatch::Active {
                transport, queue, ..
            } => ConnectionStatus {
                enabled: queue.is_some(),
                connected: transport.is_connected(),
                kind: self.kind,
                detail: transport.describe(),
            },
        }
    }

    /// Run the transport's connection test.
    pub async fn probe(&self) -> Result<(), TransportError> {
        match &self.dispatch {
            Dispatch::Disabled { .. } => Err(TransportError::Disabled),
            Dispatch::Active { transport, .. } => transport.probe().await,
        }
    }

    /// Stop accepting colors, deliver what is queued and release the transport.
    pub async fn close(&mut self) {
        let Dispatch::Active { queue, worker, .. } = &mut self.dispatch else {
            return;
        };

        // dropping the sender lets the worker drain and exit
        queue.take();
        if let Some(worker) = worker.take() {
            if let Err(e) = worker.await {
                tracing::warn!(error = %e, "Delivery worker ended abnormally");
            }
        }
        tracing::debug!(transport = %self.kind, "Device adapter closed");
    }
}

fn report_channel() -> broadcast::Sender<DeliveryReport> {
    broadcast::channel(REPORT_CAPACITY).0
}

fn build_transport(config: &DeviceConfig) -> Option<Arc<dyn Transport>> {
    match config {
        #[cfg(feature = "modbus")]
        DeviceConfig::Network { host, port } => {
            Some(Arc::new(ModbusTransport::new(host.clone(), *port)))
        }
        #[cfg(feature = "serial")]
        DeviceConfig::Serial { path, baud_rate } => {
            Some(Arc::new(SerialTransport::open(path.clone(), *baud_rate)))
        }
        #[allow(unreachable_patterns)]
        _ => None,
    }
}

async fn run_worker(
    mut queue: mpsc::Receiver<Cmykw>,
    transport: Arc<dyn Transport>,
    reports: broadcast::Sender<DeliveryReport>,
) {
    while let Some(color) = queue.recv().await {
        let outcome = match transport.deliver(color).await {
            Ok(()) => {
                tracing::info!(%color, transport = %transport.describe(), "Color delivered");
                DeliveryOutcome::Delivered
            }
            Err(e) => {
                tracing::warn!(%color, transport = %transport.describe(), error = %e, "Delivery failed");
                DeliveryOutcome::Failed(e.to_string())
            }
        };

        // no subscribers is fine
        let _ = reports.send(DeliveryReport { color, outcome });
    }

    if let Err(e) = transport.close().await {
        tracing::warn!(error = %e, "Failed to close transport");
    }
    tracing::debug!("Delivery worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test(start_paused = true)]
    async fn test_rate_limiter_interval() {
        let mut limiter = RateLimiter::default();
        let start = Instant::now();

        assert!(limiter.is_ready(start));
        limiter.record(start);

        assert!(!limiter.is_ready(start));
        assert!(!limiter.is_ready(start + Duration::from_millis(99)));
        assert!(limiter.is_ready(start + Duration::from_millis(100)));
        assert!(limiter.is_ready(start + Duration::from_secs(5)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limiter_only_advances_on_record() {
        let mut limiter = RateLimiter::new(Duration::from_millis(100));
        let start = Instant::now();
        limiter.record(start);

        // a rejected check does not push the window forward
        assert!(!limiter.is_ready(start + Duration::from_millis(50)));
        assert!(limiter.is_ready(start + Duration::from_millis(100)));
    }

    #[test]
    fn test_disabled_adapter_status() {
        let mut adapter = DeviceAdapter::disabled(TransportKind::None, "No connection");

        assert!(!adapter.is_enabled());
        assert!(!adapter.submit(Cmykw::BLACK));
        assert_eq!(
            adapter.status(),
            ConnectionStatus {
                enabled: false,
                connected: false,
                kind: TransportKind::None,
                detail: "No connection".to_string(),
            }
        );
        assert_eq!(adapter.status().to_string(), "No connection");
    }

    #[test]
    fn test_configure_none() {
        let adapter =
            DeviceAdapter::configure(&ConnectionSettings::default(), Capabilities::detect())
                .unwrap();
        assert_eq!(adapter.kind(), TransportKind::None);
        assert!(!adapter.is_enabled());
    }

    #[test]
    fn test_configure_rejects_invalid_settings() {
        let settings = ConnectionSettings {
            connection_type: "modbus".to_string(),
            plc_port: 70000,
            ..Default::default()
        };
        let result = DeviceAdapter::configure(&settings, Capabilities::detect());
        assert!(matches!(result, Err(ConfigError::InvalidPort(70000))));
    }

    #[tokio::test]
    async fn test_reconfigure_with_invalid_settings_disables() {
        let settings = ConnectionSettings {
            connection_type: "modbus".to_string(),
            plc_port: 0,
            ..Default::default()
        };
        let mut adapter = DeviceAdapter::disabled(TransportKind::None, "No connection");

        let result = adapter.reconfigure(&settings, Capabilities::detect()).await;
        assert!(matches!(result, Err(ConfigError::InvalidPort(0))));

        let status = adapter.status();
        assert!(!status.enabled);
        assert_eq!(status.kind, TransportKind::Network);
        assert_eq!(
            status.detail,
            "No connection (Invalid port: 0 (expected 1-65535))"
        );
        assert!(!adapter.submit(Cmykw::WHITE));
    }

    #[test]
    fn test_missing_capability_degrades_to_disabled() {
        let settings = ConnectionSettings {
            connection_type: "serial".to_string(),
            serial_port: Some("/dev/ttyUSB0".to_string()),
            ..Default::default()
        };
        let adapter = DeviceAdapter::configure(&settings, Capabilities::none()).unwrap();

        let status = adapter.status();
        assert!(!status.enabled);
        assert_eq!(status.kind, TransportKind::Serial);
        assert_eq!(status.detail, "No connection (serial support not available)");
    }

    #[tokio::test]
    async fn test_probe_disabled() {
        let adapter = DeviceAdapter::disabled(TransportKind::None, "No connection");
        assert!(matches!(adapter.probe().await, Err(TransportError::Disabled)));
    }

    #[cfg(feature = "modbus")]
    #[tokio::test]
    async fn test_configure_modbus_status() {
        let settings = ConnectionSettings {
            connection_type: "modbus".to_string(),
            plc_ip: "10.1.2.3".to_string(),
            plc_port: 1502,
            ..Default::default()
        };
        let mut adapter = DeviceAdapter::configure(&settings, Capabilities::detect()).unwrap();

        let status = adapter.status();
        assert!(status.is_ready());
        assert_eq!(status.kind, TransportKind::Network);
        assert_eq!(status.detail, "Modbus TCP - 10.1.2.3:1502");

        adapter.close().await;
        assert!(!adapter.is_enabled());
        assert!(!adapter.submit(Cmykw::WHITE));
    }
}
