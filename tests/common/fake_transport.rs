//! In-memory transport that records what the adapter asks of it.

use async_trait::async_trait;
use chroma::error::TransportError;
use chroma::models::TransportKind;
use chroma::services::Transport;
use chroma_color::Cmykw;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Semaphore;

#[derive(Default)]
pub struct FakeTransport {
    delivered: Mutex<Vec<Cmykw>>,
    deliver_calls: AtomicUsize,
    probe_calls: AtomicUsize,
    closed: AtomicBool,
    delay: Option<Duration>,
    gate: Option<Arc<Semaphore>>,
    failure: Option<String>,
}

impl FakeTransport {
    /// Accepts every delivery immediately
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Takes `delay` per delivery
    pub fn slow(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            delay: Some(delay),
            ..Default::default()
        })
    }

    /// Each delivery waits for one permit on the returned semaphore
    pub fn gated() -> (Arc<Self>, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        let transport = Arc::new(Self {
            gate: Some(Arc::clone(&gate)),
            ..Default::default()
        });
        (transport, gate)
    }

    /// Fails every delivery with `reason`
    pub fn failing(reason: &str) -> Arc<Self> {
        Arc::new(Self {
            failure: Some(reason.to_string()),
            ..Default::default()
        })
    }

    pub fn delivered(&self) -> Vec<Cmykw> {
        self.delivered.lock().unwrap().clone()
    }

    pub fn deliver_calls(&self) -> usize {
        self.deliver_calls.load(Ordering::SeqCst)
    }

    pub fn probe_calls(&self) -> usize {
        self.probe_calls.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn deliver(&self, color: Cmykw) -> Result<(), TransportError> {
        self.deliver_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(gate) = &self.gate {
            gate.acquire().await.expect("gate closed").forget();
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(reason) = &self.failure {
            return Err(TransportError::DeviceRejected(reason.clone()));
        }

        self.delivered.lock().unwrap().push(color);
        Ok(())
    }

    async fn probe(&self) -> Result<(), TransportError> {
        self.probe_calls.fetch_add(1, Ordering::SeqCst);
        match &self.failure {
            Some(reason) => Err(TransportError::Protocol(reason.clone())),
            None => Ok(()),
        }
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn kind(&self) -> TransportKind {
        TransportKind::Network
    }

    fn describe(&self) -> String {
        "Fake transport".to_string()
    }
}
