//! Minimal Modbus TCP server for transport tests.
//!
//! Understands only "write multiple registers" (function 0x10). Every
//! request is recorded and answered with either an echo acknowledgement or
//! an exception response.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// One decoded write request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterWrite {
    pub unit_id: u8,
    pub function: u8,
    pub address: u16,
    pub values: Vec<u16>,
}

/// How the server answers writes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    Ack,
    /// Exception response with the given code (e.g. 0x02 illegal data address)
    Exception(u8),
}

pub struct MockModbusServer {
    addr: SocketAddr,
    writes: Arc<Mutex<Vec<RegisterWrite>>>,
    connections: Arc<AtomicUsize>,
    task: JoinHandle<()>,
}

impl MockModbusServer {
    pub async fn start(reply: Reply) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let writes = Arc::new(Mutex::new(Vec::new()));
        let connections = Arc::new(AtomicUsize::new(0));

        let task = {
            let writes = Arc::clone(&writes);
            let connections = Arc::clone(&connections);
            tokio::spawn(async move {
                while let Ok((socket, _)) = listener.accept().await {
                    connections.fetch_add(1, Ordering::SeqCst);
                    let writes = Arc::clone(&writes);
                    tokio::spawn(async move {
                        let _ = serve(socket, writes, reply).await;
                    });
                }
            })
        };

        Self {
            addr,
            writes,
            connections,
            task,
        }
    }

    pub fn host(&self) -> String {
        self.addr.ip().to_string()
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    pub fn writes(&self) -> Vec<RegisterWrite> {
        self.writes.lock().unwrap().clone()
    }

    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }
}

impl Drop for MockModbusServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn serve(
    mut socket: TcpStream,
    writes: Arc<Mutex<Vec<RegisterWrite>>>,
    reply: Reply,
) -> std::io::Result<()> {
    loop {
        // MBAP header: transaction id, protocol id, length, unit id
        let mut header = [0u8; 7];
        if socket.read_exact(&mut header).await.is_err() {
            return Ok(());
        }
        let length = usize::from(u16::from_be_bytes([header[4], header[5]]));
        let unit_id = header[6];

        let mut pdu = vec![0u8; length.saturating_sub(1)];
        socket.read_exact(&mut pdu).await?;

        let function = pdu[0];
        let address = u16::from_be_bytes([pdu[1], pdu[2]]);
        let byte_count = usize::from(pdu[5]);
        let values = pdu[6..6 + byte_count]
            .chunks(2)
            .map(|word| u16::from_be_bytes([word[0], word[1]]))
            .collect();

        writes.lock().unwrap().push(RegisterWrite {
            unit_id,
            function,
            address,
            values,
        });

        let response = match reply {
            Reply::Ack => vec![function, pdu[1], pdu[2], pdu[3], pdu[4]],
            Reply::Exception(code) => vec![function | 0x80, code],
        };

        let mut frame = Vec::with_capacity(7 + response.len());
        frame.extend_from_slice(&header[0..2]);
        frame.extend_from_slice(&[0, 0]);
        frame.extend_from_slice(&((response.len() + 1) as u16).to_be_bytes());
        frame.push(unit_id);
        frame.extend_from_slice(&response);
        socket.write_all(&frame).await?;
    }
}
