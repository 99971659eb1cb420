//! TCP bus gateway
//!
//! Exposes a [`SimulatedBus`] over TCP using the framing in
//! [`crate::protocol::wire`], so the console can run against controllers that
//! live in another process. Uses tokio for async networking. The bus sits
//! behind one mutex, so exchanges from several connections never interleave.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{oneshot, Mutex};
use tracing::{debug, info, warn};

use crate::link::ControllerLink;
use crate::protocol::wire::{CODE_OK, OP_READ, OP_WRITE};
use crate::sim::SimulatedBus;
use crate::types::ControllerAddress;

/// Gateway configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7878,
        }
    }
}

impl GatewayConfig {
    /// Create from `SIM_HOST` / `SIM_PORT`, falling back to defaults.
    pub fn from_env() -> Self {
        use std::env;

        let defaults = Self::default();
        let host = env::var("SIM_HOST").unwrap_or(defaults.host);
        let port = env::var("SIM_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.port);
        Self { host, port }
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| anyhow!("invalid gateway address {}:{}: {}", self.host, self.port, e))
    }
}

/// Serve `bus` until the listener fails.
///
/// When `ready_tx` is given, the bound address is sent once listening (useful
/// with port 0 in tests).
pub async fn run_gateway(
    config: GatewayConfig,
    bus: SimulatedBus,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> Result<()> {
    let listener = TcpListener::bind(config.socket_addr()?).await?;
    let local = listener.local_addr()?;
    info!(addr = %local, "bus gateway listening");
    if let Some(tx) = ready_tx {
        let _ = tx.send(local);
    }

    let bus = Arc::new(Mutex::new(bus));
    let mut next_id = 0usize;
    loop {
        let (stream, peer) = listener.accept().await?;
        next_id += 1;
        let conn_id = next_id;
        info!(conn_id, peer = %peer, "bus master connected");
        let bus = Arc::clone(&bus);
        tokio::spawn(async move {
            match handle_connection(stream, bus).await {
                Ok(()) => info!(conn_id, "bus master disconnected"),
                Err(e) => warn!(conn_id, error = %e, "bus master connection error"),
            }
        });
    }
}

async fn handle_connection(mut stream: TcpStream, bus: Arc<Mutex<SimulatedBus>>) -> Result<()> {
    stream.set_nodelay(true)?;
    let mut payload = Vec::with_capacity(u8::MAX as usize);

    loop {
        let op = match stream.read_u8().await {
            Ok(op) => op,
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(()),
            Err(e) => return Err(e.into()),
        };
        let address = ControllerAddress(stream.read_u8().await?);

        match op {
            OP_WRITE => {
                let len = stream.read_u8().await? as usize;
                payload.resize(len, 0);
                stream.read_exact(&mut payload).await?;
                let code = {
                    let mut bus = bus.lock().await;
                    match bus.send(address, &payload) {
                        Ok(()) => CODE_OK,
                        Err(e) => e.code(),
                    }
                };
                debug!(address = %address, len, code, "write");
                stream.write_all(&[code]).await?;
            }
            OP_READ => {
                let count = stream.read_u8().await? as usize;
                let reply = {
                    let mut bus = bus.lock().await;
                    bus.request(address, count)
                };
                let mut out = Vec::with_capacity(count + 2);
                match reply {
                    Ok(bytes) => {
                        let n = bytes.len().min(count);
                        out.push(CODE_OK);
                        out.push(n as u8);
                        out.extend_from_slice(&bytes[..n]);
                    }
                    Err(e) => {
                        out.push(e.code());
                        out.push(0);
                    }
                }
                debug!(address = %address, count, returned = out[1], "read");
                stream.write_all(&out).await?;
            }
            other => {
                return Err(anyhow!("unknown gateway op 0x{:02x}", other));
            }
        }
    }
}
