//! `ControllerLink` over a TCP bus gateway.
//!
//! Bridges the synchronous main loop with tokio: every exchange runs on a
//! private current-thread runtime and is bounded by the I/O timeout. A timed
//! out or failed connection is dropped and re-established on the next call,
//! so a late reply can never be mistaken for the answer to a later request.

use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::runtime::Runtime;
use tokio::time::error::Elapsed;
use tracing::{debug, warn};

use crate::link::{ControllerLink, TransportError};
use crate::protocol::wire::{self, CODE_OK};
use crate::types::ControllerAddress;

pub struct TcpLink {
    rt: Runtime,
    gateway: SocketAddr,
    io_timeout: Duration,
    stream: Option<TcpStream>,
}

impl TcpLink {
    /// Connect to the gateway at `gateway`.
    pub fn connect(gateway: SocketAddr, io_timeout: Duration) -> Result<Self, TransportError> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let mut link = Self {
            rt,
            gateway,
            io_timeout,
            stream: None,
        };
        let Self {
            rt,
            gateway,
            io_timeout,
            stream,
        } = &mut link;
        ensure_connected(rt, stream, *gateway, *io_timeout)?;
        Ok(link)
    }

    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }
}

fn ensure_connected<'a>(
    rt: &Runtime,
    slot: &'a mut Option<TcpStream>,
    gateway: SocketAddr,
    io_timeout: Duration,
) -> Result<&'a mut TcpStream, TransportError> {
    if slot.is_none() {
        let stream = bounded(rt, io_timeout, TcpStream::connect(gateway))
            .map_err(|_| TransportError::Unreachable(format!("connect to {} timed out", gateway)))?
            .map_err(|e| TransportError::Unreachable(format!("{}: {}", gateway, e)))?;
        stream.set_nodelay(true)?;
        debug!(gateway = %gateway, "connected to bus gateway");
        *slot = Some(stream);
    }
    slot.as_mut()
        .ok_or_else(|| TransportError::Unreachable(gateway.to_string()))
}

/// Run `fut` to completion on `rt`, giving up after `limit`.
///
/// The timer is created inside the runtime; tokio timers need a live reactor.
fn bounded<F: Future>(rt: &Runtime, limit: Duration, fut: F) -> Result<F::Output, Elapsed> {
    rt.block_on(async { tokio::time::timeout(limit, fut).await })
}

async fn write_exchange(stream: &mut TcpStream, frame: &[u8]) -> std::io::Result<u8> {
    stream.write_all(frame).await?;
    stream.read_u8().await
}

async fn read_exchange(stream: &mut TcpStream, frame: &[u8]) -> std::io::Result<(u8, Vec<u8>)> {
    stream.write_all(frame).await?;
    let code = stream.read_u8().await?;
    let n = stream.read_u8().await? as usize;
    let mut bytes = vec![0u8; n];
    stream.read_exact(&mut bytes).await?;
    Ok((code, bytes))
}

impl ControllerLink for TcpLink {
    fn send(&mut self, address: ControllerAddress, bytes: &[u8]) -> Result<(), TransportError> {
        let frame = wire::write_frame(address, bytes)
            .ok_or(TransportError::PayloadTooLarge { len: bytes.len() })?;

        let Self {
            rt,
            gateway,
            io_timeout,
            stream,
        } = self;
        let conn = ensure_connected(rt, stream, *gateway, *io_timeout)?;
        let outcome = bounded(rt, *io_timeout, write_exchange(conn, &frame));

        match outcome {
            Err(_) => {
                warn!(address = %address, "gateway write timed out; reconnecting");
                *stream = None;
                Err(TransportError::Timeout {
                    address,
                    timeout_ms: io_timeout.as_millis() as u64,
                })
            }
            Ok(Err(e)) => {
                *stream = None;
                Err(TransportError::Io(e))
            }
            Ok(Ok(CODE_OK)) => Ok(()),
            Ok(Ok(code)) => Err(TransportError::Transmission { address, code }),
        }
    }

    fn request(
        &mut self,
        address: ControllerAddress,
        count: usize,
    ) -> Result<Vec<u8>, TransportError> {
        let frame =
            wire::read_frame(address, count).ok_or(TransportError::PayloadTooLarge { len: count })?;

        let Self {
            rt,
            gateway,
            io_timeout,
            stream,
        } = self;
        let conn = ensure_connected(rt, stream, *gateway, *io_timeout)?;
        let outcome = bounded(rt, *io_timeout, read_exchange(conn, &frame));

        match outcome {
            Err(_) => {
                warn!(address = %address, "gateway read timed out; reconnecting");
                *stream = None;
                Err(TransportError::Timeout {
                    address,
                    timeout_ms: io_timeout.as_millis() as u64,
                })
            }
            Ok(Err(e)) => {
                *stream = None;
                Err(TransportError::Io(e))
            }
            Ok(Ok((CODE_OK, bytes))) => Ok(bytes),
            Ok(Ok((code, _))) => Err(TransportError::Transmission { address, code }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;

    // Plain std threads: the link must work without an ambient tokio runtime.
    #[test]
    fn connects_and_exchanges_without_ambient_runtime() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let server = std::thread::spawn(move || {
            let (mut conn, _) = listener.accept().unwrap();
            let mut frame = [0u8; 4];
            conn.read_exact(&mut frame).unwrap();
            assert_eq!(frame, [wire::OP_WRITE, 8, 1, b's']);
            conn.write_all(&[CODE_OK]).unwrap();
        });

        let mut link = TcpLink::connect(addr, Duration::from_millis(500)).unwrap();
        assert!(link.is_connected());
        link.send(ControllerAddress(8), b"s").unwrap();
        server.join().unwrap();
    }

    #[test]
    fn refused_connection_is_unreachable() {
        let addr = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap()
        };
        let err = TcpLink::connect(addr, Duration::from_millis(200))
            .err()
            .expect("nothing listens there");
        assert!(matches!(err, TransportError::Unreachable(_)));
    }
}
