//! Adapter module - controller bus access
//!
//! This crate is the seam between the orchestrator and the controller boards
//! sharing the bus. The orchestrator is the only master; controllers answer
//! single-byte status requests and receive short command transmissions.
//!
//! # Protocol Overview
//!
//! 1. **Start**: master sends `s`; the controller clears its board
//! 2. **Handshake**: master polls one status byte until the controller answers `r`
//! 3. **Sequence**: master streams 100 tetromino indices (0–6) in transmissions of ≤ 32 bytes, then `e`
//! 4. **Play**: master polls one status byte; `o` means still playing, anything else means game over
//! 5. **Stop**: master sends `q` to everyone
//! 6. **Collect**: for each controller, one status byte; if not `o`, two bytes of big-endian score
//! 7. **Reset**: master sends `-` so the controller zeroes its score counter
//!
//! # Transports
//!
//! - [`SimulatedBus`]: in-memory boards with scripted behaviour and fault injection
//! - [`TcpLink`]: client for a bus gateway reachable over TCP
//! - [`run_gateway`]: tokio server exposing a [`SimulatedBus`] as a gateway
//!
//! Every exchange returns a [`TransportError`] instead of blocking forever;
//! retry caps live in [`RetryPolicy`] and are enforced by the session
//! coordinator.
//!
//! # Environment Variables
//!
//! The gateway reads:
//!
//! - `SIM_HOST`: Bind address (default: "127.0.0.1")
//! - `SIM_PORT`: Port number (default: 7878)
//!
//! # Example
//!
//! ```
//! use tetris_console_adapter::{ControllerLink, ControllerScript, SimulatedBus, SimulatedController};
//! use tetris_console_adapter::types::ControllerAddress;
//!
//! let addr = ControllerAddress(8);
//! let mut bus = SimulatedBus::new();
//! bus.attach(addr, SimulatedController::new(ControllerScript::scoring(42)));
//!
//! bus.send(addr, b"s").unwrap();
//! assert_eq!(bus.request(addr, 1).unwrap(), b"r");
//! ```

pub mod gateway;
pub mod link;
pub mod protocol;
pub mod sim;
pub mod tcp;

pub use tetris_console_core as core;
pub use tetris_console_types as types;

pub use gateway::{run_gateway, GatewayConfig};
pub use link::{ControllerLink, RetryPolicy, TransportError};
pub use protocol::{decode_score, sequence_batches, Command, StatusByte};
pub use sim::{BoardState, ControllerScript, SimulatedBus, SimulatedController};
pub use tcp::TcpLink;
