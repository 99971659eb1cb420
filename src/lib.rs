//! Tetris console orchestrator (workspace facade crate).
//!
//! Re-exports the workspace crates as `tetris_console::{core,adapter,engine,input,term,types}`.

pub use tetris_console_adapter as adapter;
pub use tetris_console_core as core;
pub use tetris_console_engine as engine;
pub use tetris_console_input as input;
pub use tetris_console_term as term;
pub use tetris_console_types as types;
