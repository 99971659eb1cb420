//! Terminal front panel for the console.
//!
//! The 16x2 character LCD is modelled by [`CharGrid`], which implements the
//! engine's `Display` port. [`ConsoleView`] paints the grid, a bezel, the key
//! help and a bus status line into a [`FrameBuffer`]; [`TerminalRenderer`]
//! flushes that framebuffer to the terminal, redrawing only changed runs.
//!
//! The view is pure (no I/O) and unit-tested; the renderer is the only part
//! that touches the real terminal.

pub mod bell;
pub mod fb;
pub mod lcd;
pub mod renderer;
pub mod view;

pub use tetris_console_engine as engine;
pub use tetris_console_types as types;

pub use bell::{BellFeedback, BuzzerHandle};
pub use fb::{Cell, CellStyle, FrameBuffer, Rgb};
pub use lcd::CharGrid;
pub use renderer::{encode_diff_into, encode_full_into, TerminalRenderer};
pub use view::{ConsoleView, RedrawTracker, StatusLine, Viewport};
