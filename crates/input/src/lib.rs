//! Console input: the rotary encoder and its push button.
//!
//! On hardware the encoder edge handler only bumps an atomic step counter and
//! the button is a debounced active-low line. This crate models both
//! ([`EncoderState`]), turns them into one [`InputSample`] per main loop
//! iteration ([`InputSource`]), and drives them from a terminal keyboard
//! ([`KeyboardEncoder`]) so the console runs without the physical knob.

pub mod button;
pub mod encoder;
pub mod handler;
pub mod map;
pub mod source;

pub use tetris_console_types as types;
pub use types::InputSample;

pub use button::ButtonEdge;
pub use encoder::{EncoderState, RotationTracker};
pub use handler::KeyboardEncoder;
pub use map::{map_key, should_quit, KeyAction};
pub use source::InputSource;
