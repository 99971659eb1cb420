//! Keyboard stand-in for the encoder edge handler.
//!
//! Supports terminals that do not emit key release events by using a timeout.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{KeyEvent, KeyEventKind};

use crate::encoder::EncoderState;
use crate::map::{map_key, KeyAction};

// Without release events a tap would hold the button forever; releasing after a
// short timeout turns each tap (or auto-repeat burst) into one press.
const DEFAULT_KEY_RELEASE_TIMEOUT_MS: u64 = 150;

/// Drives an [`EncoderState`] from key events.
#[derive(Debug)]
pub struct KeyboardEncoder {
    encoder: Arc<EncoderState>,
    button_down_since: Option<Instant>,
    key_release_timeout: Duration,
}

impl KeyboardEncoder {
    pub fn new(encoder: Arc<EncoderState>) -> Self {
        Self {
            encoder,
            button_down_since: None,
            key_release_timeout: Duration::from_millis(DEFAULT_KEY_RELEASE_TIMEOUT_MS),
        }
    }

    pub fn with_key_release_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.key_release_timeout = Duration::from_millis(timeout_ms);
        self
    }

    pub fn key_release_timeout_ms(&self) -> u64 {
        self.key_release_timeout.as_millis() as u64
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        match (map_key(key), key.kind) {
            (Some(KeyAction::Rotate(dir)), KeyEventKind::Press | KeyEventKind::Repeat) => {
                self.encoder.detent(dir);
            }
            (Some(KeyAction::Press), KeyEventKind::Press | KeyEventKind::Repeat) => {
                self.button_down_since = Some(Instant::now());
                self.encoder.set_pressed(true);
            }
            (Some(KeyAction::Press), KeyEventKind::Release) => self.release(),
            _ => {}
        }
    }

    /// Auto-release the button once the timeout has passed without a new press.
    pub fn update(&mut self) {
        if let Some(since) = self.button_down_since {
            if since.elapsed() > self.key_release_timeout {
                self.release();
            }
        }
    }

    fn release(&mut self) {
        self.button_down_since = None;
        self.encoder.set_pressed(false);
    }
}
