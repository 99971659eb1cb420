//! Shared encoder state written by the edge handler, read by the main loop.

use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};

use crate::types::STEPS_PER_DETENT;

/// Raw encoder position and button line.
///
/// The position only moves by atomic increments and decrements. The button
/// line is active-low: `false` means pressed.
#[derive(Debug)]
pub struct EncoderState {
    position: AtomicI32,
    button_line: AtomicBool,
}

impl Default for EncoderState {
    fn default() -> Self {
        Self::new()
    }
}

impl EncoderState {
    pub fn new() -> Self {
        Self {
            position: AtomicI32::new(0),
            button_line: AtomicBool::new(true),
        }
    }

    /// One quadrature step, `+1` clockwise or `-1` counter-clockwise.
    pub fn step(&self, direction: i32) {
        if direction >= 0 {
            self.position.fetch_add(1, Ordering::Relaxed);
        } else {
            self.position.fetch_sub(1, Ordering::Relaxed);
        }
    }

    /// One full detent: two steps in `direction`.
    pub fn detent(&self, direction: i32) {
        for _ in 0..STEPS_PER_DETENT {
            self.step(direction);
        }
    }

    pub fn position(&self) -> i32 {
        self.position.load(Ordering::Relaxed)
    }

    pub fn set_pressed(&self, pressed: bool) {
        self.button_line.store(!pressed, Ordering::Relaxed);
    }

    /// Raw line level; `false` while held.
    pub fn button_line(&self) -> bool {
        self.button_line.load(Ordering::Relaxed)
    }
}

/// Converts absolute positions into detent deltas.
///
/// Only even positions count, so a half-turned knob produces nothing until the
/// detent completes.
#[derive(Debug, Default, Clone, Copy)]
pub struct RotationTracker {
    last: i32,
}

impl RotationTracker {
    pub fn new(position: i32) -> Self {
        Self { last: position }
    }

    pub fn delta(&mut self, position: i32) -> i32 {
        if position == self.last || position % STEPS_PER_DETENT != 0 {
            return 0;
        }
        let detents = (position - self.last) / STEPS_PER_DETENT;
        self.last = position;
        detents
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_detent_is_ignored() {
        let enc = EncoderState::new();
        let mut tracker = RotationTracker::default();
        enc.step(1);
        assert_eq!(tracker.delta(enc.position()), 0);
        enc.step(1);
        assert_eq!(tracker.delta(enc.position()), 1);
        assert_eq!(tracker.delta(enc.position()), 0);
    }

    #[test]
    fn multiple_detents_between_samples() {
        let enc = EncoderState::new();
        let mut tracker = RotationTracker::default();
        enc.detent(-1);
        enc.detent(-1);
        enc.detent(-1);
        assert_eq!(enc.position(), -6);
        assert_eq!(tracker.delta(enc.position()), -3);
    }

    #[test]
    fn button_line_is_active_low() {
        let enc = EncoderState::new();
        assert!(enc.button_line());
        enc.set_pressed(true);
        assert!(!enc.button_line());
    }
}
