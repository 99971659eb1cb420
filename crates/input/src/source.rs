//! One input sample per main loop iteration.

use std::sync::Arc;

use crate::button::ButtonEdge;
use crate::encoder::{EncoderState, RotationTracker};
use crate::types::InputSample;

pub struct InputSource {
    encoder: Arc<EncoderState>,
    tracker: RotationTracker,
    button: ButtonEdge,
}

impl InputSource {
    pub fn new(encoder: Arc<EncoderState>) -> Self {
        let tracker = RotationTracker::new(encoder.position());
        Self {
            encoder,
            tracker,
            button: ButtonEdge::default(),
        }
    }

    pub fn with_debounce_ms(mut self, debounce_ms: u64) -> Self {
        self.button = ButtonEdge::new(debounce_ms);
        self
    }

    pub fn encoder(&self) -> &Arc<EncoderState> {
        &self.encoder
    }

    pub fn sample(&mut self, now_ms: u64) -> InputSample {
        InputSample {
            delta: self.tracker.delta(self.encoder.position()),
            pressed: self.button.update(self.encoder.button_line(), now_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_reports_rotation_and_press_once() {
        let enc = Arc::new(EncoderState::new());
        let mut src = InputSource::new(Arc::clone(&enc)).with_debounce_ms(0);
        assert_eq!(src.sample(0), InputSample::IDLE);

        enc.detent(1);
        enc.set_pressed(true);
        let s = src.sample(10);
        assert_eq!(s.delta, 1);
        assert!(s.pressed);

        let s = src.sample(20);
        assert_eq!(s, InputSample::IDLE);
    }
}
