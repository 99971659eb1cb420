//! Terminal stand-in for the buzzer: a bell and a short bezel flash.

use std::cell::Cell;
use std::io::Write;
use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::engine::Feedback;

pub const PULSE_MS: u64 = 100;

pub struct BellFeedback {
    last_pulse: Rc<Cell<Option<Instant>>>,
    audible: bool,
}

impl BellFeedback {
    pub fn new(audible: bool) -> Self {
        Self {
            last_pulse: Rc::new(Cell::new(None)),
            audible,
        }
    }

    /// Read side, for the view.
    pub fn handle(&self) -> BuzzerHandle {
        BuzzerHandle {
            last_pulse: Rc::clone(&self.last_pulse),
        }
    }
}

impl Feedback for BellFeedback {
    fn pulse(&mut self) {
        self.last_pulse.set(Some(Instant::now()));
        if self.audible {
            let mut out = std::io::stdout();
            let _ = out.write_all(b"\x07");
            let _ = out.flush();
        }
    }
}

#[derive(Debug, Clone)]
pub struct BuzzerHandle {
    last_pulse: Rc<Cell<Option<Instant>>>,
}

impl BuzzerHandle {
    /// Whether the buzzer is still sounding.
    pub fn is_active(&self) -> bool {
        self.last_pulse
            .get()
            .is_some_and(|t| t.elapsed() < Duration::from_millis(PULSE_MS))
    }
}
