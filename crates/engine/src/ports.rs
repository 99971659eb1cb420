//! Collaborators the orchestrator drives but does not implement: the character
//! display, the clock and the buzzer.

use std::cell::Cell;
use std::time::{Duration, Instant};

/// Fixed-size character display addressed by column and row.
///
/// Writes past the right edge are clipped by the implementation.
pub trait Display {
    fn clear(&mut self);
    fn write_at(&mut self, col: u8, row: u8, text: &str);
}

/// Millisecond clock with a blocking sleep.
pub trait Clock {
    /// Milliseconds since an arbitrary fixed origin.
    fn now_ms(&self) -> u64;
    fn sleep_ms(&self, ms: u64);
}

/// Audible/haptic acknowledgement of a button press.
pub trait Feedback {
    fn pulse(&mut self);
}

/// Feedback that does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl Feedback for Silent {
    fn pulse(&mut self) {}
}

#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }

    fn sleep_ms(&self, ms: u64) {
        std::thread::sleep(Duration::from_millis(ms));
    }
}

/// Clock that only moves when told to. Sleeping advances it instantly.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<u64>,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: Cell::new(start_ms),
        }
    }

    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get() + ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }

    fn sleep_ms(&self, ms: u64) {
        self.advance(ms);
    }
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }

    fn sleep_ms(&self, ms: u64) {
        (**self).sleep_ms(ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_advances_on_sleep() {
        let clock = ManualClock::new(100);
        clock.sleep_ms(250);
        assert_eq!(clock.now_ms(), 350);
        clock.advance(50);
        assert_eq!(clock.now_ms(), 400);
    }
}
