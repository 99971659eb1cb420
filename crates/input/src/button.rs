//! Debounced falling-edge detection on the button line.

/// Reports one press per high-to-low transition.
///
/// Starts as if the button were held, so a button already down at boot does
/// not count until it has been released once.
#[derive(Debug, Clone, Copy)]
pub struct ButtonEdge {
    held: bool,
    last_change_ms: Option<u64>,
    debounce_ms: u64,
}

pub const DEFAULT_DEBOUNCE_MS: u64 = 20;

impl Default for ButtonEdge {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE_MS)
    }
}

impl ButtonEdge {
    pub fn new(debounce_ms: u64) -> Self {
        Self {
            held: true,
            last_change_ms: None,
            debounce_ms,
        }
    }

    /// Feed the raw line level (`false` = pressed). Returns `true` on a press edge.
    pub fn update(&mut self, line: bool, now_ms: u64) -> bool {
        let pressed = !line;
        if pressed == self.held {
            return false;
        }
        if let Some(t) = self.last_change_ms {
            if now_ms.saturating_sub(t) < self.debounce_ms {
                return false;
            }
        }
        self.held = pressed;
        self.last_change_ms = Some(now_ms);
        pressed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn held_at_boot_needs_release_first() {
        let mut b = ButtonEdge::new(0);
        assert!(!b.update(false, 0));
        assert!(!b.update(true, 10));
        assert!(b.update(false, 20));
    }

    #[test]
    fn one_edge_per_press() {
        let mut b = ButtonEdge::new(0);
        b.update(true, 0);
        assert!(b.update(false, 5));
        assert!(!b.update(false, 6));
        assert!(!b.update(false, 7));
    }

    #[test]
    fn bounce_is_filtered() {
        let mut b = ButtonEdge::new(20);
        b.update(true, 0);
        assert!(b.update(false, 100));
        // Contact bounce within the window.
        assert!(!b.update(true, 105));
        assert!(!b.update(false, 110));
        assert!(!b.update(true, 130));
        assert!(b.update(false, 160));
    }
}
