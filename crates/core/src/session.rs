//! Per-game session record.

use std::collections::BTreeSet;

use crate::rng::TetrominoSequence;
use crate::scoring::ScoreMap;
use crate::types::ControllerAddress;

/// Lifecycle of one game across all controllers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    NotStarted,
    /// Handshaking with controllers and streaming the sequence.
    Starting,
    Running,
    /// A controller finished or the timer ran out; collection pending.
    Ending,
    Finished,
}

impl SessionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionPhase::NotStarted => "not_started",
            SessionPhase::Starting => "starting",
            SessionPhase::Running => "running",
            SessionPhase::Ending => "ending",
            SessionPhase::Finished => "finished",
        }
    }
}

/// State of one match (competitive) or game (casual).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSession {
    pub sequence: TetrominoSequence,
    pub started_at_ms: u64,
    /// Set once every controller has the sequence, in timer mode only.
    pub ends_at_ms: Option<u64>,
    pub scores: ScoreMap,
    /// Controllers excluded from polling and scoring for the rest of the game.
    pub faulted: BTreeSet<ControllerAddress>,
}

impl GameSession {
    pub fn new(sequence: TetrominoSequence, started_at_ms: u64) -> Self {
        Self {
            sequence,
            started_at_ms,
            ends_at_ms: None,
            scores: ScoreMap::new(),
            faulted: BTreeSet::new(),
        }
    }

    pub fn is_faulted(&self, addr: ControllerAddress) -> bool {
        self.faulted.contains(&addr)
    }

    /// Remaining time at `now_ms`, saturating at zero.
    pub fn remaining_ms(&self, now_ms: u64) -> Option<u64> {
        self.ends_at_ms.map(|end| end.saturating_sub(now_ms))
    }

    /// Whether the countdown has run out (strictly past the deadline).
    pub fn timer_expired(&self, now_ms: u64) -> bool {
        self.ends_at_ms.is_some_and(|end| now_ms > end)
    }
}

/// Render a countdown as `m:ss`.
///
/// # Examples
///
/// ```
/// use tetris_console_core::session::format_remaining;
///
/// assert_eq!(format_remaining(125_000), "2:05");
/// assert_eq!(format_remaining(59_999), "0:59");
/// ```
pub fn format_remaining(ms: u64) -> String {
    let minutes = ms / 60_000;
    let seconds = (ms % 60_000) / 1000;
    format!("{}:{:02}", minutes, seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn countdown_formatting_pads_seconds() {
        assert_eq!(format_remaining(0), "0:00");
        assert_eq!(format_remaining(8 * 60_000), "8:00");
        assert_eq!(format_remaining(61_000), "1:01");
    }

    #[test]
    fn timer_expires_strictly_after_deadline() {
        let mut s = GameSession::new([0; crate::types::SEQUENCE_LEN], 0);
        assert!(!s.timer_expired(10));
        s.ends_at_ms = Some(1000);
        assert!(!s.timer_expired(1000));
        assert!(s.timer_expired(1001));
        assert_eq!(s.remaining_ms(1500), Some(0));
        assert_eq!(s.remaining_ms(400), Some(600));
    }
}
