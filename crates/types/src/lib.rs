//! Core types module - shared constants and small value types
//!
//! This module defines the fundamental types used throughout the console.
//! Everything here is plain data with no external dependencies, so it can be
//! shared by the pure logic crate, the bus adapter and the terminal front-end.
//!
//! # Bus protocol bytes
//!
//! The orchestrator is the bus master. Single-byte commands and replies:
//!
//! | Constant | Byte | Direction | Meaning |
//! |----------|------|-----------|---------|
//! | `CMD_START_GAME` | `s` | master → controller | clear board, prepare for a sequence |
//! | `REPLY_READY` | `r` | controller → master | ready to receive the sequence |
//! | `CMD_END_OF_SEQUENCE` | `e` | master → controller | sequence complete |
//! | `REPLY_ONGOING` | `o` | controller → master | local game still running |
//! | `CMD_STOP_GAME` | `q` | master → controller | stop the local game |
//! | `CMD_RESET_SCORE` | `-` | master → controller | reset the score counter |
//!
//! Any status reply other than `o` means the controller's game has ended.
//!
//! # Timing constants
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `BUS_POLL_MS` | 100 | Minimum interval between status poll rounds |
//! | `TIMER_POLL_MS` | 1000 | Minimum interval between countdown refreshes |
//! | `MS_PER_MINUTE` | 60000 | Timer minutes to milliseconds |
//!
//! # Examples
//!
//! ```
//! use tetris_console_types::{controller_addresses, ControllerAddress, MenuState, CONTROLLER_COUNT};
//!
//! let addrs: Vec<ControllerAddress> = controller_addresses().collect();
//! assert_eq!(addrs.len(), CONTROLLER_COUNT);
//! assert_eq!(addrs[0], ControllerAddress(8));
//!
//! assert_eq!(MenuState::PlayerCount.option_count(), Some(7));
//! assert_eq!(MenuState::InGame.option_count(), None);
//! ```

use std::fmt;

/// Start game command.
pub const CMD_START_GAME: u8 = b's';

/// End-of-sequence marker sent after the last tetromino batch.
pub const CMD_END_OF_SEQUENCE: u8 = b'e';

/// Stop game command.
pub const CMD_STOP_GAME: u8 = b'q';

/// Reset score counter command.
pub const CMD_RESET_SCORE: u8 = b'-';

/// Controller reply: ready to receive the tetromino sequence.
pub const REPLY_READY: u8 = b'r';

/// Controller reply: local game still ongoing.
pub const REPLY_ONGOING: u8 = b'o';

/// Number of tetromino indices sent to every controller per game.
pub const SEQUENCE_LEN: usize = 100;

/// Maximum bytes per bus transmission when streaming the sequence.
pub const SEQUENCE_BATCH: usize = 32;

/// Number of distinct tetromino kinds (indices 0..=6).
pub const TETROMINO_KINDS: u8 = 7;

/// Bus address of the first controller slot.
pub const FIRST_CONTROLLER_ADDRESS: u8 = 8;

/// Number of physical player slots wired to the bus.
pub const CONTROLLER_COUNT: usize = 2;

/// Minimum interval between ongoing-status poll rounds (ms).
pub const BUS_POLL_MS: u64 = 100;

/// Minimum interval between countdown refreshes (ms).
pub const TIMER_POLL_MS: u64 = 1000;

pub const MS_PER_MINUTE: u64 = 60_000;

/// Character display width (columns).
pub const DISPLAY_COLS: u8 = 16;

/// Character display height (rows).
pub const DISPLAY_ROWS: u8 = 2;

pub const MIN_PLAYERS: u8 = 2;
pub const MAX_PLAYERS: u8 = 8;

pub const MIN_TIMER_MINUTES: u8 = 1;
pub const MAX_TIMER_MINUTES: u8 = 8;

/// Encoder counter steps per mechanical detent.
pub const STEPS_PER_DETENT: i32 = 2;

/// Bus address of one controller board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ControllerAddress(pub u8);

impl ControllerAddress {
    /// Zero-based slot index of this address within the controller range.
    ///
    /// Returns `None` for addresses outside the wired range.
    pub fn slot(self) -> Option<usize> {
        let idx = self.0.checked_sub(FIRST_CONTROLLER_ADDRESS)? as usize;
        (idx < CONTROLLER_COUNT).then_some(idx)
    }

    pub fn from_slot(slot: usize) -> Self {
        Self(FIRST_CONTROLLER_ADDRESS + slot as u8)
    }
}

impl fmt::Display for ControllerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:02x}", self.0)
    }
}

/// All wired controller addresses, in bus order.
pub fn controller_addresses() -> impl Iterator<Item = ControllerAddress> + Clone {
    (0..CONTROLLER_COUNT).map(ControllerAddress::from_slot)
}

/// Top-level menu state. Exactly one is current at any time.
///
/// Transitions:
///
/// ```text
/// PlayerMode -> GameMode -> PlayerCount -> TimerDuration -> InGame -> RoundResolution
///                    |            |  ^            |           ^             |
///                    |            |  +------------+           |             |
///                    +------------+---------------------------+             |
///                                                  (next match) <-----------+
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuState {
    PlayerMode,
    GameMode,
    PlayerCount,
    TimerDuration,
    InGame,
    RoundResolution,
}

impl MenuState {
    /// Number of selectable options, or `None` for non-selection states.
    pub fn option_count(self) -> Option<i32> {
        match self {
            MenuState::PlayerMode | MenuState::GameMode => Some(2),
            MenuState::PlayerCount => Some((MAX_PLAYERS - MIN_PLAYERS + 1) as i32),
            MenuState::TimerDuration => Some(MAX_TIMER_MINUTES as i32),
            MenuState::InGame | MenuState::RoundResolution => None,
        }
    }

    /// Cursor value a menu starts with on entry.
    pub fn default_selection(self) -> i32 {
        match self {
            MenuState::TimerDuration => MIN_TIMER_MINUTES as i32,
            _ => 0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MenuState::PlayerMode => "player_mode",
            MenuState::GameMode => "game_mode",
            MenuState::PlayerCount => "player_count",
            MenuState::TimerDuration => "timer_duration",
            MenuState::InGame => "in_game",
            MenuState::RoundResolution => "round_resolution",
        }
    }
}

/// One sample of the input surface, taken once per main-loop iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputSample {
    /// Detents turned since the previous sample (signed).
    pub delta: i32,
    /// A debounced button press edge was observed.
    pub pressed: bool,
}

impl InputSample {
    pub const IDLE: InputSample = InputSample {
        delta: 0,
        pressed: false,
    };

    pub fn rotate(delta: i32) -> Self {
        Self {
            delta,
            pressed: false,
        }
    }

    pub fn press() -> Self {
        Self {
            delta: 0,
            pressed: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_bytes_match_controller_firmware() {
        assert_eq!(CMD_START_GAME, b's');
        assert_eq!(REPLY_READY, b'r');
        assert_eq!(CMD_END_OF_SEQUENCE, b'e');
        assert_eq!(REPLY_ONGOING, b'o');
        assert_eq!(CMD_STOP_GAME, b'q');
        assert_eq!(CMD_RESET_SCORE, b'-');
    }

    #[test]
    fn command_bytes_never_collide_with_tetromino_indices() {
        for b in [CMD_START_GAME, CMD_END_OF_SEQUENCE, CMD_STOP_GAME, CMD_RESET_SCORE] {
            assert!(b >= TETROMINO_KINDS);
        }
    }

    #[test]
    fn address_slots_round_trip_within_range() {
        assert_eq!(ControllerAddress(8).slot(), Some(0));
        assert_eq!(ControllerAddress(9).slot(), Some(1));
        assert_eq!(ControllerAddress(7).slot(), None);
        assert_eq!(ControllerAddress(8 + CONTROLLER_COUNT as u8).slot(), None);
        assert_eq!(ControllerAddress::from_slot(1), ControllerAddress(9));
    }

    #[test]
    fn menu_defaults() {
        assert_eq!(MenuState::PlayerMode.default_selection(), 0);
        assert_eq!(MenuState::PlayerCount.default_selection(), 0);
        assert_eq!(MenuState::TimerDuration.default_selection(), 1);
        assert_eq!(MenuState::TimerDuration.option_count(), Some(8));
    }

    #[test]
    fn address_display_is_hex() {
        assert_eq!(ControllerAddress(9).to_string(), "0x09");
    }
}
