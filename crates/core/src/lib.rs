//! Core console logic - pure, deterministic, and testable
//!
//! This crate holds the parts of the orchestrator that have real state but no
//! I/O: the tournament bracket, the menu configuration and cursor, winner
//! determination, tetromino sequence generation and the per-game session
//! record. Nothing here touches the bus, the display or the clock, so every
//! rule can be unit tested directly.
//!
//! # Module Structure
//!
//! - [`bracket`]: single-elimination bracket with byes and draw elimination
//! - [`config`]: menu-chosen [`Configuration`] and the wrapping [`SelectionCursor`]
//! - [`rng`]: seeded LCG and 100-piece tetromino sequences
//! - [`scoring`]: head-to-head and casual winner rules
//! - [`session`]: [`GameSession`] record and countdown formatting
//!
//! # Example
//!
//! ```
//! use tetris_console_core::{Pairing, TournamentBracket};
//!
//! let mut bracket = TournamentBracket::new(3);
//! assert!(matches!(bracket.next_match(), Pairing::Match(_)));
//! bracket.record_result(40, 10); // player 2 out
//!
//! // Player 3 has no partner, so a second round starts: 1 vs 3.
//! match bracket.next_match() {
//!     Pairing::NewRound { round, pair } => {
//!         assert_eq!(round, 2);
//!         assert_eq!((pair.player_one, pair.player_two), (1, 3));
//!     }
//!     other => panic!("unexpected {:?}", other),
//! }
//! ```

pub mod bracket;
pub mod config;
pub mod rng;
pub mod scoring;
pub mod session;

pub use tetris_console_types as types;

pub use bracket::{MatchPair, Pairing, TournamentBracket};
pub use config::{Configuration, SelectionCursor};
pub use rng::{SimpleRng, TetrominoSequence};
pub use scoring::{casual_outcome, compare, head_to_head_scores, Outcome, ScoreMap, Verdict};
pub use session::{format_remaining, GameSession, SessionPhase};
