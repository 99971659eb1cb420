//! In-memory controller boards speaking the bus protocol.
//!
//! Used by the terminal console when no gateway is configured, by the
//! `controller-sim` gateway, and by tests that need precise fault injection.
//!
//! Board lifecycle:
//!
//! ```text
//! Idle --'s'--> Preparing --(ready_after_polls 'w' replies, then 'r')--> Receiving
//! Receiving --(bytes 0..=6)--> Receiving --'e'--> Playing
//! Playing --(game_polls 'o' replies, or 'q')--> Ended --'-'--> Idle
//! ```

use std::collections::BTreeMap;

use crate::link::{ControllerLink, TransportError};
use crate::protocol::{encode_score, Command};
use crate::types::{
    controller_addresses, ControllerAddress, REPLY_ONGOING, REPLY_READY, SEQUENCE_BATCH,
    TETROMINO_KINDS,
};
use tetris_console_core::SimpleRng;

/// Status reply of an idle board.
pub const REPLY_IDLE: u8 = b'i';
/// Status reply while preparing for a sequence.
pub const REPLY_WAIT: u8 = b'w';
/// Default status reply once the local game has ended.
pub const REPLY_GAME_OVER: u8 = b'x';

/// Behaviour of one simulated board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerScript {
    /// `w` replies before answering `r` after a start command.
    pub ready_after_polls: u32,
    /// `o` replies before the local game ends by itself; `None` plays until stopped.
    pub game_polls: Option<u32>,
    /// Status byte reported once the game has ended.
    pub end_status: u8,
    /// Final score; `None` derives one from the game played.
    pub score: Option<u16>,
    /// Every transmission to this board fails with this result code.
    pub nack_code: Option<u8>,
    /// Never returns any data.
    pub silent: bool,
    /// Keeps answering `w` after a start command.
    pub never_ready: bool,
}

impl Default for ControllerScript {
    fn default() -> Self {
        Self {
            ready_after_polls: 0,
            game_polls: None,
            end_status: REPLY_GAME_OVER,
            score: None,
            nack_code: None,
            silent: false,
            never_ready: false,
        }
    }
}

impl ControllerScript {
    pub fn scoring(score: u16) -> Self {
        Self {
            score: Some(score),
            ..Self::default()
        }
    }

    pub fn with_game_polls(mut self, polls: u32) -> Self {
        self.game_polls = Some(polls);
        self
    }

    pub fn with_ready_after(mut self, polls: u32) -> Self {
        self.ready_after_polls = polls;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardState {
    Idle,
    Preparing { polls_left: u32 },
    Receiving,
    Playing { polls_left: Option<u32> },
    Ended,
}

/// One emulated controller board.
#[derive(Debug, Clone)]
pub struct SimulatedController {
    script: ControllerScript,
    state: BoardState,
    received: Vec<u8>,
    commands: Vec<Command>,
    polls_played: u32,
    score: u16,
    rng: Option<SimpleRng>,
    randomize_span: Option<(u32, u32)>,
}

impl SimulatedController {
    pub fn new(script: ControllerScript) -> Self {
        Self {
            script,
            state: BoardState::Idle,
            received: Vec::new(),
            commands: Vec::new(),
            polls_played: 0,
            score: 0,
            rng: None,
            randomize_span: None,
        }
    }

    /// A board whose game length and score vary from game to game.
    ///
    /// Each start picks a length in `min_polls..=max_polls` ongoing replies.
    pub fn randomized(seed: u32, min_polls: u32, max_polls: u32) -> Self {
        let (lo, hi) = (min_polls.min(max_polls), min_polls.max(max_polls));
        let mut board = Self::new(ControllerScript {
            ready_after_polls: 1,
            game_polls: Some(lo),
            ..ControllerScript::default()
        });
        board.rng = Some(SimpleRng::new(seed));
        board.randomize_span = Some((lo, hi));
        board
    }

    pub fn state(&self) -> BoardState {
        self.state
    }

    /// Tetromino indices received since the last start command.
    pub fn received(&self) -> &[u8] {
        &self.received
    }

    /// Every command byte seen, in order.
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn score(&self) -> u16 {
        self.score
    }

    pub fn script_mut(&mut self) -> &mut ControllerScript {
        &mut self.script
    }

    fn on_byte(&mut self, b: u8) {
        if self.state == BoardState::Receiving && b < TETROMINO_KINDS {
            self.received.push(b);
            return;
        }

        let Some(cmd) = Command::from_byte(b) else {
            return;
        };
        self.commands.push(cmd);
        match cmd {
            Command::StartGame => {
                self.received.clear();
                self.polls_played = 0;
                self.roll_game_length();
                self.state = BoardState::Preparing {
                    polls_left: self.script.ready_after_polls,
                };
            }
            Command::EndOfSequence => {
                if self.state == BoardState::Receiving {
                    self.state = BoardState::Playing {
                        polls_left: self.script.game_polls,
                    };
                }
            }
            Command::StopGame => {
                if matches!(self.state, BoardState::Playing { .. }) {
                    self.end_game();
                }
            }
            Command::ResetScore => {
                self.score = 0;
                self.state = BoardState::Idle;
            }
        }
    }

    fn status(&mut self) -> u8 {
        match self.state {
            BoardState::Idle => REPLY_IDLE,
            BoardState::Preparing { polls_left } => {
                if self.script.never_ready {
                    REPLY_WAIT
                } else if polls_left == 0 {
                    self.state = BoardState::Receiving;
                    REPLY_READY
                } else {
                    self.state = BoardState::Preparing {
                        polls_left: polls_left - 1,
                    };
                    REPLY_WAIT
                }
            }
            BoardState::Receiving => REPLY_READY,
            BoardState::Playing { polls_left } => match polls_left {
                Some(0) => {
                    self.end_game();
                    self.script.end_status
                }
                Some(n) => {
                    self.polls_played += 1;
                    self.state = BoardState::Playing {
                        polls_left: Some(n - 1),
                    };
                    REPLY_ONGOING
                }
                None => {
                    self.polls_played += 1;
                    REPLY_ONGOING
                }
            },
            BoardState::Ended => self.script.end_status,
        }
    }

    fn end_game(&mut self) {
        self.state = BoardState::Ended;
        self.score = match self.script.score {
            Some(score) => score,
            None => match self.rng.as_mut() {
                Some(rng) => rng.next_range(2000) as u16,
                None => {
                    let placed: u32 = self.received.iter().map(|&k| k as u32 + 1).sum();
                    (placed + self.polls_played * 10).min(u16::MAX as u32) as u16
                }
            },
        };
    }

    fn roll_game_length(&mut self) {
        if let (Some(rng), Some((lo, hi))) = (self.rng.as_mut(), self.randomize_span) {
            self.script.game_polls = Some(lo + rng.next_range(hi - lo + 1));
        }
    }
}

/// A bus of simulated boards keyed by address.
#[derive(Debug, Clone, Default)]
pub struct SimulatedBus {
    boards: BTreeMap<ControllerAddress, SimulatedController>,
    transmissions: usize,
}

impl SimulatedBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// One default board at every wired address.
    pub fn with_default_boards() -> Self {
        let mut bus = Self::new();
        for addr in controller_addresses() {
            bus.attach(addr, SimulatedController::new(ControllerScript::default()));
        }
        bus
    }

    /// Randomized boards at every wired address, seeded per slot.
    pub fn randomized(seed: u32, min_polls: u32, max_polls: u32) -> Self {
        let mut bus = Self::new();
        for addr in controller_addresses() {
            let board_seed = seed.wrapping_add((addr.0 as u32).wrapping_mul(7919));
            bus.attach(addr, SimulatedController::randomized(board_seed, min_polls, max_polls));
        }
        bus
    }

    pub fn attach(&mut self, address: ControllerAddress, board: SimulatedController) {
        self.boards.insert(address, board);
    }

    pub fn board(&self, address: ControllerAddress) -> Option<&SimulatedController> {
        self.boards.get(&address)
    }

    pub fn board_mut(&mut self, address: ControllerAddress) -> Option<&mut SimulatedController> {
        self.boards.get_mut(&address)
    }

    /// Successful transmissions so far.
    pub fn transmissions(&self) -> usize {
        self.transmissions
    }
}

impl ControllerLink for SimulatedBus {
    fn send(&mut self, address: ControllerAddress, bytes: &[u8]) -> Result<(), TransportError> {
        let board = self
            .boards
            .get_mut(&address)
            .ok_or(TransportError::Transmission { address, code: 2 })?;
        if let Some(code) = board.script.nack_code {
            return Err(TransportError::Transmission { address, code });
        }
        if bytes.len() > SEQUENCE_BATCH {
            return Err(TransportError::Transmission { address, code: 1 });
        }
        for &b in bytes {
            board.on_byte(b);
        }
        self.transmissions += 1;
        Ok(())
    }

    fn request(
        &mut self,
        address: ControllerAddress,
        count: usize,
    ) -> Result<Vec<u8>, TransportError> {
        let board = self
            .boards
            .get_mut(&address)
            .ok_or(TransportError::Transmission { address, code: 2 })?;
        if board.script.silent {
            return Ok(Vec::new());
        }
        match count {
            1 => Ok(vec![board.status()]),
            2 if board.state == BoardState::Ended => Ok(encode_score(board.score).to_vec()),
            _ => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: ControllerAddress = ControllerAddress(8);

    fn bus_with(script: ControllerScript) -> SimulatedBus {
        let mut bus = SimulatedBus::new();
        bus.attach(A, SimulatedController::new(script));
        bus
    }

    #[test]
    fn handshake_then_sequence_then_play() {
        let mut bus = bus_with(ControllerScript::scoring(42).with_ready_after(2));
        bus.send(A, b"s").unwrap();
        assert_eq!(bus.request(A, 1).unwrap(), vec![REPLY_WAIT]);
        assert_eq!(bus.request(A, 1).unwrap(), vec![REPLY_WAIT]);
        assert_eq!(bus.request(A, 1).unwrap(), vec![REPLY_READY]);

        bus.send(A, &[0, 1, 2, 6]).unwrap();
        bus.send(A, b"e").unwrap();
        assert_eq!(bus.board(A).unwrap().received(), &[0, 1, 2, 6]);
        assert_eq!(bus.request(A, 1).unwrap(), vec![REPLY_ONGOING]);

        bus.send(A, b"q").unwrap();
        assert_eq!(bus.request(A, 1).unwrap(), vec![REPLY_GAME_OVER]);
        assert_eq!(bus.request(A, 2).unwrap(), vec![0x00, 0x2A]);

        bus.send(A, b"-").unwrap();
        assert_eq!(bus.board(A).unwrap().state(), BoardState::Idle);
        assert_eq!(bus.board(A).unwrap().score(), 0);
    }

    #[test]
    fn game_ends_by_itself_after_scripted_polls() {
        let mut bus = bus_with(ControllerScript::scoring(7).with_game_polls(2));
        bus.send(A, b"s").unwrap();
        bus.request(A, 1).unwrap();
        bus.send(A, b"e").unwrap();
        assert_eq!(bus.request(A, 1).unwrap(), vec![REPLY_ONGOING]);
        assert_eq!(bus.request(A, 1).unwrap(), vec![REPLY_ONGOING]);
        assert_eq!(bus.request(A, 1).unwrap(), vec![REPLY_GAME_OVER]);
    }

    #[test]
    fn score_unavailable_before_game_over() {
        let mut bus = bus_with(ControllerScript::default());
        assert!(bus.request(A, 2).unwrap().is_empty());
    }

    #[test]
    fn nack_and_unknown_address_fail_transmission() {
        let mut bus = bus_with(ControllerScript {
            nack_code: Some(3),
            ..ControllerScript::default()
        });
        match bus.send(A, b"s") {
            Err(TransportError::Transmission { code: 3, .. }) => {}
            other => panic!("unexpected {:?}", other),
        }
        match bus.send(ControllerAddress(42), b"s") {
            Err(TransportError::Transmission { code: 2, .. }) => {}
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(bus.transmissions(), 0);
    }

    #[test]
    fn oversized_transmission_rejected() {
        let mut bus = bus_with(ControllerScript::default());
        assert!(bus.send(A, &[0u8; SEQUENCE_BATCH + 1]).is_err());
    }

    #[test]
    fn silent_board_never_answers() {
        let mut bus = bus_with(ControllerScript {
            silent: true,
            ..ControllerScript::default()
        });
        bus.send(A, b"s").unwrap();
        assert!(bus.request(A, 1).unwrap().is_empty());
    }

    #[test]
    fn randomized_boards_vary_game_length() {
        let mut bus = SimulatedBus::randomized(11, 3, 30);
        let addr = ControllerAddress(8);
        let mut lengths = Vec::new();
        for _ in 0..5 {
            bus.send(addr, b"s").unwrap();
            while bus.request(addr, 1).unwrap() != vec![REPLY_READY] {}
            bus.send(addr, b"e").unwrap();
            let mut polls = 0;
            while bus.request(addr, 1).unwrap() == vec![REPLY_ONGOING] {
                polls += 1;
            }
            assert!((3..=30).contains(&polls));
            lengths.push(polls);
            bus.send(addr, b"-").unwrap();
        }
        lengths.dedup();
        assert!(lengths.len() > 1);
    }
}
