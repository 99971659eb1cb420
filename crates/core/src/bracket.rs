//! Single-elimination tournament bracket.
//!
//! Players are identified by `1..=n`. An eliminated slot holds `0` until the
//! next round begins, at which point the list is compacted so survivors keep
//! their relative order. Matches pair consecutive slots of the compacted list:
//! match `m` plays slots `(2(m-1), 2(m-1)+1)`. A slot past the end of the list
//! counts as empty, so an odd survivor at the tail gets a bye into the next
//! round.

use arrayvec::ArrayVec;

use crate::scoring::{compare, Verdict};
use crate::types::{MAX_PLAYERS, MIN_PLAYERS};

const CAPACITY: usize = MAX_PLAYERS as usize;

/// Marker for an eliminated slot.
pub const ELIMINATED: u8 = 0;

/// The two participants of the current match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchPair {
    pub player_one: u8,
    pub player_two: u8,
    slots: (usize, usize),
}

/// Result of asking the bracket for the next match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pairing {
    /// Next match within the current round.
    Match(MatchPair),
    /// The round was exhausted; a new round began with this opening match.
    ///
    /// Callers gate on a human acknowledgement before starting play.
    NewRound { round: u8, pair: MatchPair },
    /// Compaction left at most one player.
    Complete { champion: Option<u8> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TournamentBracket {
    players: ArrayVec<u8, CAPACITY>,
    round: u8,
    match_index: u8,
    alive: u8,
    current: Option<MatchPair>,
}

impl Default for TournamentBracket {
    fn default() -> Self {
        Self::new(MIN_PLAYERS)
    }
}

impl TournamentBracket {
    /// Create a bracket with identifiers `1..=n`.
    ///
    /// `n` is clamped to the supported player range.
    pub fn new(n: u8) -> Self {
        let mut bracket = Self {
            players: ArrayVec::new(),
            round: 1,
            match_index: 0,
            alive: 0,
            current: None,
        };
        bracket.initialize(n);
        bracket
    }

    /// Reset to identifiers `1..=n`, round 1, no match played.
    pub fn initialize(&mut self, n: u8) {
        let n = n.clamp(MIN_PLAYERS, MAX_PLAYERS);
        self.players.clear();
        self.players.extend(1..=n);
        self.round = 1;
        self.match_index = 0;
        self.alive = n;
        self.current = None;
    }

    pub fn players(&self) -> &[u8] {
        &self.players
    }

    pub fn round(&self) -> u8 {
        self.round
    }

    /// 1-based index of the current match within the round (0 before the first).
    pub fn match_index(&self) -> u8 {
        self.match_index
    }

    pub fn alive_count(&self) -> u8 {
        self.alive
    }

    pub fn current_match(&self) -> Option<MatchPair> {
        self.current
    }

    pub fn is_terminal(&self) -> bool {
        self.alive <= 1
    }

    /// The last player standing, once the tournament is terminal.
    pub fn champion(&self) -> Option<u8> {
        if self.alive != 1 {
            return None;
        }
        self.players.iter().copied().find(|&id| id != ELIMINATED)
    }

    /// Drop eliminated slots, keeping survivors in order. Idempotent.
    ///
    /// Returns `true` if the tournament is terminal afterwards.
    pub fn compact(&mut self) -> bool {
        self.players.retain(|id| *id != ELIMINATED);
        self.alive = self.players.len() as u8;
        self.is_terminal()
    }

    /// Start the next round: compact, bump the round counter, rewind to match 1.
    ///
    /// Returns `false` (and leaves the counters alone) when compaction shows the
    /// tournament is over.
    pub fn begin_round(&mut self) -> bool {
        if self.compact() {
            self.current = None;
            return false;
        }
        self.round += 1;
        self.match_index = 1;
        true
    }

    /// Advance to the next match, starting a new round when the current one is
    /// exhausted.
    pub fn next_match(&mut self) -> Pairing {
        if self.is_terminal() {
            self.current = None;
            return Pairing::Complete {
                champion: self.champion(),
            };
        }

        self.match_index += 1;
        if let Some(pair) = self.pair_at(self.match_index) {
            self.current = Some(pair);
            return Pairing::Match(pair);
        }

        if !self.begin_round() {
            return Pairing::Complete {
                champion: self.champion(),
            };
        }
        match self.pair_at(self.match_index) {
            Some(pair) => {
                self.current = Some(pair);
                Pairing::NewRound {
                    round: self.round,
                    pair,
                }
            }
            // Compaction guarantees slots 0 and 1 are populated when alive >= 2.
            None => Pairing::Complete {
                champion: self.champion(),
            },
        }
    }

    /// Apply the scores of the current match.
    ///
    /// The lower scorer is eliminated; a draw eliminates both. Returns `None`
    /// and changes nothing when no match is in progress.
    pub fn record_result(&mut self, p1_score: u16, p2_score: u16) -> Option<Verdict> {
        let pair = self.current.take()?;
        let (s1, s2) = pair.slots;
        if self.players.get(s1).copied().unwrap_or(ELIMINATED) == ELIMINATED
            || self.players.get(s2).copied().unwrap_or(ELIMINATED) == ELIMINATED
        {
            return None;
        }

        let verdict = compare(p1_score, p2_score);
        match verdict {
            Verdict::FirstWins => self.eliminate(s2),
            Verdict::SecondWins => self.eliminate(s1),
            Verdict::Tie => {
                self.eliminate(s1);
                self.eliminate(s2);
            }
        }
        Some(verdict)
    }

    fn eliminate(&mut self, slot: usize) {
        if let Some(id) = self.players.get_mut(slot) {
            if *id != ELIMINATED {
                *id = ELIMINATED;
                self.alive = self.alive.saturating_sub(1);
            }
        }
    }

    fn pair_at(&self, match_index: u8) -> Option<MatchPair> {
        let first = (match_index as usize).checked_sub(1)? * 2;
        let second = first + 1;
        let player_one = self.players.get(first).copied().filter(|&id| id != ELIMINATED)?;
        let player_two = self.players.get(second).copied().filter(|&id| id != ELIMINATED)?;
        Some(MatchPair {
            player_one,
            player_two,
            slots: (first, second),
        })
    }
}
