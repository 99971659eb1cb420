//! RNG module - tetromino sequence generation
//!
//! Every game starts by streaming the same 100-piece sequence to all
//! controllers so players race on identical pieces. Indices are drawn
//! uniformly from `0..7`; there is no bag and no repeat guarantee.
//!
//! Also provides a simple LCG so tests and benches can be seeded.

use crate::types::{SEQUENCE_LEN, TETROMINO_KINDS};

/// Tetromino indices for one game.
pub type TetrominoSequence = [u8; SEQUENCE_LEN];

/// 32-bit linear congruential generator.
///
/// Not cryptographic; the console only needs fair-looking piece draws that
/// are reproducible from a seed.
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// A zero seed is bumped to one.
    pub fn new(seed: u32) -> Self {
        Self { state: seed.max(1) }
    }

    /// Seed from the wall clock, for runs without a configured seed.
    pub fn from_time() -> Self {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.subsec_nanos() ^ (d.as_secs() as u32))
            .unwrap_or(1);
        Self::new(nanos)
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Value in `0..max` (`max` must be non-zero).
    ///
    /// Draws from the high half of the state; the low bits of a power-of-two
    /// LCG cycle with short periods.
    pub fn next_range(&mut self, max: u32) -> u32 {
        (self.next_u32() >> 16) % max
    }

    /// Fresh sequence of tetromino indices, each in `0..TETROMINO_KINDS`.
    pub fn sequence(&mut self) -> TetrominoSequence {
        let mut seq = [0u8; SEQUENCE_LEN];
        for slot in seq.iter_mut() {
            *slot = self.next_range(TETROMINO_KINDS as u32) as u8;
        }
        seq
    }
}

impl Default for SimpleRng {
    fn default() -> Self {
        Self::new(1)
    }
}
