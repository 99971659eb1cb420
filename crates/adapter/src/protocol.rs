//! Controller bus protocol: command bytes, status replies, score encoding and
//! the TCP gateway framing.

use crate::types::{
    ControllerAddress, CMD_END_OF_SEQUENCE, CMD_RESET_SCORE, CMD_START_GAME, CMD_STOP_GAME,
    REPLY_ONGOING, REPLY_READY, SEQUENCE_BATCH,
};

/// Master → controller command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    StartGame,
    EndOfSequence,
    StopGame,
    ResetScore,
}

impl Command {
    pub fn byte(self) -> u8 {
        match self {
            Command::StartGame => CMD_START_GAME,
            Command::EndOfSequence => CMD_END_OF_SEQUENCE,
            Command::StopGame => CMD_STOP_GAME,
            Command::ResetScore => CMD_RESET_SCORE,
        }
    }

    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            CMD_START_GAME => Some(Command::StartGame),
            CMD_END_OF_SEQUENCE => Some(Command::EndOfSequence),
            CMD_STOP_GAME => Some(Command::StopGame),
            CMD_RESET_SCORE => Some(Command::ResetScore),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Command::StartGame => "start",
            Command::EndOfSequence => "end_of_sequence",
            Command::StopGame => "stop",
            Command::ResetScore => "reset_score",
        }
    }
}

/// One status byte read from a controller.
///
/// Its meaning depends on what the master is waiting for: during the start
/// handshake only `r` counts, during play anything but `o` means the
/// controller's game has ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusByte(pub u8);

impl StatusByte {
    pub fn is_ready(self) -> bool {
        self.0 == REPLY_READY
    }

    pub fn is_ongoing(self) -> bool {
        self.0 == REPLY_ONGOING
    }

    /// Printable form for logs.
    pub fn display(self) -> char {
        if self.0.is_ascii_graphic() {
            self.0 as char
        } else {
            '?'
        }
    }
}

/// Decode a big-endian 16-bit score. `None` unless exactly two bytes.
pub fn decode_score(bytes: &[u8]) -> Option<u16> {
    match bytes {
        [hi, lo] => Some(u16::from_be_bytes([*hi, *lo])),
        _ => None,
    }
}

pub fn encode_score(score: u16) -> [u8; 2] {
    score.to_be_bytes()
}

/// Split a tetromino sequence into bus-sized transmissions.
pub fn sequence_batches(sequence: &[u8]) -> std::slice::Chunks<'_, u8> {
    sequence.chunks(SEQUENCE_BATCH)
}

/// Human-readable meaning of a two-wire bus transmission result code.
pub fn describe_code(code: u8) -> &'static str {
    match code {
        0 => "success",
        1 => "data too long",
        2 => "address not acknowledged",
        3 => "data not acknowledged",
        5 => "bus timeout",
        _ => "other error",
    }
}

/// Framing used between [`crate::TcpLink`] and [`crate::run_gateway`].
///
/// ```text
/// write: ['W', address, len, payload[len]]  -> [code]
/// read:  ['R', address, count]              -> [code, n, bytes[n]]
/// ```
///
/// `n < count` on a read means the controller had nothing ready yet.
pub mod wire {
    use super::ControllerAddress;

    pub const OP_WRITE: u8 = b'W';
    pub const OP_READ: u8 = b'R';

    /// Result code: success.
    pub const CODE_OK: u8 = 0;
    /// Result code: payload larger than the bus buffer.
    pub const CODE_TOO_LONG: u8 = 1;
    /// Result code: unspecified failure.
    pub const CODE_OTHER: u8 = 4;

    pub fn write_frame(address: ControllerAddress, payload: &[u8]) -> Option<Vec<u8>> {
        let len = u8::try_from(payload.len()).ok()?;
        let mut frame = Vec::with_capacity(payload.len() + 3);
        frame.extend_from_slice(&[OP_WRITE, address.0, len]);
        frame.extend_from_slice(payload);
        Some(frame)
    }

    pub fn read_frame(address: ControllerAddress, count: usize) -> Option<[u8; 3]> {
        let count = u8::try_from(count).ok()?;
        Some([OP_READ, address.0, count])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SEQUENCE_LEN;

    #[test]
    fn command_bytes_round_trip() {
        for cmd in [
            Command::StartGame,
            Command::EndOfSequence,
            Command::StopGame,
            Command::ResetScore,
        ] {
            assert_eq!(Command::from_byte(cmd.byte()), Some(cmd));
        }
        assert_eq!(Command::from_byte(b'r'), None);
    }

    #[test]
    fn score_is_big_endian() {
        assert_eq!(decode_score(&[0x00, 0x2A]), Some(42));
        assert_eq!(decode_score(&[0x01, 0x00]), Some(256));
        assert_eq!(decode_score(&[0x2A]), None);
        assert_eq!(encode_score(0x1234), [0x12, 0x34]);
    }

    #[test]
    fn sequence_splits_into_full_batches_plus_remainder() {
        let seq = [3u8; SEQUENCE_LEN];
        let sizes: Vec<usize> = sequence_batches(&seq).map(|b| b.len()).collect();
        assert_eq!(sizes, vec![32, 32, 32, 4]);
    }

    #[test]
    fn status_interpretation() {
        assert!(StatusByte(b'r').is_ready());
        assert!(StatusByte(b'o').is_ongoing());
        assert!(!StatusByte(b'x').is_ongoing());
        assert_eq!(StatusByte(0).display(), '?');
    }

    #[test]
    fn wire_frames_reject_oversized_payloads() {
        let addr = ControllerAddress(8);
        let frame = wire::write_frame(addr, b"se").unwrap();
        assert_eq!(frame, vec![b'W', 8, 2, b's', b'e']);
        assert!(wire::write_frame(addr, &[0u8; 300]).is_none());
        assert_eq!(wire::read_frame(addr, 2), Some([b'R', 8, 2]));
    }
}
