//! In-memory 16x2 character LCD.

use crate::engine::Display;
use crate::types::{DISPLAY_COLS, DISPLAY_ROWS};

const COLS: usize = DISPLAY_COLS as usize;
const ROWS: usize = DISPLAY_ROWS as usize;

/// Character grid with LCD semantics: writes start at a cursor position and
/// anything past the last column is lost.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharGrid {
    cells: [[char; COLS]; ROWS],
    revision: u64,
}

impl Default for CharGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl CharGrid {
    pub fn new() -> Self {
        Self {
            cells: [[' '; COLS]; ROWS],
            revision: 0,
        }
    }

    pub fn row(&self, row: usize) -> String {
        self.cells.get(row).map(|r| r.iter().collect()).unwrap_or_default()
    }

    /// Bumped on every write; lets the front end skip redraws.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

impl Display for CharGrid {
    fn clear(&mut self) {
        self.cells = [[' '; COLS]; ROWS];
        self.revision += 1;
    }

    fn write_at(&mut self, col: u8, row: u8, text: &str) {
        let Some(line) = self.cells.get_mut(row as usize) else {
            return;
        };
        for (slot, ch) in line.iter_mut().skip(col as usize).zip(text.chars()) {
            *slot = if ch.is_ascii() && !ch.is_ascii_control() { ch } else { '?' };
        }
        self.revision += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_are_clipped_to_sixteen_columns() {
        let mut lcd = CharGrid::new();
        lcd.write_at(0, 0, "Collecting points");
        assert_eq!(lcd.row(0), "Collecting point");
        lcd.write_at(14, 1, "1:05");
        assert_eq!(lcd.row(1), "              1:");
    }

    #[test]
    fn overwrite_keeps_rest_of_row() {
        let mut lcd = CharGrid::new();
        lcd.write_at(0, 1, "please wait");
        lcd.write_at(12, 1, "..");
        assert_eq!(lcd.row(1), "please wait ..  ");
        lcd.write_at(0, 5, "ignored");
        lcd.clear();
        assert_eq!(lcd.row(1).trim(), "");
    }
}
