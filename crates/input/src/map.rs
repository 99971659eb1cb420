//! Key mapping from terminal events to encoder actions.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Turn the knob one detent (`-1` or `+1`).
    Rotate(i32),
    /// Push the knob.
    Press,
}

pub fn map_key(key: KeyEvent) -> Option<KeyAction> {
    match key.code {
        KeyCode::Left | KeyCode::Char('a' | 'A' | 'h' | 'H') => Some(KeyAction::Rotate(-1)),
        KeyCode::Right | KeyCode::Char('d' | 'D' | 'l' | 'L') => Some(KeyAction::Rotate(1)),
        KeyCode::Enter | KeyCode::Char(' ') => Some(KeyAction::Press),
        _ => None,
    }
}

/// Check if key should quit the console.
pub fn should_quit(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q'))
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}
