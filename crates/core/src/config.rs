//! Game configuration chosen through the menus, and the selection cursor.

use crate::types::{
    MenuState, MAX_PLAYERS, MAX_TIMER_MINUTES, MIN_PLAYERS, MIN_TIMER_MINUTES, MS_PER_MINUTE,
};

/// Settings for the next game.
///
/// `None` means the corresponding menu has not been confirmed yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Configuration {
    pub competitive: bool,
    pub timer_mode: bool,
    pub player_count: Option<u8>,
    pub timer_minutes: Option<u8>,
}

impl Configuration {
    /// Back to casual, untimed, nothing chosen.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Round length in milliseconds, when a timed game is configured.
    pub fn round_duration_ms(&self) -> Option<u64> {
        if !self.timer_mode {
            return None;
        }
        self.timer_minutes.map(|m| m as u64 * MS_PER_MINUTE)
    }

    pub fn mode_str(&self) -> &'static str {
        if self.competitive {
            "competitive"
        } else {
            "casual"
        }
    }
}

/// Menu cursor accumulated from encoder detents.
///
/// The value is re-wrapped after every rotation so it always names a valid
/// option of the current menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionCursor {
    menu: MenuState,
    value: i32,
}

impl Default for SelectionCursor {
    fn default() -> Self {
        Self::new(MenuState::PlayerMode)
    }
}

impl SelectionCursor {
    pub fn new(menu: MenuState) -> Self {
        Self {
            menu,
            value: menu.default_selection(),
        }
    }

    /// Reset to `menu`'s default selection.
    pub fn enter(&mut self, menu: MenuState) {
        *self = Self::new(menu);
    }

    pub fn menu(&self) -> MenuState {
        self.menu
    }

    pub fn value(&self) -> i32 {
        self.value
    }

    /// Apply `delta` detents and wrap into the menu's option range.
    ///
    /// Turning below the first option sticks at the first option; turning
    /// past the last option wraps around to the start.
    pub fn rotate(&mut self, delta: i32) -> i32 {
        let raw = self.value.saturating_add(delta);
        self.value = wrap(self.menu, raw);
        self.value
    }

    /// Player count named by the cursor (PlayerCount menu).
    pub fn player_count(&self) -> u8 {
        (self.value.clamp(0, (MAX_PLAYERS - MIN_PLAYERS) as i32) as u8) + MIN_PLAYERS
    }

    /// Minutes named by the cursor (TimerDuration menu).
    pub fn timer_minutes(&self) -> u8 {
        self.value
            .clamp(MIN_TIMER_MINUTES as i32, MAX_TIMER_MINUTES as i32) as u8
    }

    /// Binary choice (PlayerMode / GameMode): option 1 selected.
    pub fn second_option(&self) -> bool {
        self.value == 1
    }
}

/// Wrap a raw cursor value into `menu`'s option range.
pub fn wrap(menu: MenuState, raw: i32) -> i32 {
    match menu {
        MenuState::TimerDuration => {
            let min = MIN_TIMER_MINUTES as i32;
            let span = MAX_TIMER_MINUTES as i32 - min + 1;
            (raw.max(min) - min) % span + min
        }
        _ => match menu.option_count() {
            Some(count) => raw.max(0) % count,
            None => 0,
        },
    }
}
