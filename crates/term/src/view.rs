//! ConsoleView: paints the LCD and its surroundings into a framebuffer.
//!
//! This module is pure (no I/O).

use crate::fb::{CellStyle, FrameBuffer, Rgb};
use crate::lcd::CharGrid;
use crate::types::{DISPLAY_COLS, DISPLAY_ROWS};

const HELP: &str = "<-/-> turn   Enter press   q quit";
const PAD_X: u16 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

/// Bus and menu status shown under the panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub link: String,
    pub menu: &'static str,
    pub phase: &'static str,
    pub faulted: usize,
}

impl StatusLine {
    fn text(&self) -> String {
        format!(
            "bus {} | menu {} | game {} | faults {}",
            self.link, self.menu, self.phase, self.faulted
        )
    }
}

/// Remembers what the last frame showed so unchanged frames can be skipped.
#[derive(Debug, Default)]
pub struct RedrawTracker {
    last: Option<(u64, StatusLine, bool, Viewport)>,
}

impl RedrawTracker {
    /// Whether anything shown differs from the previous call. Records the new state.
    pub fn changed(
        &mut self,
        lcd: &CharGrid,
        status: &StatusLine,
        buzzing: bool,
        viewport: Viewport,
    ) -> bool {
        let key = (lcd.revision(), status.clone(), buzzing, viewport);
        if self.last.as_ref() == Some(&key) {
            return false;
        }
        self.last = Some(key);
        true
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ConsoleView {
    lcd: CellStyle,
    bezel: CellStyle,
    flash: CellStyle,
    text: CellStyle,
}

impl Default for ConsoleView {
    fn default() -> Self {
        Self {
            lcd: CellStyle {
                bold: true,
                ..CellStyle::plain(Rgb::new(20, 40, 20), Rgb::new(120, 200, 90))
            },
            bezel: CellStyle::plain(Rgb::new(170, 170, 180), Rgb::new(0, 0, 0)),
            flash: CellStyle {
                bold: true,
                ..CellStyle::plain(Rgb::new(255, 210, 60), Rgb::new(0, 0, 0))
            },
            text: CellStyle {
                dim: true,
                ..CellStyle::default()
            },
        }
    }
}

impl ConsoleView {
    /// Render into an existing framebuffer, resizing it to the viewport.
    pub fn render_into(
        &self,
        lcd: &CharGrid,
        status: &StatusLine,
        buzzing: bool,
        viewport: Viewport,
        fb: &mut FrameBuffer,
    ) {
        fb.resize(viewport.width, viewport.height);
        fb.clear(CellStyle::default().into_cell(' '));

        let frame_w = DISPLAY_COLS as u16 + 2 * PAD_X + 2;
        let frame_h = DISPLAY_ROWS as u16 + 2;
        let block_h = frame_h + 3;
        let x = viewport.width.saturating_sub(frame_w) / 2;
        let y = viewport.height.saturating_sub(block_h) / 2;

        let bezel = if buzzing { self.flash } else { self.bezel };
        draw_border(fb, x, y, frame_w, frame_h, bezel);
        fb.put_str(x + 2, y, " TETRIS ", bezel);

        fb.fill_rect(
            x + 1,
            y + 1,
            frame_w - 2,
            DISPLAY_ROWS as u16,
            ' ',
            self.lcd,
        );
        for row in 0..DISPLAY_ROWS {
            fb.put_str(x + 1 + PAD_X, y + 1 + row as u16, &lcd.row(row as usize), self.lcd);
        }

        put_centered(fb, y + frame_h + 1, HELP, self.text);
        put_centered(fb, y + frame_h + 2, &status.text(), self.text);
    }

    pub fn render(
        &self,
        lcd: &CharGrid,
        status: &StatusLine,
        buzzing: bool,
        viewport: Viewport,
    ) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into(lcd, status, buzzing, viewport, &mut fb);
        fb
    }
}

fn put_centered(fb: &mut FrameBuffer, y: u16, text: &str, style: CellStyle) {
    let w = text.chars().count() as u16;
    let x = fb.width().saturating_sub(w) / 2;
    fb.put_str(x, y, text, style);
}

fn draw_border(fb: &mut FrameBuffer, x: u16, y: u16, w: u16, h: u16, style: CellStyle) {
    if w < 2 || h < 2 {
        return;
    }
    fb.set(x, y, style.into_cell('┌'));
    fb.set(x + w - 1, y, style.into_cell('┐'));
    fb.set(x, y + h - 1, style.into_cell('└'));
    fb.set(x + w - 1, y + h - 1, style.into_cell('┘'));
    for dx in 1..w - 1 {
        fb.set(x + dx, y, style.into_cell('─'));
        fb.set(x + dx, y + h - 1, style.into_cell('─'));
    }
    for dy in 1..h - 1 {
        fb.set(x, y + dy, style.into_cell('│'));
        fb.set(x + w - 1, y + dy, style.into_cell('│'));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Display;

    fn status() -> StatusLine {
        StatusLine {
            link: "sim".to_string(),
            menu: "player_mode",
            phase: "not_started",
            faulted: 0,
        }
    }

    #[test]
    fn lcd_rows_appear_inside_bezel() {
        let mut lcd = CharGrid::new();
        lcd.write_at(0, 0, "=== Tetris ===");
        lcd.write_at(0, 1, "Press Button");

        let fb = ConsoleView::default().render(&lcd, &status(), false, Viewport::new(60, 12));
        let rows: Vec<String> = (0..fb.height()).map(|y| fb.row_text(y)).collect();
        assert!(rows.iter().any(|r| r.contains("│  === Tetris ===    │")));
        assert!(rows.iter().any(|r| r.contains("Press Button")));
        assert!(rows.iter().any(|r| r.contains("menu player_mode")));
    }

    #[test]
    fn buzzer_flashes_bezel() {
        let lcd = CharGrid::new();
        let view = ConsoleView::default();
        let quiet = view.render(&lcd, &status(), false, Viewport::new(40, 10));
        let loud = view.render(&lcd, &status(), true, Viewport::new(40, 10));
        assert_ne!(quiet, loud);

        let corner = (0..10)
            .find_map(|y| {
                (0..40)
                    .find(|&x| loud.get(x, y).map(|c| c.ch) == Some('┌'))
                    .map(|x| (x, y))
            })
            .unwrap();
        assert!(loud.get(corner.0, corner.1).unwrap().style.bold);
    }

    #[test]
    fn tiny_viewport_does_not_panic() {
        let lcd = CharGrid::new();
        let fb = ConsoleView::default().render(&lcd, &status(), false, Viewport::new(5, 2));
        assert_eq!(fb.width(), 5);
    }

    #[test]
    fn redraw_only_when_something_shown_changes() {
        let mut lcd = CharGrid::new();
        let mut tracker = RedrawTracker::default();
        let vp = Viewport::new(40, 10);

        assert!(tracker.changed(&lcd, &status(), false, vp));
        assert!(!tracker.changed(&lcd, &status(), false, vp));

        lcd.write_at(0, 1, "> Casual");
        assert!(tracker.changed(&lcd, &status(), false, vp));
        assert!(tracker.changed(&lcd, &status(), true, vp));
        assert!(tracker.changed(&lcd, &status(), true, Viewport::new(41, 10)));

        let faulted = StatusLine {
            faulted: 1,
            ..status()
        };
        assert!(tracker.changed(&lcd, &faulted, true, Viewport::new(41, 10)));

        tracker.reset();
        assert!(tracker.changed(&lcd, &faulted, true, Viewport::new(41, 10)));
    }
}
