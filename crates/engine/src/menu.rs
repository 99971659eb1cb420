//! Menu state machine: the top-level orchestrator.
//!
//! Owns the configuration, the selection cursor, the tournament bracket and the
//! session coordinator. Each [`MenuStateMachine::step`] consumes one input
//! sample and performs at most one menu transition or one bounded slice of
//! controller I/O.
//!
//! Points where the console waits for the player (welcome screen, round start,
//! winner and champion screens) are gates: the machine keeps its state and only
//! the next button edge releases it.

use tracing::{debug, info};

use crate::adapter::ControllerLink;
use crate::coordinator::{CoordinatorSettings, GameSessionCoordinator, SessionEvent};
use crate::core::{
    casual_outcome, format_remaining, head_to_head_scores, Configuration, MatchPair, Pairing,
    ScoreMap, SelectionCursor, SimpleRng, TournamentBracket, Verdict,
};
use crate::ports::{Clock, Display};
use crate::types::{ControllerAddress, InputSample, MenuState, DISPLAY_COLS};

const SELECTION_COL: u8 = 2;
const TIMER_COL: u8 = 11;
const DOTS_COL: u8 = 12;
const DOT_FRAMES: usize = 4;
const DOT_DELAY_MS: u64 = 250;

/// Acknowledgement the machine is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    Welcome,
    RoundStart,
    Winner,
    Champion,
}

/// Collaborators borrowed for one step.
pub struct Io<'a> {
    pub link: &'a mut dyn ControllerLink,
    pub display: &'a mut dyn Display,
    pub clock: &'a dyn Clock,
}

/// Result of one resolved game, produced once per round resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundReport {
    pub competitive: bool,
    pub timer_minutes: Option<u8>,
    /// Bracket round, competitive only.
    pub round: Option<u8>,
    pub match_index: Option<u8>,
    pub pair: Option<(u8, u8)>,
    pub scores: ScoreMap,
    pub faulted: Vec<ControllerAddress>,
    /// Text shown after "Winner: ".
    pub winner: String,
}

pub struct MenuStateMachine {
    state: MenuState,
    gate: Option<Gate>,
    config: Configuration,
    cursor: SelectionCursor,
    bracket: TournamentBracket,
    coordinator: GameSessionCoordinator,
}

impl MenuStateMachine {
    pub fn new(settings: CoordinatorSettings, rng: SimpleRng) -> Self {
        Self {
            state: MenuState::PlayerMode,
            gate: None,
            config: Configuration::default(),
            cursor: SelectionCursor::new(MenuState::PlayerMode),
            bracket: TournamentBracket::default(),
            coordinator: GameSessionCoordinator::new(settings, rng),
        }
    }

    pub fn state(&self) -> MenuState {
        self.state
    }

    pub fn gate(&self) -> Option<Gate> {
        self.gate
    }

    pub fn configuration(&self) -> &Configuration {
        &self.config
    }

    pub fn cursor(&self) -> &SelectionCursor {
        &self.cursor
    }

    pub fn bracket(&self) -> &TournamentBracket {
        &self.bracket
    }

    pub fn coordinator(&self) -> &GameSessionCoordinator {
        &self.coordinator
    }

    /// Show the welcome screen and wait for the first press.
    pub fn boot(&mut self, display: &mut dyn Display) {
        display.clear();
        display.write_at(0, 0, "=== Tetris ===");
        display.write_at(0, 1, "Press Button");
        self.gate = Some(Gate::Welcome);
    }

    pub fn step(&mut self, input: InputSample, io: &mut Io<'_>) -> Option<RoundReport> {
        if let Some(gate) = self.gate {
            if input.pressed {
                self.gate = None;
                self.release(gate, io);
            }
            return None;
        }

        match self.state {
            MenuState::PlayerMode
            | MenuState::GameMode
            | MenuState::PlayerCount
            | MenuState::TimerDuration => {
                if input.delta != 0 {
                    self.cursor.rotate(input.delta);
                    self.draw_selection(io.display);
                }
                if input.pressed {
                    self.confirm(io);
                }
                None
            }
            MenuState::InGame => {
                if let Some(event) = self.coordinator.tick(io.link, io.clock) {
                    self.on_session_event(event, io);
                }
                None
            }
            MenuState::RoundResolution => Some(self.resolve(io)),
        }
    }

    fn release(&mut self, gate: Gate, io: &mut Io<'_>) {
        debug!(?gate, "gate released");
        match gate {
            Gate::Welcome => self.move_menu(MenuState::PlayerMode, io.display),
            Gate::RoundStart => self.launch_session(io),
            Gate::Winner if self.config.competitive => {
                if self.bracket.is_terminal() {
                    self.show_champion(io.display);
                } else {
                    self.start_session(io);
                }
            }
            Gate::Winner | Gate::Champion => {
                self.config.reset();
                self.move_menu(MenuState::PlayerMode, io.display);
            }
        }
    }

    fn confirm(&mut self, io: &mut Io<'_>) {
        match self.state {
            MenuState::PlayerMode => {
                self.config.competitive = self.cursor.second_option();
                info!(mode = self.config.mode_str(), "player mode selected");
                self.move_menu(MenuState::GameMode, io.display);
            }
            MenuState::GameMode => {
                self.config.timer_mode = self.cursor.second_option();
                info!(timer_mode = self.config.timer_mode, "game mode selected");
                if self.config.competitive {
                    self.move_menu(MenuState::PlayerCount, io.display);
                } else if self.config.timer_mode {
                    self.move_menu(MenuState::TimerDuration, io.display);
                } else {
                    self.start_session(io);
                }
            }
            MenuState::PlayerCount => {
                let n = self.cursor.player_count();
                self.config.player_count = Some(n);
                self.bracket.initialize(n);
                info!(players = n, "player count selected");
                if self.config.timer_mode && self.config.timer_minutes.is_none() {
                    self.move_menu(MenuState::TimerDuration, io.display);
                } else {
                    self.start_session(io);
                }
            }
            MenuState::TimerDuration => {
                let minutes = self.cursor.timer_minutes();
                self.config.timer_minutes = Some(minutes);
                info!(minutes, "round time selected");
                if self.config.competitive && self.config.player_count.is_none() {
                    self.move_menu(MenuState::PlayerCount, io.display);
                } else {
                    self.start_session(io);
                }
            }
            MenuState::InGame | MenuState::RoundResolution => {}
        }
    }

    fn move_menu(&mut self, menu: MenuState, display: &mut dyn Display) {
        self.state = menu;
        self.cursor.enter(menu);
        let header = match menu {
            MenuState::PlayerMode => "Player Mode:",
            MenuState::GameMode => "Gamemode:",
            MenuState::PlayerCount => "Player amount:",
            MenuState::TimerDuration => "Time per round:",
            MenuState::InGame | MenuState::RoundResolution => return,
        };
        display.clear();
        display.write_at(0, 0, header);
        display.write_at(0, 1, "> ");
        self.draw_selection(display);
    }

    fn draw_selection(&self, display: &mut dyn Display) {
        let text = match self.state {
            MenuState::PlayerMode if self.cursor.second_option() => "Competitive".to_string(),
            MenuState::PlayerMode => "Casual".to_string(),
            MenuState::GameMode if self.cursor.second_option() => "Timer".to_string(),
            MenuState::GameMode => "Survival".to_string(),
            MenuState::PlayerCount => self.cursor.player_count().to_string(),
            MenuState::TimerDuration => match self.cursor.timer_minutes() {
                1 => "1 minute".to_string(),
                m => format!("{} minutes", m),
            },
            MenuState::InGame | MenuState::RoundResolution => return,
        };
        let width = (DISPLAY_COLS - SELECTION_COL) as usize;
        display.write_at(SELECTION_COL, 1, &format!("{:<width$}", text, width = width));
    }

    /// Start the next game, consulting the bracket in competitive mode.
    fn start_session(&mut self, io: &mut Io<'_>) {
        if !self.config.competitive {
            self.launch_session(io);
            return;
        }

        match self.bracket.next_match() {
            Pairing::Match(pair) => {
                info!(
                    round = self.bracket.round(),
                    match_index = self.bracket.match_index(),
                    p1 = pair.player_one,
                    p2 = pair.player_two,
                    "next match"
                );
                self.launch_session(io);
            }
            Pairing::NewRound { round, pair } => {
                info!(round, p1 = pair.player_one, p2 = pair.player_two, "new round");
                self.state = MenuState::RoundResolution;
                io.display.clear();
                io.display.write_at(0, 0, &format!("Round {}", round));
                io.display.write_at(0, 1, "Press Button");
                self.gate = Some(Gate::RoundStart);
            }
            Pairing::Complete { .. } => self.show_champion(io.display),
        }
    }

    fn launch_session(&mut self, io: &mut Io<'_>) {
        io.display.clear();
        io.display.write_at(0, 0, "Starting game...");
        self.coordinator.start(&self.config, io.clock.now_ms());
        self.state = MenuState::InGame;
    }

    fn on_session_event(&mut self, event: SessionEvent, io: &mut Io<'_>) {
        match event {
            SessionEvent::Started => self.draw_running(io.display),
            SessionEvent::TimerTick { remaining_ms } => {
                io.display.write_at(TIMER_COL, 1, &format_remaining(remaining_ms));
            }
            SessionEvent::ControllerFinished(_)
            | SessionEvent::TimerExpired
            | SessionEvent::AllFaulted => {
                info!(?event, "game over detected");
                self.state = MenuState::RoundResolution;
            }
        }
    }

    fn draw_running(&self, display: &mut dyn Display) {
        display.clear();
        match self.current_pair() {
            Some(pair) => {
                display.write_at(0, 0, &format!("Player {} vs", pair.player_one));
                display.write_at(0, 1, &format!("Player {}", pair.player_two));
            }
            None => {
                display.write_at(0, 0, "Game started!");
                let row = if self.config.timer_mode {
                    "Time left:"
                } else {
                    "Good luck!"
                };
                display.write_at(0, 1, row);
            }
        }
        if let Some(ms) = self.config.round_duration_ms() {
            display.write_at(TIMER_COL, 1, &format_remaining(ms));
        }
    }

    fn current_pair(&self) -> Option<MatchPair> {
        if self.config.competitive {
            self.bracket.current_match()
        } else {
            None
        }
    }

    /// Collect scores, decide the winner and wait on the winner screen.
    fn resolve(&mut self, io: &mut Io<'_>) -> RoundReport {
        io.display.clear();
        io.display.write_at(0, 0, "Collecting points");
        io.display.write_at(0, 1, "please wait");
        for frame in 0..DOT_FRAMES {
            io.display.write_at(DOTS_COL + frame as u8, 1, ".");
            io.clock.sleep_ms(DOT_DELAY_MS);
        }

        let pair = self.current_pair();
        let scores = self.coordinator.finish(io.link, io.clock);
        let faulted: Vec<ControllerAddress> = self.coordinator.faults().keys().copied().collect();

        let winner = match pair {
            Some(pair) => {
                let (s1, s2) = head_to_head_scores(&scores);
                match self.bracket.record_result(s1, s2) {
                    Some(Verdict::FirstWins) => format!("Player {}", pair.player_one),
                    Some(Verdict::SecondWins) => format!("Player {}", pair.player_two),
                    Some(Verdict::Tie) | None => "Tie".to_string(),
                }
            }
            None => casual_outcome(&scores).label(),
        };
        info!(winner = %winner, alive = self.bracket.alive_count(), "round resolved");

        io.display.clear();
        io.display.write_at(0, 0, &format!("Winner: {}", winner));
        if !faulted.is_empty() {
            let slots: Vec<String> = faulted
                .iter()
                .filter_map(|a| a.slot())
                .map(|s| format!("P{}", s + 1))
                .collect();
            io.display
                .write_at(0, 1, &format!("Faulted: {}", slots.join(",")));
        }
        self.gate = Some(Gate::Winner);

        RoundReport {
            competitive: self.config.competitive,
            timer_minutes: self.config.timer_minutes.filter(|_| self.config.timer_mode),
            round: pair.map(|_| self.bracket.round()),
            match_index: pair.map(|_| self.bracket.match_index()),
            pair: pair.map(|p| (p.player_one, p.player_two)),
            scores,
            faulted,
            winner,
        }
    }

    fn show_champion(&mut self, display: &mut dyn Display) {
        let champion = self.bracket.champion();
        info!(?champion, "tournament over");
        display.clear();
        display.write_at(0, 0, "Tournament over");
        match champion {
            Some(id) => display.write_at(0, 1, &format!("Champion: P {}", id)),
            None => display.write_at(0, 1, "No champion"),
        }
        self.state = MenuState::RoundResolution;
        self.gate = Some(Gate::Champion);
    }
}
