//! One console: the menu machine wired to its link, display, clock and buzzer.

use tracing::warn;

use crate::adapter::ControllerLink;
use crate::config::ConsoleConfig;
use crate::core::SimpleRng;
use crate::journal::{MatchRecord, ResultJournal};
use crate::menu::{Io, MenuStateMachine, RoundReport};
use crate::ports::{Clock, Display, Feedback, Silent};
use crate::types::InputSample;

pub struct Console<L, D, C> {
    menu: MenuStateMachine,
    link: L,
    display: D,
    clock: C,
    feedback: Box<dyn Feedback>,
    journal: Option<ResultJournal>,
}

impl<L: ControllerLink, D: Display, C: Clock> Console<L, D, C> {
    pub fn new(config: &ConsoleConfig, link: L, display: D, clock: C) -> Self {
        let rng = match config.seed {
            Some(seed) => SimpleRng::new(seed),
            None => SimpleRng::from_time(),
        };
        Self {
            menu: MenuStateMachine::new(config.coordinator_settings(), rng),
            link,
            display,
            clock,
            feedback: Box::new(Silent),
            journal: None,
        }
    }

    pub fn with_feedback(mut self, feedback: impl Feedback + 'static) -> Self {
        self.feedback = Box::new(feedback);
        self
    }

    pub fn with_journal(mut self, journal: ResultJournal) -> Self {
        self.journal = Some(journal);
        self
    }

    pub fn boot(&mut self) {
        self.menu.boot(&mut self.display);
    }

    /// Run one loop iteration with an input sample.
    pub fn step(&mut self, input: InputSample) -> Option<RoundReport> {
        if input.pressed {
            self.feedback.pulse();
        }

        let mut io = Io {
            link: &mut self.link,
            display: &mut self.display,
            clock: &self.clock,
        };
        let report = self.menu.step(input, &mut io)?;

        if let Some(journal) = self.journal.as_mut() {
            if let Err(e) = journal.append(&MatchRecord::from(&report)) {
                warn!(error = %e, "failed to append match record");
            }
        }
        Some(report)
    }

    pub fn menu(&self) -> &MenuStateMachine {
        &self.menu
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}
