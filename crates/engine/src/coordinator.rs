//! Game session coordinator: start, poll and stop the controllers for one game.
//!
//! Phases: `NotStarted -> Starting -> Running -> Ending -> Finished`.
//!
//! While `Starting`, each [`GameSessionCoordinator::tick`] performs the full
//! start exchange with one controller (start command, bounded ready handshake,
//! sequence batches, end marker). While `Running`, a tick polls every healthy
//! controller at most once per bus poll interval and refreshes the countdown
//! at most once per timer interval. Collection in [`GameSessionCoordinator::finish`]
//! always runs to completion.
//!
//! A controller that fails a transmission, stays silent, or never reports
//! ready within the [`RetryPolicy`] is marked faulted. Faulted controllers are
//! skipped for the rest of the game and contribute no score; the game itself
//! carries on with the others.

use std::collections::{BTreeMap, VecDeque};

use tracing::{debug, info, warn};

use crate::adapter::{sequence_batches, Command, ControllerLink, RetryPolicy, StatusByte};
use crate::core::{Configuration, GameSession, ScoreMap, SessionPhase, SimpleRng};
use crate::ports::Clock;
use crate::types::{controller_addresses, ControllerAddress, BUS_POLL_MS, TIMER_POLL_MS};

/// Why a controller was dropped from the current game.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ControllerFault {
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("no response after {attempts} attempts")]
    NoResponse { attempts: u32 },

    #[error("not ready after {attempts} attempts (last reply {last:?})")]
    NotReady { attempts: u32, last: char },

    #[error("malformed score reply")]
    BadScore,
}

/// Something the menu should react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// Every controller has been started; play is running.
    Started,
    /// Countdown refreshed.
    TimerTick { remaining_ms: u64 },
    /// A controller reported its local game over.
    ControllerFinished(ControllerAddress),
    TimerExpired,
    /// No healthy controller left to poll.
    AllFaulted,
}

impl SessionEvent {
    /// The event moves the session to `Ending`.
    pub fn ends_game(&self) -> bool {
        matches!(
            self,
            SessionEvent::ControllerFinished(_)
                | SessionEvent::TimerExpired
                | SessionEvent::AllFaulted
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinatorSettings {
    pub retry: RetryPolicy,
    pub bus_poll_ms: u64,
    pub timer_poll_ms: u64,
}

impl Default for CoordinatorSettings {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            bus_poll_ms: BUS_POLL_MS,
            timer_poll_ms: TIMER_POLL_MS,
        }
    }
}

pub struct GameSessionCoordinator {
    settings: CoordinatorSettings,
    rng: SimpleRng,
    phase: SessionPhase,
    session: Option<GameSession>,
    pending: VecDeque<ControllerAddress>,
    round_ms: Option<u64>,
    last_bus_poll_ms: Option<u64>,
    last_timer_poll_ms: Option<u64>,
    faults: BTreeMap<ControllerAddress, ControllerFault>,
}

impl GameSessionCoordinator {
    pub fn new(settings: CoordinatorSettings, rng: SimpleRng) -> Self {
        Self {
            settings,
            rng,
            phase: SessionPhase::NotStarted,
            session: None,
            pending: VecDeque::new(),
            round_ms: None,
            last_bus_poll_ms: None,
            last_timer_poll_ms: None,
            faults: BTreeMap::new(),
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn session(&self) -> Option<&GameSession> {
        self.session.as_ref()
    }

    pub fn faults(&self) -> &BTreeMap<ControllerAddress, ControllerFault> {
        &self.faults
    }

    /// Begin a new game: fresh sequence, every controller queued for start.
    pub fn start(&mut self, config: &Configuration, now_ms: u64) {
        let sequence = self.rng.sequence();
        self.session = Some(GameSession::new(sequence, now_ms));
        self.pending = controller_addresses().collect();
        self.round_ms = config.round_duration_ms();
        self.last_bus_poll_ms = None;
        self.last_timer_poll_ms = None;
        self.faults.clear();
        self.phase = SessionPhase::Starting;
        info!(
            mode = config.mode_str(),
            timer_ms = ?self.round_ms,
            controllers = self.pending.len(),
            "starting game"
        );
    }

    /// Perform one bounded slice of protocol work for the current phase.
    pub fn tick(
        &mut self,
        link: &mut dyn ControllerLink,
        clock: &dyn Clock,
    ) -> Option<SessionEvent> {
        match self.phase {
            SessionPhase::Starting => self.start_next(link, clock),
            SessionPhase::Running => {
                let now = clock.now_ms();
                self.poll_ongoing(link, clock, now)
                    .or_else(|| self.poll_timer(now))
            }
            _ => None,
        }
    }

    /// Start the next queued controller. Returns `Started` after the last one.
    pub fn start_next(
        &mut self,
        link: &mut dyn ControllerLink,
        clock: &dyn Clock,
    ) -> Option<SessionEvent> {
        if self.phase != SessionPhase::Starting {
            return None;
        }

        if let Some(addr) = self.pending.pop_front() {
            match self.start_controller(link, clock, addr) {
                Ok(()) => info!(address = %addr, "controller started"),
                Err(fault) => self.mark_faulted(addr, fault),
            }
        }
        if !self.pending.is_empty() {
            return None;
        }

        let now = clock.now_ms();
        if let Some(session) = self.session.as_mut() {
            session.ends_at_ms = self.round_ms.map(|d| now + d);
        }
        self.phase = SessionPhase::Running;
        Some(SessionEvent::Started)
    }

    fn start_controller(
        &mut self,
        link: &mut dyn ControllerLink,
        clock: &dyn Clock,
        addr: ControllerAddress,
    ) -> Result<(), ControllerFault> {
        let Some(sequence) = self.session.as_ref().map(|s| s.sequence) else {
            return Ok(());
        };

        send_command(link, addr, Command::StartGame)?;
        self.await_ready(link, clock, addr)?;

        for batch in sequence_batches(&sequence) {
            link.send(addr, batch)
                .map_err(|e| ControllerFault::Transport(e.to_string()))?;
        }
        send_command(link, addr, Command::EndOfSequence)
    }

    fn await_ready(
        &self,
        link: &mut dyn ControllerLink,
        clock: &dyn Clock,
        addr: ControllerAddress,
    ) -> Result<(), ControllerFault> {
        let attempts = self.settings.retry.attempts();
        let mut last_reply: Option<StatusByte> = None;
        let mut last_error = None;

        for attempt in 1..=attempts {
            match link.request(addr, 1) {
                Ok(bytes) => match bytes.first() {
                    Some(&b) if StatusByte(b).is_ready() => {
                        debug!(address = %addr, attempt, "controller ready");
                        return Ok(());
                    }
                    Some(&b) => last_reply = Some(StatusByte(b)),
                    None => {}
                },
                Err(e) => {
                    debug!(address = %addr, attempt, error = %e, "ready poll failed");
                    last_error = Some(e.to_string());
                }
            }
            if attempt < attempts {
                clock.sleep_ms(self.settings.retry.retry_delay_ms);
            }
        }

        Err(match (last_reply, last_error) {
            (Some(status), _) => ControllerFault::NotReady {
                attempts,
                last: status.display(),
            },
            (None, Some(e)) => ControllerFault::Transport(e),
            (None, None) => ControllerFault::NoResponse { attempts },
        })
    }

    /// Poll every healthy controller once, if the bus poll interval has passed.
    pub fn poll_ongoing(
        &mut self,
        link: &mut dyn ControllerLink,
        clock: &dyn Clock,
        now_ms: u64,
    ) -> Option<SessionEvent> {
        if self.phase != SessionPhase::Running
            || !due(self.last_bus_poll_ms, now_ms, self.settings.bus_poll_ms)
        {
            return None;
        }
        self.last_bus_poll_ms = Some(now_ms);

        for addr in controller_addresses() {
            if self.is_faulted(addr) {
                continue;
            }
            match read_bounded(link, clock, &self.settings.retry, addr, 1) {
                Ok(bytes) => {
                    let status = StatusByte(bytes[0]);
                    debug!(address = %addr, status = %status.display(), "status poll");
                    if !status.is_ongoing() {
                        info!(address = %addr, status = %status.display(), "controller game over");
                        self.phase = SessionPhase::Ending;
                        return Some(SessionEvent::ControllerFinished(addr));
                    }
                }
                Err(fault) => self.mark_faulted(addr, fault),
            }
        }

        if controller_addresses().all(|a| self.is_faulted(a)) {
            warn!("every controller faulted; ending game");
            self.phase = SessionPhase::Ending;
            return Some(SessionEvent::AllFaulted);
        }
        None
    }

    /// Refresh the countdown, if timed and the timer interval has passed.
    pub fn poll_timer(&mut self, now_ms: u64) -> Option<SessionEvent> {
        if self.phase != SessionPhase::Running {
            return None;
        }
        let session = self.session.as_ref()?;
        let remaining_ms = session.remaining_ms(now_ms)?;
        if !due(self.last_timer_poll_ms, now_ms, self.settings.timer_poll_ms) {
            return None;
        }
        self.last_timer_poll_ms = Some(now_ms);

        if session.timer_expired(now_ms) {
            info!("round timer ran out");
            self.phase = SessionPhase::Ending;
            return Some(SessionEvent::TimerExpired);
        }
        Some(SessionEvent::TimerTick { remaining_ms })
    }

    /// Stop every controller and collect final scores.
    ///
    /// Controllers still reporting `o` after the stop contribute no score.
    /// Every controller gets a score reset regardless.
    pub fn finish(&mut self, link: &mut dyn ControllerLink, clock: &dyn Clock) -> ScoreMap {
        if matches!(self.phase, SessionPhase::NotStarted | SessionPhase::Finished) {
            return self.scores();
        }
        self.phase = SessionPhase::Ending;
        self.pending.clear();

        info!("sending stop game command");
        for addr in controller_addresses() {
            if let Err(fault) = send_command(link, addr, Command::StopGame) {
                self.mark_faulted(addr, fault);
            }
        }

        info!("collecting scores");
        for addr in controller_addresses() {
            if !self.is_faulted(addr) {
                match self.collect_score(link, clock, addr) {
                    Ok(Some(score)) => {
                        info!(address = %addr, score, "received score");
                        if let Some(session) = self.session.as_mut() {
                            session.scores.insert(addr, score);
                        }
                    }
                    Ok(None) => debug!(address = %addr, "controller still ongoing; no score"),
                    Err(fault) => self.mark_faulted(addr, fault),
                }
            }

            if let Err(fault) = send_command(link, addr, Command::ResetScore) {
                warn!(address = %addr, error = %fault, "score reset failed");
            }
        }

        self.phase = SessionPhase::Finished;
        self.scores()
    }

    fn collect_score(
        &self,
        link: &mut dyn ControllerLink,
        clock: &dyn Clock,
        addr: ControllerAddress,
    ) -> Result<Option<u16>, ControllerFault> {
        let status = read_bounded(link, clock, &self.settings.retry, addr, 1)?;
        if StatusByte(status[0]).is_ongoing() {
            return Ok(None);
        }
        let bytes = read_bounded(link, clock, &self.settings.retry, addr, 2)?;
        crate::adapter::decode_score(&bytes[..2])
            .map(Some)
            .ok_or(ControllerFault::BadScore)
    }

    fn scores(&self) -> ScoreMap {
        self.session
            .as_ref()
            .map(|s| s.scores.clone())
            .unwrap_or_default()
    }

    fn is_faulted(&self, addr: ControllerAddress) -> bool {
        self.faults.contains_key(&addr)
    }

    fn mark_faulted(&mut self, addr: ControllerAddress, fault: ControllerFault) {
        warn!(address = %addr, error = %fault, "controller faulted");
        if let Some(session) = self.session.as_mut() {
            session.faulted.insert(addr);
        }
        self.faults.insert(addr, fault);
    }
}

fn due(last: Option<u64>, now_ms: u64, interval_ms: u64) -> bool {
    last.map_or(true, |t| now_ms.saturating_sub(t) > interval_ms)
}

fn send_command(
    link: &mut dyn ControllerLink,
    addr: ControllerAddress,
    cmd: Command,
) -> Result<(), ControllerFault> {
    link.send(addr, &[cmd.byte()]).map_err(|e| {
        debug!(address = %addr, command = cmd.as_str(), error = %e, "send failed");
        ControllerFault::Transport(e.to_string())
    })
}

/// Request `count` bytes, retrying while the controller has nothing ready.
///
/// The returned vector always holds at least `count` bytes.
fn read_bounded(
    link: &mut dyn ControllerLink,
    clock: &dyn Clock,
    retry: &RetryPolicy,
    addr: ControllerAddress,
    count: usize,
) -> Result<Vec<u8>, ControllerFault> {
    let attempts = retry.attempts();
    let mut last_error = None;
    for attempt in 1..=attempts {
        match link.request(addr, count) {
            Ok(bytes) if bytes.len() >= count => return Ok(bytes),
            Ok(_) => {}
            Err(e) => last_error = Some(e.to_string()),
        }
        if attempt < attempts {
            clock.sleep_ms(retry.retry_delay_ms);
        }
    }
    Err(match last_error {
        Some(e) => ControllerFault::Transport(e),
        None => ControllerFault::NoResponse { attempts },
    })
}
