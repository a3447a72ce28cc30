use anyhow::{Context, Result};
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::error::SessionError;
use crate::journal::EntrySink;
use crate::session::budget::{SessionPhase, format_remaining};
use crate::session::gate::InputGate;
use crate::session::store::{BudgetStore, DraftStore};
use crate::session::timer::{SessionObserver, SessionTimer};

/// Cadence of countdown ticks
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

/// A line typed into the diary window
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverCommand {
    /// Diary text
    Text(String),
    Save,
    /// Window lost focus; stop counting
    Pause,
    /// Window regained focus
    Resume,
    Status,
    Quit,
    Unknown(String),
}

impl DriverCommand {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        match trimmed {
            ":save" => Self::Save,
            ":pause" => Self::Pause,
            ":resume" => Self::Resume,
            ":status" => Self::Status,
            ":quit" | ":q" => Self::Quit,
            cmd if cmd.starts_with(':') && !cmd.starts_with("::") => {
                Self::Unknown(cmd.to_string())
            }
            // "::" escapes a literal leading colon
            text => Self::Text(text.strip_prefix(':').unwrap_or(text).to_string()),
        }
    }
}

/// Why the session loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverOutcome {
    /// Budget ran out; the app is force-closed
    Expired,
    /// Opened in lockout; diary input was never offered
    Locked,
    Quit,
    InputClosed,
}

/// Event loop that ticks the session timer while the window is foregrounded
pub struct SessionDriver<O, S> {
    timer: SessionTimer<O>,
    budgets: BudgetStore,
    drafts: DraftStore,
    gate: InputGate,
    sink: S,
    tick_interval: Duration,
    foreground: bool,
    carry: Duration,
    last_tick: Instant,
}

impl<O: SessionObserver, S: EntrySink> SessionDriver<O, S> {
    pub fn new(timer: SessionTimer<O>, budgets: BudgetStore, drafts: DraftStore, sink: S) -> Self {
        let gate = match drafts.load() {
            Some(draft) => {
                info!("Restored unsaved diary draft ({} bytes)", draft.len());
                InputGate::with_draft(draft)
            }
            None => InputGate::new(),
        };

        Self {
            timer,
            budgets,
            drafts,
            gate,
            sink,
            tick_interval: DEFAULT_TICK_INTERVAL,
            foreground: true,
            carry: Duration::ZERO,
            last_tick: Instant::now(),
        }
    }

    pub fn with_tick_interval(mut self, tick_interval: Duration) -> Self {
        self.tick_interval = tick_interval;
        self
    }

    pub fn timer(&self) -> &SessionTimer<O> {
        &self.timer
    }

    pub fn gate(&self) -> &InputGate {
        &self.gate
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn is_foreground(&self) -> bool {
        self.foreground
    }

    /// Drive the session until it expires, the user quits, or input ends
    pub async fn run<R>(&mut self, input: R) -> Result<DriverOutcome>
    where
        R: AsyncBufRead + Unpin,
    {
        self.persist_budget();

        if self.timer.phase() == SessionPhase::Locked {
            info!("Session is locked for {}", self.timer.budget().date_key);
            return Ok(DriverOutcome::Locked);
        }

        let mut lines = input.lines();
        let mut interval = time::interval(self.tick_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.last_tick = Instant::now();

        loop {
            tokio::select! {
                biased;

                _ = interval.tick() => {
                    if self.on_interval_tick() {
                        return Ok(DriverOutcome::Expired);
                    }
                }
                line = lines.next_line() => {
                    match line.context("Failed to read diary input")? {
                        Some(line) => {
                            if let Some(outcome) = self.handle_line(&line) {
                                return Ok(outcome);
                            }
                        }
                        None => {
                            debug!("Diary input closed");
                            self.shutdown();
                            return Ok(DriverOutcome::InputClosed);
                        }
                    }
                }
            }
        }
    }

    /// Measure time since the previous tick and apply it
    pub(crate) fn on_interval_tick(&mut self) -> bool {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_tick);
        self.last_tick = now;

        self.handle_tick(elapsed)
    }

    /// Apply elapsed wall time; returns true once the session has expired
    pub(crate) fn handle_tick(&mut self, elapsed: Duration) -> bool {
        if !self.foreground {
            return false;
        }

        self.carry += elapsed;
        let whole_seconds = self.carry.as_secs();
        self.carry -= Duration::from_secs(whole_seconds);

        let seconds = u32::try_from(whole_seconds).unwrap_or(u32::MAX);
        let phase = self.timer.tick(seconds).phase;
        self.persist_budget();

        if phase == SessionPhase::Expired {
            if self.preserve_draft() {
                println!("Your unsaved draft has been kept for your next session.");
            }
            return true;
        }

        false
    }

    /// Handle one input line; returns an outcome when the loop should stop
    pub(crate) fn handle_line(&mut self, line: &str) -> Option<DriverOutcome> {
        match DriverCommand::parse(line) {
            DriverCommand::Text(text) => {
                if let Err(e) = self.accept_text(&text) {
                    println!("{}", e);
                }
            }
            DriverCommand::Save => self.save_entry(),
            DriverCommand::Pause => {
                self.foreground = false;
                info!("Window in background, countdown paused");
                println!("Paused. Type :resume to continue.");
            }
            DriverCommand::Resume => {
                self.foreground = true;
                self.carry = Duration::ZERO;
                self.last_tick = Instant::now();
                info!("Window in foreground, countdown resumed");
                println!("Resumed.");
            }
            DriverCommand::Status => {
                let budget = self.timer.budget();
                println!(
                    "{} | {} left of {} | {}",
                    budget.phase,
                    format_remaining(budget.remaining_seconds),
                    format_remaining(budget.limit_seconds),
                    if self.gate.has_unsaved() { "unsaved draft" } else { "no draft" }
                );
            }
            DriverCommand::Quit => {
                self.shutdown();
                return Some(DriverOutcome::Quit);
            }
            DriverCommand::Unknown(cmd) => {
                println!("Unknown command {}. Try :save, :pause, :resume, :status or :quit", cmd);
            }
        }

        None
    }

    fn accept_text(&mut self, text: &str) -> Result<(), SessionError> {
        if !self.foreground {
            return Err(SessionError::InputPaused);
        }

        self.gate.accept(self.timer.phase(), text)
    }

    fn save_entry(&mut self) {
        if !self.gate.has_unsaved() {
            println!("Nothing to save yet.");
            return;
        }

        let date = self.timer.budget().date_key;
        match self.sink.save_entry(date, self.gate.draft()) {
            Ok(()) => {
                self.gate.take_draft();
                if let Err(e) = self.drafts.clear() {
                    error!("Failed to clear saved draft: {:#}", e);
                }
                println!("Diary entry saved.");
            }
            Err(e) => println!("Could not save entry: {:#}", e),
        }
    }

    fn shutdown(&mut self) {
        self.preserve_draft();
        self.persist_budget();
    }

    fn persist_budget(&self) {
        if let Err(e) = self.budgets.save(self.timer.budget()) {
            error!("Failed to persist session budget: {:#}", e);
        }
    }

    /// Write the unsaved draft to disk; true when there was one and it was kept
    fn preserve_draft(&self) -> bool {
        if !self.gate.has_unsaved() {
            return false;
        }

        match self.drafts.save(self.gate.draft()) {
            Ok(()) => {
                info!("Kept unsaved draft at {}", self.drafts.path().display());
                true
            }
            Err(e) => {
                error!("Failed to keep unsaved draft: {:#}", e);
                false
            }
        }
    }
}
