use chrono::NaiveDate;
use tracing::{debug, info};

use crate::error::SessionError;
use crate::session::budget::{self, SessionBudget, SessionEvent, SessionPhase};

/// Receiver of the UI side effects of the state machine
pub trait SessionObserver {
    /// Remaining time crossed the warning threshold (color-flash cue)
    fn on_warning(&mut self, remaining_seconds: u32);

    /// Budget is exhausted (forced close)
    fn on_expired(&mut self);
}

/// Records events instead of acting on them
impl SessionObserver for Vec<SessionEvent> {
    fn on_warning(&mut self, remaining_seconds: u32) {
        self.push(SessionEvent::Warning { remaining_seconds });
    }

    fn on_expired(&mut self) {
        self.push(SessionEvent::Expired);
    }
}

impl<O: SessionObserver + ?Sized> SessionObserver for &mut O {
    fn on_warning(&mut self, remaining_seconds: u32) {
        (**self).on_warning(remaining_seconds);
    }

    fn on_expired(&mut self) {
        (**self).on_expired();
    }
}

/// Today's session: the current budget plus the observer its events go to
///
/// The budget is an owned value; callers persist it themselves after
/// [`SessionTimer::tick`] or [`SessionTimer::start_session`].
pub struct SessionTimer<O> {
    budget: SessionBudget,
    observer: O,
}

impl<O: SessionObserver> SessionTimer<O> {
    /// Open the session for `current_date` from the stored record
    pub fn start_session(
        stored: Option<&SessionBudget>,
        current_date: NaiveDate,
        configured_limit: u32,
        observer: O,
    ) -> Result<Self, SessionError> {
        let budget = budget::start_session(stored, current_date, configured_limit)?;

        info!(
            "Session opened for {}: {} ({}s of {}s remaining)",
            budget.date_key, budget.phase, budget.remaining_seconds, budget.limit_seconds
        );

        Ok(Self { budget, observer })
    }

    /// Consume elapsed foreground time and report any transition
    pub fn tick(&mut self, elapsed_seconds: u32) -> &SessionBudget {
        let transition = self.budget.advance(elapsed_seconds);

        if transition.budget.phase != self.budget.phase {
            debug!(
                "Session phase {} -> {} ({}s remaining)",
                self.budget.phase, transition.budget.phase, transition.budget.remaining_seconds
            );
        }

        self.budget = transition.budget;

        for event in transition.events {
            match event {
                SessionEvent::Warning { remaining_seconds } => {
                    info!("Session warning: {}s remaining", remaining_seconds);
                    self.observer.on_warning(remaining_seconds);
                }
                SessionEvent::Expired => {
                    info!("Session expired for {}", self.budget.date_key);
                    self.observer.on_expired();
                }
            }
        }

        &self.budget
    }

    pub fn can_accept_input(&self) -> bool {
        self.budget.can_accept_input()
    }

    pub fn is_app_usable(&self) -> bool {
        self.budget.is_app_usable()
    }

    pub fn phase(&self) -> SessionPhase {
        self.budget.phase
    }

    pub fn budget(&self) -> &SessionBudget {
        &self.budget
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn into_budget(self) -> SessionBudget {
        self.budget
    }
}
