use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

use crate::error::SessionError;
use crate::session::day::DayChange;

/// Smallest daily limit the settings page accepts (1 minute)
pub const MIN_LIMIT_SECONDS: u32 = 60;

/// Largest daily limit the settings page accepts (30 minutes)
pub const MAX_LIMIT_SECONDS: u32 = 30 * 60;

/// Remaining time at or below which the warning cue is shown
pub const WARNING_THRESHOLD_SECONDS: u32 = 5 * 60;

/// Phase of the daily session state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    /// New day, full budget, not ticked yet
    Fresh,
    /// Counting down, input allowed
    Running,
    /// Five minutes or less left, input allowed, alert shown
    Warning,
    /// Budget exhausted in this run, app is being closed
    Expired,
    /// Reopened after expiry on the same day
    Locked,
}

impl SessionPhase {
    /// Whether the diary text field may accept input
    pub fn accepts_input(self) -> bool {
        matches!(self, Self::Running | Self::Warning)
    }

    /// Whether the app stays open (login/signup always reachable unless expired)
    pub fn is_app_usable(self) -> bool {
        !matches!(self, Self::Expired)
    }

    /// No further ticks have any effect
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Expired | Self::Locked)
    }

    /// Phase implied by the remaining budget of a session that has started ticking
    pub fn classify(remaining_seconds: u32) -> Self {
        if remaining_seconds == 0 {
            Self::Expired
        } else if remaining_seconds <= WARNING_THRESHOLD_SECONDS {
            Self::Warning
        } else {
            Self::Running
        }
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Fresh => "fresh",
            Self::Running => "running",
            Self::Warning => "warning",
            Self::Expired => "expired",
            Self::Locked => "locked",
        };
        f.write_str(name)
    }
}

/// Side effect the surrounding UI must perform, reported once per transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// Remaining time crossed the warning threshold
    Warning { remaining_seconds: u32 },
    /// Budget reached zero; the app must close
    Expired,
}

/// Usage budget for one calendar day
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SessionBudget {
    pub date_key: NaiveDate,
    pub limit_seconds: u32,
    pub remaining_seconds: u32,
    pub locked: bool,
    pub phase: SessionPhase,
    #[serde(default)]
    pub warning_fired: bool,
}

/// Result of a pure transition: the next budget plus the events it produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub budget: SessionBudget,
    pub events: Vec<SessionEvent>,
}

/// Reject limits outside 1..=30 minutes
pub fn validate_limit(seconds: u32) -> Result<u32, SessionError> {
    if (MIN_LIMIT_SECONDS..=MAX_LIMIT_SECONDS).contains(&seconds) {
        Ok(seconds)
    } else {
        Err(SessionError::InvalidLimit { seconds })
    }
}

/// Format seconds as a MM:SS countdown
pub fn format_remaining(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Open today's session from the stored record (if any) and the configured limit
///
/// A missing record or a later calendar day grants a fresh budget. The same
/// day, or a clock that moved backward, resumes the stored budget with its
/// original limit, so settings changes only apply to the next fresh session.
pub fn start_session(
    stored: Option<&SessionBudget>,
    current_date: NaiveDate,
    configured_limit: u32,
) -> Result<SessionBudget, SessionError> {
    let limit = validate_limit(configured_limit)?;

    let Some(previous) = stored else {
        debug!("No stored session budget, starting fresh for {}", current_date);
        return Ok(SessionBudget::fresh(current_date, limit));
    };

    match DayChange::between(previous.date_key, current_date) {
        DayChange::Rollover => {
            debug!(
                "Day rollover from {} to {}, starting fresh",
                previous.date_key, current_date
            );
            Ok(SessionBudget::fresh(current_date, limit))
        }
        DayChange::SameDay => Ok(previous.reopen()),
        DayChange::ClockBackward => {
            warn!(
                "System date {} is earlier than stored session date {}, keeping stored budget",
                current_date, previous.date_key
            );
            Ok(previous.reopen())
        }
    }
}

impl SessionBudget {
    /// Full budget for a new day
    pub fn fresh(date_key: NaiveDate, limit_seconds: u32) -> Self {
        Self {
            date_key,
            limit_seconds,
            remaining_seconds: limit_seconds,
            locked: false,
            phase: SessionPhase::Fresh,
            warning_fired: false,
        }
    }

    /// Budget as seen by a new app run on the same date key
    pub fn reopen(&self) -> Self {
        let mut next = self.clone();

        if self.locked || self.remaining_seconds == 0 {
            next.locked = true;
            next.remaining_seconds = 0;
            next.phase = SessionPhase::Locked;
        } else if self.phase != SessionPhase::Fresh {
            next.phase = SessionPhase::classify(self.remaining_seconds);
        }

        next
    }

    /// Consume `elapsed_seconds` of the budget
    ///
    /// Skipping straight from RUNNING to EXPIRED in one tick reports only the
    /// expiry; the warning cue is pointless once the app is closing.
    pub fn advance(&self, elapsed_seconds: u32) -> Transition {
        if self.phase.is_terminal() {
            return Transition {
                budget: self.clone(),
                events: Vec::new(),
            };
        }

        let mut next = self.clone();
        let mut events = Vec::new();

        next.remaining_seconds = self.remaining_seconds.saturating_sub(elapsed_seconds);
        next.phase = SessionPhase::classify(next.remaining_seconds);

        match next.phase {
            SessionPhase::Warning if !next.warning_fired => {
                next.warning_fired = true;
                events.push(SessionEvent::Warning {
                    remaining_seconds: next.remaining_seconds,
                });
            }
            SessionPhase::Expired => {
                next.locked = true;
                events.push(SessionEvent::Expired);
            }
            _ => {}
        }

        Transition {
            budget: next,
            events,
        }
    }

    /// Check that a record read from disk could have been produced by this module
    pub fn is_consistent(&self) -> bool {
        validate_limit(self.limit_seconds).is_ok()
            && self.remaining_seconds <= self.limit_seconds
            && self.locked == self.phase.is_terminal()
    }

    pub fn can_accept_input(&self) -> bool {
        self.phase.accepts_input()
    }

    pub fn is_app_usable(&self) -> bool {
        self.phase.is_app_usable()
    }

    pub fn used_seconds(&self) -> u32 {
        self.limit_seconds - self.remaining_seconds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, d).unwrap()
    }

    #[test]
    fn test_validate_limit_bounds() {
        assert_eq!(validate_limit(60), Ok(60));
        assert_eq!(validate_limit(1800), Ok(1800));
        assert_eq!(
            validate_limit(59),
            Err(SessionError::InvalidLimit { seconds: 59 })
        );
        assert_eq!(
            validate_limit(1801),
            Err(SessionError::InvalidLimit { seconds: 1801 })
        );
    }

    #[test]
    fn test_start_session_without_record_is_fresh() {
        let budget = start_session(None, day(16), 900).unwrap();
        assert_eq!(budget.phase, SessionPhase::Fresh);
        assert_eq!(budget.remaining_seconds, 900);
        assert_eq!(budget.date_key, day(16));
        assert!(!budget.locked);
    }

    #[test]
    fn test_start_session_rejects_invalid_limit() {
        let err = start_session(None, day(16), 30).unwrap_err();
        assert_eq!(err, SessionError::InvalidLimit { seconds: 30 });
    }

    #[test]
    fn test_tick_classifies_every_elapsed_value() {
        for limit in [60, 299, 300, 301, 900, 1800] {
            for elapsed in 0..=limit {
                let budget = SessionBudget::fresh(day(16), limit);
                let next = budget.advance(elapsed).budget;
                let remaining = limit - elapsed;

                assert_eq!(next.remaining_seconds, remaining);
                let expected = if remaining == 0 {
                    SessionPhase::Expired
                } else if remaining <= 300 {
                    SessionPhase::Warning
                } else {
                    SessionPhase::Running
                };
                assert_eq!(next.phase, expected, "limit={limit} elapsed={elapsed}");
            }
        }
    }

    #[test]
    fn test_tick_clamps_at_zero() {
        let budget = SessionBudget::fresh(day(16), 120);
        let next = budget.advance(500).budget;
        assert_eq!(next.remaining_seconds, 0);
        assert_eq!(next.phase, SessionPhase::Expired);
        assert!(next.locked);
    }

    #[test]
    fn test_fifteen_minute_scenario() {
        let budget = start_session(None, day(16), 900).unwrap();

        let first = budget.advance(600);
        assert_eq!(first.budget.remaining_seconds, 300);
        assert_eq!(first.budget.phase, SessionPhase::Warning);
        assert_eq!(
            first.events,
            vec![SessionEvent::Warning {
                remaining_seconds: 300
            }]
        );

        let second = first.budget.advance(300);
        assert_eq!(second.budget.remaining_seconds, 0);
        assert_eq!(second.budget.phase, SessionPhase::Expired);
        assert_eq!(second.events, vec![SessionEvent::Expired]);

        let reopened = start_session(Some(&second.budget), day(16), 900).unwrap();
        assert_eq!(reopened.phase, SessionPhase::Locked);
        assert!(!reopened.can_accept_input());
        assert!(reopened.is_app_usable());
    }

    #[test]
    fn test_warning_fires_once() {
        let budget = SessionBudget::fresh(day(16), 900);
        let first = budget.advance(650);
        assert_eq!(first.events.len(), 1);

        let second = first.budget.advance(10);
        assert!(second.events.is_empty());
        assert_eq!(second.budget.phase, SessionPhase::Warning);
    }

    #[test]
    fn test_jump_to_expired_skips_warning() {
        let budget = SessionBudget::fresh(day(16), 900);
        let transition = budget.advance(900);
        assert_eq!(transition.events, vec![SessionEvent::Expired]);
        assert!(!transition.budget.warning_fired);
    }

    #[test]
    fn test_tick_after_expired_is_noop() {
        let expired = SessionBudget::fresh(day(16), 60).advance(60).budget;
        let again = expired.advance(30);
        assert_eq!(again.budget, expired);
        assert!(again.events.is_empty());
    }

    #[test]
    fn test_short_limit_warns_on_first_tick() {
        let budget = SessionBudget::fresh(day(16), 120);
        let transition = budget.advance(0);
        assert_eq!(transition.budget.phase, SessionPhase::Warning);
        assert_eq!(
            transition.events,
            vec![SessionEvent::Warning {
                remaining_seconds: 120
            }]
        );
    }

    #[test]
    fn test_rollover_grants_fresh_budget_even_when_locked() {
        let locked = SessionBudget::fresh(day(16), 900).advance(900).budget.reopen();
        assert_eq!(locked.phase, SessionPhase::Locked);

        let next_day = start_session(Some(&locked), day(17), 600).unwrap();
        assert_eq!(next_day.phase, SessionPhase::Fresh);
        assert_eq!(next_day.remaining_seconds, 600);
        assert_eq!(next_day.limit_seconds, 600);
        assert!(!next_day.locked);
    }

    #[test]
    fn test_same_day_resume_keeps_original_limit() {
        let used = SessionBudget::fresh(day(16), 900).advance(100).budget;
        let resumed = start_session(Some(&used), day(16), 1800).unwrap();
        assert_eq!(resumed.limit_seconds, 900);
        assert_eq!(resumed.remaining_seconds, 800);
        assert_eq!(resumed.phase, SessionPhase::Running);
    }

    #[test]
    fn test_resume_in_warning_window_does_not_refire() {
        let warned = SessionBudget::fresh(day(16), 900).advance(700).budget;
        let resumed = start_session(Some(&warned), day(16), 900).unwrap();
        assert_eq!(resumed.phase, SessionPhase::Warning);
        assert!(resumed.advance(1).events.is_empty());
    }

    #[test]
    fn test_clock_backward_keeps_stored_budget() {
        let used = SessionBudget::fresh(day(16), 900).advance(900).budget;
        let reopened = start_session(Some(&used), day(15), 900).unwrap();
        assert_eq!(reopened.phase, SessionPhase::Locked);
        assert_eq!(reopened.date_key, day(16));
    }

    #[test]
    fn test_unticked_budget_reopens_fresh() {
        let fresh = SessionBudget::fresh(day(16), 900);
        let reopened = start_session(Some(&fresh), day(16), 900).unwrap();
        assert_eq!(reopened.phase, SessionPhase::Fresh);
        assert!(!reopened.can_accept_input());
    }

    #[test]
    fn test_phase_queries() {
        assert!(SessionPhase::Running.accepts_input());
        assert!(SessionPhase::Warning.accepts_input());
        assert!(!SessionPhase::Fresh.accepts_input());
        assert!(!SessionPhase::Expired.accepts_input());
        assert!(!SessionPhase::Locked.accepts_input());

        assert!(!SessionPhase::Expired.is_app_usable());
        assert!(SessionPhase::Locked.is_app_usable());
        assert!(SessionPhase::Fresh.is_app_usable());
    }

    #[test]
    fn test_consistency_check() {
        let mut budget = SessionBudget::fresh(day(16), 900);
        assert!(budget.is_consistent());

        budget.remaining_seconds = 901;
        assert!(!budget.is_consistent());

        let mut locked = SessionBudget::fresh(day(16), 900);
        locked.locked = true;
        assert!(!locked.is_consistent());
    }

    #[test]
    fn test_format_remaining() {
        assert_eq!(format_remaining(1800), "30:00");
        assert_eq!(format_remaining(299), "04:59");
        assert_eq!(format_remaining(0), "00:00");
    }
}
