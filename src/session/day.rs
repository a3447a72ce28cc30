use chrono::{Local, NaiveDate};
use std::cell::Cell;

/// How today's date relates to the date key of a stored budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayChange {
    SameDay,
    /// Calendar moved forward; a fresh budget is due
    Rollover,
    /// System date moved backward; treated as the same day
    ClockBackward,
}

impl DayChange {
    pub fn between(stored: NaiveDate, today: NaiveDate) -> Self {
        if today > stored {
            Self::Rollover
        } else if today < stored {
            Self::ClockBackward
        } else {
            Self::SameDay
        }
    }

    /// Whether a fresh budget should be granted
    pub fn is_rollover(self) -> bool {
        self == Self::Rollover
    }
}

/// Source of the current calendar day, so tests can pin the date
pub trait DayClock {
    fn today(&self) -> NaiveDate;
}

/// Local calendar date from the system clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemDayClock;

impl DayClock for SystemDayClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Settable clock for tests and simulations
#[derive(Debug, Clone)]
pub struct FixedDayClock {
    today: Cell<NaiveDate>,
}

impl FixedDayClock {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today: Cell::new(today),
        }
    }

    pub fn set(&self, today: NaiveDate) {
        self.today.set(today);
    }
}

impl DayClock for FixedDayClock {
    fn today(&self) -> NaiveDate {
        self.today.get()
    }
}
