/// Daily diary session time limit
///
/// This module provides:
/// - The session budget state machine (fresh, running, warning, expired, locked)
/// - Day boundary detection, including backward clock moves
/// - Persistence of the budget and of unsaved drafts
/// - The input gate for the diary text field
/// - The cooperative tick driver and the UI alert observer

pub mod alerts;
pub mod budget;
pub mod day;
pub mod driver;
pub mod gate;
pub mod store;
pub mod timer;

pub use alerts::DesktopAlerts;
pub use budget::{SessionBudget, SessionEvent, SessionPhase, Transition, start_session};
pub use day::{DayChange, DayClock, FixedDayClock, SystemDayClock};
pub use driver::{DriverCommand, DriverOutcome, SessionDriver};
pub use gate::InputGate;
pub use store::{BudgetStore, DraftStore};
pub use timer::{SessionObserver, SessionTimer};
