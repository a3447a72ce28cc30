//! Daily diary session timer
//!
//! Enforces a daily diary usage limit of one to thirty minutes: a countdown
//! that warns at five minutes left, force-closes the diary at zero and keeps
//! diary input locked for the rest of the calendar day.

pub mod commands;
pub mod error;
pub mod journal;
pub mod platform;
pub mod session;
pub mod settings;

pub use error::SessionError;
