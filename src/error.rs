use crate::session::budget::{MAX_LIMIT_SECONDS, MIN_LIMIT_SECONDS, SessionPhase};

/// Errors raised by the session timer and its collaborators
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SessionError {
    /// Configured daily limit is outside the allowed range
    #[error(
        "Invalid session limit: {seconds} seconds (must be between {} and {} seconds)",
        MIN_LIMIT_SECONDS,
        MAX_LIMIT_SECONDS
    )]
    InvalidLimit { seconds: u32 },

    /// Diary input was attempted while the session does not accept it
    #[error("Diary input is locked while the session is {phase}")]
    InputLocked { phase: SessionPhase },

    /// Diary input was attempted while the window is in the background
    #[error("Paused. Type :resume to continue.")]
    InputPaused,
}
