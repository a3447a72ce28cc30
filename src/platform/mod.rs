/// Common cross-platform utilities
pub mod common;

/// Desktop notifications (notify-send / osascript)
pub mod notify;

// Re-export common utilities for convenience
pub use common::*;
