use tracing::{info, warn};

use crate::platform::notify::send_system_notification;
use crate::session::budget::format_remaining;
use crate::session::timer::SessionObserver;

/// Terminal and desktop cues for the warning and expiry transitions
#[derive(Debug, Clone)]
pub struct DesktopAlerts {
    notifications: bool,
}

impl DesktopAlerts {
    pub fn new(notifications: bool) -> Self {
        Self { notifications }
    }

    fn notify(&self, title: &str, message: &str) {
        if !self.notifications {
            return;
        }

        if let Err(e) = send_system_notification(title, message) {
            warn!("Failed to send desktop notification: {:#}", e);
        }
    }
}

impl SessionObserver for DesktopAlerts {
    fn on_warning(&mut self, remaining_seconds: u32) {
        let minutes = remaining_seconds.div_ceil(60);
        info!("Showing {} minute warning", minutes);

        // Red flash cue in the terminal
        println!(
            "\x1b[1;41m !! \x1b[0m \x1b[1;31m{} left today. Please finish your entry.\x1b[0m",
            format_remaining(remaining_seconds)
        );

        self.notify(
            "Diary time almost up",
            &format!(
                "You have {} minute{} of diary time left. Please save your entry.",
                minutes,
                if minutes == 1 { "" } else { "s" }
            ),
        );
    }

    fn on_expired(&mut self) {
        info!("Daily diary time used up, closing");
        println!("Time's up for today. See you tomorrow.");

        self.notify(
            "Diary time is up",
            "Your daily diary time has run out. The diary will close now.",
        );
    }
}
