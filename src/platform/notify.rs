use anyhow::Result;

/// Send a desktop notification (platform-specific)
pub fn send_system_notification(title: &str, message: &str) -> Result<()> {
    #[cfg(target_os = "linux")]
    {
        use std::process::Command;
        Command::new("notify-send")
            .arg(title)
            .arg(message)
            .arg("--urgency=critical")
            .arg("--icon=dialog-warning")
            .output()?;
    }

    #[cfg(target_os = "macos")]
    {
        use std::process::Command;
        let script = format!(
            "display notification \"{}\" with title \"{}\" sound name \"Glass\"",
            message.replace('"', "\\\""),
            title.replace('"', "\\\"")
        );
        Command::new("osascript").arg("-e").arg(&script).output()?;
    }

    #[cfg(not(any(target_os = "linux", target_os = "macos")))]
    {
        tracing::warn!("Notification: {} - {}", title, message);
    }

    Ok(())
}
