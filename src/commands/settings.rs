use anyhow::Result;
use std::path::Path;

use crate::commands::utils::format_limit;
use crate::settings::SettingsStore;

/// Print the current settings
pub fn show_settings(data_dir: &Path) -> Result<()> {
    let store = SettingsStore::in_dir(data_dir);
    let settings = store.load();

    println!("Settings file:  {}", store.path().display());
    println!("Daily limit:    {} ({}s)", format_limit(settings.limit_seconds), settings.limit_seconds);
    println!("Notifications:  {}", if settings.notifications { "on" } else { "off" });
    println!("Log level:      {}", settings.logging.level);

    Ok(())
}

/// Change the daily limit; takes effect from the next fresh session
pub fn set_limit(data_dir: &Path, seconds: u32) -> Result<()> {
    let store = SettingsStore::in_dir(data_dir);
    let settings = store.set_limit(seconds)?;

    tracing::info!("Daily limit set to {}s", settings.limit_seconds);
    println!("✓ Daily limit set to {}", format_limit(settings.limit_seconds));
    println!("  Applies from the next new day's session.");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SessionError;
    use tempfile::tempdir;

    #[test]
    fn test_set_limit_rejects_over_thirty_minutes() {
        let dir = tempdir().unwrap();
        set_limit(dir.path(), 900).unwrap();

        let err = set_limit(dir.path(), 1801).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SessionError>(),
            Some(SessionError::InvalidLimit { seconds: 1801 })
        ));
        assert_eq!(SettingsStore::in_dir(dir.path()).load().limit_seconds, 900);
    }
}
