use anyhow::{Context, Result};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "WELLBEING_TIMER_DATA_DIR";

/// Atomically write content to a file
///
/// This function writes to a temporary file in the same directory,
/// syncs to disk, then renames to the target path. A crash mid-write
/// leaves the previous file intact.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_directory_exists(parent)?;
    }

    let temp_path = path.with_extension("tmp");

    {
        let mut file = File::create(&temp_path).with_context(|| {
            format!("Failed to create temporary file: {}", temp_path.display())
        })?;

        file.write_all(content)
            .context("Failed to write to temporary file")?;

        file.sync_all().context("Failed to sync file to disk")?;
    }

    std::fs::rename(&temp_path, path).with_context(|| {
        format!(
            "Failed to rename {} to {}",
            temp_path.display(),
            path.display()
        )
    })?;

    Ok(())
}

/// Ensure a directory exists, creating it and all parents if needed
pub fn ensure_directory_exists(path: &Path) -> Result<()> {
    if !path.as_os_str().is_empty() && !path.exists() {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory: {}", path.display()))?;
    }

    Ok(())
}

/// Per-user data directory holding settings, the session budget and the journal
pub fn default_data_dir() -> Result<PathBuf> {
    if let Some(dirs) = directories::ProjectDirs::from("", "", "wellbeing-timer") {
        return Ok(dirs.data_local_dir().to_path_buf());
    }

    anyhow::bail!("Could not determine data directory; pass --data-dir or set {}", DATA_DIR_ENV)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_atomic_write() {
        let temp_dir = tempdir().unwrap();
        let test_file = temp_dir.path().join("session-budget.json");

        atomic_write(&test_file, b"{}").unwrap();

        assert_eq!(std::fs::read(&test_file).unwrap(), b"{}");
        assert!(!test_file.with_extension("tmp").exists());
    }

    #[test]
    fn test_atomic_write_replaces_existing() {
        let temp_dir = tempdir().unwrap();
        let test_file = temp_dir.path().join("settings.toml");

        atomic_write(&test_file, b"limit_seconds = 900\n").unwrap();
        atomic_write(&test_file, b"limit_seconds = 600\n").unwrap();

        assert_eq!(
            std::fs::read_to_string(&test_file).unwrap(),
            "limit_seconds = 600\n"
        );
    }

    #[test]
    fn test_atomic_write_nested_path() {
        let temp_dir = tempdir().unwrap();
        let test_file = temp_dir.path().join("nested").join("path").join("draft.txt");

        atomic_write(&test_file, b"nested content").unwrap();

        assert_eq!(std::fs::read(&test_file).unwrap(), b"nested content");
    }

    #[test]
    fn test_ensure_directory_exists_idempotent() {
        let temp_dir = tempdir().unwrap();
        let test_dir = temp_dir.path().join("idempotent_test");

        ensure_directory_exists(&test_dir).unwrap();
        assert!(test_dir.is_dir());

        ensure_directory_exists(&test_dir).unwrap();
        assert!(test_dir.is_dir());
    }
}
