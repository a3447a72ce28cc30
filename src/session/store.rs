use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::platform::common::atomic_write;
use crate::session::budget::SessionBudget;

/// Current budget record version
const BUDGET_VERSION: &str = "1.0";

/// File name of the persisted budget inside the data directory
pub const BUDGET_FILE: &str = "session-budget.json";

/// File name of the unsaved diary draft inside the data directory
pub const DRAFT_FILE: &str = "draft.txt";

/// On-disk form of the session budget
#[derive(Debug, Clone, Deserialize, Serialize)]
struct BudgetRecord {
    version: String,
    budget: SessionBudget,
    checksum: String,
}

/// Persisted SessionBudget, surviving restarts within the same day
#[derive(Debug, Clone)]
pub struct BudgetStore {
    path: PathBuf,
}

impl BudgetStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join(BUDGET_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored budget, treating every kind of damage as "no record"
    pub fn load(&self) -> Option<SessionBudget> {
        match self.try_load() {
            Ok(budget) => budget,
            Err(e) => {
                warn!("Discarding unreadable session budget, starting fresh: {:#}", e);
                None
            }
        }
    }

    /// Load budget from file
    pub fn try_load(&self) -> Result<Option<SessionBudget>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read budget file: {}", self.path.display()))?;

        let record: BudgetRecord = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse budget file: {}", self.path.display()))?;

        if record.version != BUDGET_VERSION {
            anyhow::bail!(
                "Budget file version mismatch (expected {}, got {})",
                BUDGET_VERSION,
                record.version
            );
        }

        let expected = compute_budget_checksum(&record.budget)?;
        if record.checksum != expected {
            anyhow::bail!("Budget file checksum mismatch: {}", self.path.display());
        }

        if !record.budget.is_consistent() {
            anyhow::bail!("Budget file holds an inconsistent record: {:?}", record.budget);
        }

        Ok(Some(record.budget))
    }

    /// Save budget to file
    pub fn save(&self, budget: &SessionBudget) -> Result<()> {
        let record = BudgetRecord {
            version: BUDGET_VERSION.to_string(),
            checksum: compute_budget_checksum(budget)?,
            budget: budget.clone(),
        };

        let content =
            serde_json::to_string_pretty(&record).context("Failed to serialize session budget")?;

        atomic_write(&self.path, content.as_bytes())
            .with_context(|| format!("Failed to write budget file: {}", self.path.display()))?;

        debug!(
            "Saved session budget: {} {}s remaining",
            budget.phase, budget.remaining_seconds
        );
        Ok(())
    }
}

/// Compute SHA-256 hash of the serialized budget
fn compute_budget_checksum(budget: &SessionBudget) -> Result<String> {
    let json = serde_json::to_string(budget).context("Failed to serialize session budget")?;

    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    let result = hasher.finalize();

    Ok(format!("sha256:{}", hex::encode(&result)))
}

mod hex {
    pub fn encode(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

/// Unsaved diary text kept across a forced close
#[derive(Debug, Clone)]
pub struct DraftStore {
    path: PathBuf,
}

impl DraftStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join(DRAFT_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored draft; unreadable drafts are logged and skipped
    pub fn load(&self) -> Option<String> {
        if !self.path.exists() {
            return None;
        }

        match std::fs::read_to_string(&self.path) {
            Ok(text) if !text.is_empty() => Some(text),
            Ok(_) => None,
            Err(e) => {
                warn!("Failed to read draft file {}: {}", self.path.display(), e);
                None
            }
        }
    }

    pub fn save(&self, text: &str) -> Result<()> {
        atomic_write(&self.path, text.as_bytes())
            .with_context(|| format!("Failed to write draft file: {}", self.path.display()))
    }

    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)
                .with_context(|| format!("Failed to delete draft file: {}", self.path.display()))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::budget::SessionPhase;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn make_budget() -> SessionBudget {
        let date = NaiveDate::from_ymd_opt(2025, 11, 16).unwrap();
        SessionBudget::fresh(date, 900).advance(120).budget
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempdir().unwrap();
        let store = BudgetStore::in_dir(dir.path());
        let budget = make_budget();

        store.save(&budget).unwrap();
        assert_eq!(store.load(), Some(budget));
    }

    #[test]
    fn test_missing_file_is_none() {
        let dir = tempdir().unwrap();
        let store = BudgetStore::in_dir(dir.path());
        assert_eq!(store.try_load().unwrap(), None);
    }

    #[test]
    fn test_garbage_file_is_discarded() {
        let dir = tempdir().unwrap();
        let store = BudgetStore::in_dir(dir.path());
        std::fs::write(store.path(), "not json at all").unwrap();

        assert!(store.try_load().is_err());
        assert_eq!(store.load(), None);
    }

    #[test]
    fn test_edited_record_fails_checksum() {
        let dir = tempdir().unwrap();
        let store = BudgetStore::in_dir(dir.path());
        store.save(&make_budget()).unwrap();

        let content = std::fs::read_to_string(store.path()).unwrap();
        let edited = content.replace("\"remaining_seconds\": 780", "\"remaining_seconds\": 900");
        assert_ne!(content, edited);
        std::fs::write(store.path(), edited).unwrap();

        let err = store.try_load().unwrap_err();
        assert!(format!("{:#}", err).contains("checksum mismatch"));
        assert_eq!(store.load(), None);
    }

    #[test]
    fn test_version_mismatch_is_discarded() {
        let dir = tempdir().unwrap();
        let store = BudgetStore::in_dir(dir.path());
        store.save(&make_budget()).unwrap();

        let content = std::fs::read_to_string(store.path()).unwrap();
        std::fs::write(store.path(), content.replace("\"1.0\"", "\"0.9\"")).unwrap();

        assert_eq!(store.load(), None);
    }

    #[test]
    fn test_record_serializes_phase_lowercase() {
        let dir = tempdir().unwrap();
        let store = BudgetStore::in_dir(dir.path());
        let budget = make_budget();
        assert_eq!(budget.phase, SessionPhase::Running);

        store.save(&budget).unwrap();
        let content = std::fs::read_to_string(store.path()).unwrap();
        assert!(content.contains("\"phase\": \"running\""));
        assert!(content.contains("\"date_key\": \"2025-11-16\""));
        assert!(content.contains("\"checksum\": \"sha256:"));
    }

    #[test]
    fn test_draft_store() {
        let dir = tempdir().unwrap();
        let drafts = DraftStore::in_dir(dir.path());
        assert_eq!(drafts.load(), None);

        drafts.save("Dear diary,\n").unwrap();
        assert_eq!(drafts.load().as_deref(), Some("Dear diary,\n"));

        drafts.clear().unwrap();
        assert_eq!(drafts.load(), None);
        drafts.clear().unwrap();
    }
}
