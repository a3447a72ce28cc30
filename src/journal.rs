use anyhow::{Context, Result};
use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// File name of the journal inside the data directory
pub const JOURNAL_FILE: &str = "journal.jsonl";

/// Receiver of finished diary entries
pub trait EntrySink {
    fn save_entry(&mut self, date: NaiveDate, text: &str) -> Result<()>;
}

/// One saved diary entry
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct JournalEntry {
    pub date: NaiveDate,
    pub saved_at: DateTime<Local>,
    pub text: String,
}

/// Append-only JSON-lines journal, one entry per day
#[derive(Debug, Clone)]
pub struct JournalFile {
    path: PathBuf,
}

impl JournalFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join(JOURNAL_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read all entries, oldest first
    pub fn entries(&self) -> Result<Vec<JournalEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = std::fs::File::open(&self.path)
            .with_context(|| format!("Failed to open journal: {}", self.path.display()))?;

        let mut entries = Vec::new();
        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line.context("Failed to read journal line")?;
            if line.trim().is_empty() {
                continue;
            }

            let entry: JournalEntry = serde_json::from_str(&line).with_context(|| {
                format!("Failed to parse journal line {} in {}", index + 1, self.path.display())
            })?;
            entries.push(entry);
        }

        Ok(entries)
    }

    pub fn has_entry_for(&self, date: NaiveDate) -> Result<bool> {
        Ok(self.entries()?.iter().any(|e| e.date == date))
    }
}

impl EntrySink for JournalFile {
    fn save_entry(&mut self, date: NaiveDate, text: &str) -> Result<()> {
        let text = text.trim();
        if text.is_empty() {
            anyhow::bail!("Diary entry cannot be empty");
        }

        if self.has_entry_for(date)? {
            anyhow::bail!("A diary entry for {} already exists. Only one per day is allowed", date);
        }

        let entry = JournalEntry {
            date,
            saved_at: Local::now(),
            text: text.to_string(),
        };
        let line = serde_json::to_string(&entry).context("Failed to serialize diary entry")?;

        crate::platform::common::ensure_directory_exists(
            self.path.parent().unwrap_or_else(|| Path::new("")),
        )?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open journal: {}", self.path.display()))?;
        writeln!(file, "{}", line).context("Failed to append diary entry")?;
        file.sync_all().context("Failed to sync journal to disk")?;

        info!("Saved diary entry for {}", date);
        Ok(())
    }
}
