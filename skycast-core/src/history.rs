use anyhow::{Context, Result};
use std::{fs, path::PathBuf};

use crate::config;

/// Upper bound on remembered searches.
const HISTORY_CAP: usize = 5;

/// Persistence seam for the recent-search list.
///
/// Implementations are small key-value stores: the dashboard loads once at
/// startup and rewrites the whole list on every add/remove.
pub trait HistoryStore {
    fn load(&self) -> Result<Vec<String>>;
    fn save(&self, entries: &[String]) -> Result<()>;
}

/// Most-recent-first, de-duplicated list of raw search strings, capped at 5.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchHistory {
    entries: Vec<String>,
}

impl SearchHistory {
    /// Rebuild from persisted entries, re-applying the dedup and cap rules in
    /// case the stored list predates them or was edited by hand.
    pub fn from_entries(entries: Vec<String>) -> Self {
        let mut deduped: Vec<String> = Vec::new();
        for city in entries {
            if !deduped.contains(&city) {
                deduped.push(city);
            }
        }
        deduped.truncate(HISTORY_CAP);

        Self { entries: deduped }
    }

    /// Promote `city` to the front, dropping any older duplicate and anything
    /// past the cap.
    pub fn add(&mut self, city: &str) {
        self.entries.retain(|entry| entry != city);
        self.entries.insert(0, city.to_string());
        self.entries.truncate(HISTORY_CAP);
    }

    pub fn remove(&mut self, city: &str) {
        self.entries.retain(|entry| entry != city);
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// JSON file under the platform data directory; the CLI's stand-in for the
/// browser's local storage.
#[derive(Debug, Clone)]
pub struct JsonFileHistoryStore {
    path: PathBuf,
}

impl JsonFileHistoryStore {
    pub fn at_default_path() -> Result<Self> {
        let path = config::project_dirs()?
            .data_dir()
            .join("search_history.json");
        Ok(Self { path })
    }

    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl HistoryStore for JsonFileHistoryStore {
    fn load(&self) -> Result<Vec<String>> {
        if !self.path.exists() {
            // First run: nothing saved yet.
            return Ok(Vec::new());
        }

        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read history file: {}", self.path.display()))?;

        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse history file: {}", self.path.display()))
    }

    fn save(&self, entries: &[String]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create history directory: {}", parent.display())
            })?;
        }

        let json = serde_json::to_string(entries).context("Failed to serialize search history")?;

        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write history file: {}", self.path.display()))?;

        Ok(())
    }
}
