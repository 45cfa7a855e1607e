//! Directory-backed JSON store for the profile and the run history.
//!
//! The core never assumes this store: the builders only ever see a `Profile`
//! snapshot, and the store receives the finished documents opaquely.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::Result,
    model::{Profile, RunInput},
};

const PROFILE_FILE: &str = "profile.json";
const HISTORY_FILE: &str = "history.json";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryEntry {
    pub id: String,
    pub created_at: String,
    pub run: RunInput,
    pub agi_period: Option<String>,
    pub salaries_xml: Option<String>,
    pub payments_xml: Option<String>,
}

impl HistoryEntry {
    pub fn new(
        run: RunInput,
        salaries_xml: Option<String>,
        payments_xml: Option<String>,
        agi_period: Option<String>,
    ) -> Self {
        HistoryEntry {
            id: Uuid::new_v4().to_string(),
            created_at: Local::now().to_rfc3339(),
            run,
            agi_period,
            salaries_xml,
            payments_xml,
        }
    }
}

pub struct Store {
    dir: PathBuf,
}

impl Store {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Store { dir: dir.into() }
    }

    pub fn profile_path(&self) -> PathBuf {
        self.dir.join(PROFILE_FILE)
    }

    pub fn history_path(&self) -> PathBuf {
        self.dir.join(HISTORY_FILE)
    }

    /// A missing or unreadable profile file yields the default profile; the
    /// caller is expected to fill it in and save.
    pub fn load_profile(&self) -> Profile {
        read_json(&self.profile_path()).unwrap_or_default()
    }

    pub fn save_profile(&self, profile: &Profile) -> Result<()> {
        self.write_json(&self.profile_path(), profile)
    }

    /// Newest entry first. Missing or unreadable history yields an empty list.
    pub fn load_history(&self) -> Vec<HistoryEntry> {
        read_json(&self.history_path()).unwrap_or_default()
    }

    pub fn save_history(&self, entries: &[HistoryEntry]) -> Result<()> {
        self.write_json(&self.history_path(), &entries)
    }

    /// Prepends one entry, keeping the newest-first order.
    pub fn push_history(&self, entry: HistoryEntry) -> Result<()> {
        let mut entries = self.load_history();
        entries.insert(0, entry);
        self.save_history(&entries)
    }

    pub fn clear_history(&self) -> Result<()> {
        self.save_history(&[])
    }

    fn write_json<T: Serialize>(&self, path: &Path, value: &T) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let text = serde_json::to_string_pretty(value)?;
        fs::write(path, text)?;
        Ok(())
    }
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Option<T> {
    let text = fs::read_to_string(path).ok()?;
    serde_json::from_str(&text).ok()
}
