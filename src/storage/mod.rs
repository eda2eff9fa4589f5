//! Persistence layer.
//!
//! Everything BlitzBoat keeps between runs is pretty-printed JSON under the
//! data directory: the race corpus, the venue pattern book, collection
//! progress and one analysis report per day. The probability table is
//! written next to them as plain text.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::parse::RawRace;
use crate::strategy::DayPlan;
use crate::types::{history_key, BlitzError, History, PatternBook, RaceRecord};

// ---------------------------------------------------------------------------
// JSON helpers
// ---------------------------------------------------------------------------

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;
    }
    Ok(())
}

fn write_json<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<()> {
    ensure_parent(path)?;
    let json = serde_json::to_string_pretty(value)
        .with_context(|| format!("Failed to serialise {}", path.display()))?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

/// `None` when the file does not exist.
fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let value = serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(Some(value))
}

// ---------------------------------------------------------------------------
// Race corpus
// ---------------------------------------------------------------------------

/// Load the historical corpus. A missing file is an empty corpus.
pub fn load_history(path: &Path) -> Result<History> {
    match read_json::<History>(path)? {
        Some(history) => {
            let races: usize = history.values().map(Vec::len).sum();
            info!(path = %path.display(), days = history.len(), races, "History loaded");
            Ok(history)
        }
        None => {
            info!(path = %path.display(), "No history found, starting empty");
            Ok(History::new())
        }
    }
}

pub fn save_history(history: &History, path: &Path) -> Result<()> {
    write_json(history, path)?;
    debug!(path = %path.display(), days = history.len(), "History saved");
    Ok(())
}

/// Add records to the corpus under their `"{venue}_{yyyymmdd}"` key.
///
/// A record for a race number already stored that day replaces the stored
/// one, so re-running a day does not double count it. Returns the number of
/// races that were not in the corpus before.
pub fn merge_records(history: &mut History, records: &[RaceRecord]) -> usize {
    let mut added = 0;
    for record in records {
        let day = history
            .entry(history_key(&record.venue, record.date))
            .or_default();
        match day.iter_mut().find(|r| r.race_no == record.race_no) {
            Some(existing) => *existing = record.clone(),
            None => {
                day.push(record.clone());
                added += 1;
            }
        }
    }
    debug!(records = records.len(), added, "Records merged into history");
    added
}

/// Drop races more than `keep_days` days older than the newest race in the
/// corpus, and any day left empty. Returns the number of races removed.
///
/// The window is anchored on the corpus itself so re-running an old
/// snapshot never empties it.
pub fn prune_history(history: &mut History, keep_days: u32) -> usize {
    let Some(newest) = history.values().flatten().map(|r| r.date).max() else {
        return 0;
    };
    let mut removed = 0;
    history.retain(|_, day| {
        let before = day.len();
        day.retain(|r| (newest - r.date).num_days() < i64::from(keep_days));
        removed += before - day.len();
        !day.is_empty()
    });
    if removed > 0 {
        info!(removed, keep_days, newest = %newest, "Pruned races outside the collection window");
    }
    removed
}

// ---------------------------------------------------------------------------
// Pattern book
// ---------------------------------------------------------------------------

/// Load saved venue statistics. Returns None if none were saved yet.
pub fn load_pattern_book(path: &Path) -> Result<Option<PatternBook>> {
    let book = read_json::<PatternBook>(path)?;
    if let Some(b) = &book {
        debug!(path = %path.display(), venues = b.len(), "Pattern book loaded");
    }
    Ok(book)
}

pub fn save_pattern_book(book: &PatternBook, path: &Path) -> Result<()> {
    write_json(book, path)?;
    debug!(path = %path.display(), venues = book.len(), "Pattern book saved");
    Ok(())
}

/// Write the cross-venue probability table as plain text.
pub fn save_probability_table(book: &PatternBook, path: &Path) -> Result<()> {
    ensure_parent(path)?;
    std::fs::write(path, crate::report::render_probability_table(book))
        .with_context(|| format!("Failed to write {}", path.display()))?;
    debug!(path = %path.display(), "Probability table saved");
    Ok(())
}

// ---------------------------------------------------------------------------
// Collection progress
// ---------------------------------------------------------------------------

/// Which (venue, day) pages the collector has already fetched, so an
/// interrupted collection can resume.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectionProgress {
    #[serde(default)]
    pub completed: Vec<String>,
    /// `YYYYMMDD` of the most recently completed day.
    #[serde(default)]
    pub last_date: String,
    #[serde(default)]
    pub total_fetched: usize,
}

impl CollectionProgress {
    pub fn load(path: &Path) -> Result<Self> {
        Ok(read_json(path)?.unwrap_or_default())
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        write_json(self, path)
    }

    pub fn is_completed(&self, venue: &str, date: chrono::NaiveDate) -> bool {
        self.completed.contains(&history_key(venue, date))
    }

    pub fn mark_completed(&mut self, venue: &str, date: chrono::NaiveDate) {
        let key = history_key(venue, date);
        if !self.completed.contains(&key) {
            self.completed.push(key);
        }
        self.last_date = date.format("%Y%m%d").to_string();
        self.total_fetched = self.completed.len();
    }
}

// ---------------------------------------------------------------------------
// Snapshots and reports
// ---------------------------------------------------------------------------

/// Load the collector's raw snapshot of a day's races.
pub fn load_snapshot(path: &Path) -> Result<Vec<RawRace>> {
    let races: Vec<RawRace> = read_json(path)?.ok_or_else(|| BlitzError::Storage {
        path: path.display().to_string(),
        message: "snapshot file not found".to_string(),
    })?;
    info!(path = %path.display(), races = races.len(), "Snapshot loaded");
    Ok(races)
}

/// Path of the analysis report for `plan`'s day.
pub fn day_plan_path(plan: &DayPlan, daily_dir: &Path) -> PathBuf {
    daily_dir.join(format!("analysis_{}.json", plan.date.format("%Y%m%d")))
}

/// Write `analysis_{yyyymmdd}.json` into `daily_dir`, returning its path.
pub fn save_day_plan(plan: &DayPlan, daily_dir: &Path) -> Result<PathBuf> {
    let path = day_plan_path(plan, daily_dir);
    write_json(plan, &path)?;
    info!(path = %path.display(), chance_races = plan.plans.len(), "Analysis report saved");
    Ok(path)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
