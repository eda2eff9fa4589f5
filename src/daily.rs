//! The daily run: fold a snapshot into the corpus, rebuild venue statistics
//! and plan the undecided races.
//!
//! Everything the binary does except printing lives here so the whole flow
//! can be driven from tests against a temporary data directory.

use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::parse::normalize_races;
use crate::storage::{self, CollectionProgress};
use crate::strategy::patterns::PatternStatsEngine;
use crate::strategy::{DayPlan, RacePlanner};
use crate::types::PatternBook;

/// What one daily run produced and where it was written.
#[derive(Debug)]
pub struct DailyRun {
    pub plan: DayPlan,
    pub book: PatternBook,
    /// Races new to the corpus.
    pub added: usize,
    /// Races dropped for falling outside the collection window.
    pub pruned: usize,
    pub report_path: PathBuf,
}

/// Run the day against the snapshot at `snapshot_path`.
///
/// Decided races are merged into the corpus and their venue-days marked in
/// the collection progress. The corpus is then trimmed to
/// `agent.collection_days` and the venue statistics rebuilt from it.
/// Undecided races are planned, and the analysis report is saved.
pub fn run_daily(cfg: &AppConfig, snapshot_path: &Path) -> Result<DailyRun> {
    let history_path = cfg.paths.history();
    let mut history = storage::load_history(&history_path)?;

    let races = normalize_races(&storage::load_snapshot(snapshot_path)?);
    let (decided, upcoming): (Vec<_>, Vec<_>) = races.into_iter().partition(|r| r.result.is_some());

    let mut added = 0;
    if !decided.is_empty() {
        added = storage::merge_records(&mut history, &decided);

        let progress_path = cfg.paths.progress();
        let mut progress = CollectionProgress::load(&progress_path)?;
        for race in &decided {
            progress.mark_completed(&race.venue, race.date);
        }
        progress.save(&progress_path)?;
        info!(decided = decided.len(), added, fetched = progress.total_fetched, "Decided races folded into history");
    }

    let pruned = storage::prune_history(&mut history, cfg.agent.collection_days);
    if !decided.is_empty() || pruned > 0 {
        storage::save_history(&history, &history_path)?;
    }

    let book = PatternStatsEngine::new(cfg.patterns.clone()).build_pattern_statistics(&history);
    storage::save_pattern_book(&book, &cfg.paths.stats())?;
    storage::save_probability_table(&book, &cfg.paths.table())?;

    if upcoming.is_empty() {
        warn!("Snapshot has no undecided races to plan");
    }
    let plan = RacePlanner::from_config(cfg).plan_day(&upcoming, &book);
    let report_path = storage::save_day_plan(&plan, &cfg.paths.daily_dir())?;

    Ok(DailyRun {
        plan,
        book,
        added,
        pruned,
        report_path,
    })
}
