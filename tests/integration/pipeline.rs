//! End-to-end daily flow over fixture snapshots.

use std::path::{Path, PathBuf};

use blitzboat::config::AppConfig;
use blitzboat::daily::run_daily;
use blitzboat::parse::{normalize_races, RawRace};
use blitzboat::storage::{self, CollectionProgress};
use blitzboat::strategy::{build_pattern_statistics, RacePlanner};
use blitzboat::types::{History, StartSignal, Technique};

use crate::fixtures::{chance, day, decided, race};

// ---- helpers ---------------------------------------------------------------

fn temp_dir() -> PathBuf {
    let mut p = std::env::temp_dir();
    p.push(format!("blitzboat_it_{}", uuid::Uuid::new_v4()));
    p
}

fn corpus_snapshot() -> Vec<RawRace> {
    vec![
        decided("01", day(1), 1, "まくり", [2, 3, 4, 1, 5, 6]),
        decided("01", day(1), 2, "まくり", [2, 3, 4, 5, 6, 1]),
        decided("01", day(1), 3, "まくり差し", [3, 2, 4, 1, 5, 6]),
        decided("01", day(1), 4, "差し", [2, 1, 3, 4, 5, 6]),
        decided("01", day(2), 1, "逃げ", [1, 2, 3, 4, 5, 6]),
        decided("01", day(2), 2, "まくり", [4, 2, 3, 1, 5, 6]),
    ]
}

fn corpus() -> History {
    let mut history = History::new();
    storage::merge_records(&mut history, &normalize_races(&corpus_snapshot()));
    history
}

// ---- tests -----------------------------------------------------------------

#[test]
fn test_normalized_snapshot_fields() {
    let records = normalize_races(&corpus_snapshot());
    let r = &records[2];
    assert_eq!(r.venue_name, "桐生");
    assert_eq!(r.entries.len(), 6);
    assert_eq!(r.entry(1).unwrap().national_rate, 6.20);
    assert_eq!(r.entry(1).unwrap().motor_no, "111");
    assert_eq!(r.entry(1).unwrap().motor_2rate, 35.50);
    assert_eq!(r.exhibit_for(3), vec![0.15]);

    let result = r.result.as_ref().unwrap();
    assert_eq!(result.technique, Some(Technique::OvertakeThrust));
    assert_eq!(result.trifecta.unwrap().to_string(), "3-2-4");
    assert_eq!(result.winning_lane, Some(3));
    assert_eq!(result.start_times.len(), 6);
}

#[test]
fn test_corpus_statistics() {
    let history = corpus();
    assert_eq!(history.len(), 2);

    let book = build_pattern_statistics(&history);
    assert_eq!(book.len(), 24);
    let kiryu = book.venue("01").unwrap();
    assert_eq!(kiryu.total_races, 6);
    assert_eq!(kiryu.filtered_races, 4);

    let ranking: Vec<String> = kiryu.patterns.iter().map(|p| p.trifecta.to_string()).collect();
    assert_eq!(ranking, vec!["2-3-4", "3-2-4", "4-2-3"]);
    assert_eq!(kiryu.patterns[0].probability, 0.5);
    assert!(book.venue("02").unwrap().patterns.is_empty());
}

#[test]
fn test_plan_day_end_to_end() {
    let book = build_pattern_statistics(&corpus());
    let card = normalize_races(&[race("01", day(3), 1), chance("01", day(3), 2), chance("05", day(3), 3)]);

    let plan = RacePlanner::default().plan_day(&card, &book);
    assert_eq!(plan.races_analyzed, 3);
    assert_eq!(plan.plans.len(), 2);

    let kiryu = plan.plans.iter().find(|p| p.chance.venue == "01").unwrap();
    assert_eq!(kiryu.chance.race_no, 2);
    assert!(matches!(kiryu.chance.start.signal, StartSignal::Fitted(_)));
    let amounts: Vec<u64> = kiryu.tickets.iter().map(|t| t.amount).collect();
    assert_eq!(amounts, vec![15_000, 7_500, 7_500]);

    // Tama River has no history: flagged, but nothing to bet on.
    let tamagawa = plan.plans.iter().find(|p| p.chance.venue == "05").unwrap();
    assert!(tamagawa.tickets.is_empty());
    assert_eq!(plan.total_stake(), 30_000);
}

fn data_config(dir: &Path, collection_days: u32) -> AppConfig {
    let mut cfg = AppConfig::default();
    cfg.paths.data_dir = dir.to_path_buf();
    cfg.agent.collection_days = collection_days;
    cfg
}

fn write_snapshot(dir: &Path) -> PathBuf {
    let mut snapshot = corpus_snapshot();
    snapshot.push(chance("01", day(3), 5));
    std::fs::create_dir_all(dir).unwrap();
    let path = dir.join("snapshot.json");
    std::fs::write(&path, serde_json::to_string(&snapshot).unwrap()).unwrap();
    path
}

#[test]
fn test_daily_flow_persists_everything() {
    let dir = temp_dir();
    let cfg = data_config(&dir, 180);
    let snapshot_path = write_snapshot(&dir);

    let run = run_daily(&cfg, &snapshot_path).unwrap();
    assert_eq!(run.added, 6);
    assert_eq!(run.pruned, 0);
    assert!(run.report_path.ends_with("daily/analysis_20260303.json"));
    assert_eq!(run.plan.plans.len(), 1);
    assert_eq!(run.plan.total_stake(), 30_000);

    // Corpus, statistics and the probability table are on disk.
    let history = storage::load_history(&cfg.paths.history()).unwrap();
    assert_eq!(history.values().map(Vec::len).sum::<usize>(), 6);
    assert_eq!(storage::load_pattern_book(&cfg.paths.stats()).unwrap().unwrap(), run.book);
    let table = std::fs::read_to_string(cfg.paths.table()).unwrap();
    assert!(table.lines().any(|l| l.starts_with("01") && l.contains("2-3-4")));

    // Both decided venue-days are marked for the collector.
    let progress = CollectionProgress::load(&cfg.paths.progress()).unwrap();
    assert!(progress.is_completed("01", day(1)));
    assert!(progress.is_completed("01", day(2)));
    assert!(!progress.is_completed("01", day(3)));
    assert_eq!(progress.total_fetched, 2);

    // The saved report carries the venue summary.
    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&run.report_path).unwrap()).unwrap();
    let kiryu = &report["venue_summary"]["01"];
    assert_eq!(kiryu["total_races"], 6);
    assert_eq!(kiryu["filtered_races"], 4);
    assert_eq!(kiryu["top_patterns"].as_array().unwrap().len(), 3);
    assert!(report["venue_summary"].get("02").is_none());

    // Re-running the same snapshot must not grow the corpus.
    let rerun = run_daily(&cfg, &snapshot_path).unwrap();
    assert_eq!(rerun.added, 0);
    assert_eq!(storage::load_history(&cfg.paths.history()).unwrap(), history);
    assert_eq!(rerun.book, run.book);

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_daily_flow_prunes_to_collection_window() {
    let dir = temp_dir();
    let cfg = data_config(&dir, 1);
    let snapshot_path = write_snapshot(&dir);

    // Only the newest decided day (day 2) survives a one-day window.
    let run = run_daily(&cfg, &snapshot_path).unwrap();
    assert_eq!(run.pruned, 4);
    let history = storage::load_history(&cfg.paths.history()).unwrap();
    assert_eq!(history.len(), 1);
    assert!(history.contains_key("01_20260302"));

    let kiryu = run.book.venue("01").unwrap();
    assert_eq!(kiryu.total_races, 2);
    assert_eq!(kiryu.filtered_races, 1);
    let amounts: Vec<u64> = run.plan.plans[0].tickets.iter().map(|t| t.amount).collect();
    assert_eq!(amounts, vec![30_000]);

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_collection_progress_resume() {
    let dir = temp_dir();
    let path = dir.join("progress.json");
    let mut progress = CollectionProgress::load(&path).unwrap();
    for d in 1..=3 {
        progress.mark_completed("01", day(d));
    }
    progress.save(&path).unwrap();

    let resumed = CollectionProgress::load(&path).unwrap();
    assert!(resumed.is_completed("01", day(2)));
    assert!(!resumed.is_completed("01", day(4)));
    assert_eq!(resumed.total_fetched, 3);
    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_shipped_config_matches_defaults() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config.toml");
    let shipped = AppConfig::load(path).unwrap();
    let defaults = AppConfig::default();
    assert_eq!(shipped.signal, defaults.signal);
    assert_eq!(shipped.patterns, defaults.patterns);
    assert_eq!(shipped.allocation, defaults.allocation);
}
