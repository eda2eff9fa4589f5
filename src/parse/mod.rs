//! Race normalizer: raw scraped snapshots → uniform [`RaceRecord`]s.
//!
//! The scraper hands over cell texts, not HTML. Everything in this module
//! is best-effort; bad cells degrade to zero values or missing fields.

pub mod race_card;
pub mod result;
pub mod tokens;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::types::{venue_name, RaceRecord};
use race_card::{build_entries, build_exhibit_starts, RawBeforeInfo, RawEntryRow};
use result::{build_result, RawResultPage};

/// One race as delivered by the collector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRace {
    #[serde(with = "crate::types::yyyymmdd")]
    pub date: NaiveDate,
    pub venue: String,
    #[serde(default)]
    pub venue_name: Option<String>,
    pub race_no: u8,
    #[serde(default)]
    pub entries: Vec<RawEntryRow>,
    #[serde(default)]
    pub before_info: Option<RawBeforeInfo>,
    #[serde(default)]
    pub result: Option<RawResultPage>,
    #[serde(default)]
    pub motor_st_history: Vec<f64>,
}

/// Assemble a [`RaceRecord`] from a raw snapshot.
///
/// A result page that yields neither a finish order nor a trifecta (race
/// cancelled, page not yet published) is dropped.
pub fn normalize_race(raw: &RawRace) -> RaceRecord {
    let entries = build_entries(&raw.entries);
    let exhibit_starts = raw
        .before_info
        .as_ref()
        .map(build_exhibit_starts)
        .unwrap_or_default();
    let result = raw
        .result
        .as_ref()
        .map(build_result)
        .filter(|r| r.is_decided());

    let venue_name = raw
        .venue_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| venue_name(&raw.venue));

    let motor_st_history: Vec<f64> = raw
        .motor_st_history
        .iter()
        .copied()
        .filter(|st| st.is_finite())
        .collect();

    debug!(
        venue = %raw.venue,
        race_no = raw.race_no,
        entries = entries.len(),
        exhibits = exhibit_starts.len(),
        decided = result.is_some(),
        "Race normalized"
    );

    RaceRecord {
        date: raw.date,
        venue: raw.venue.clone(),
        venue_name,
        race_no: raw.race_no,
        entries,
        exhibit_starts,
        motor_st_history,
        result,
    }
}

/// Normalize a batch, in input order.
pub fn normalize_races(raws: &[RawRace]) -> Vec<RaceRecord> {
    let records: Vec<RaceRecord> = raws.iter().map(normalize_race).collect();

    let short_cards = records.iter().filter(|r| r.entries.len() < 6).count();
    if short_cards > 0 {
        warn!(short_cards, "Some race cards have fewer than six entries");
    }
    info!(
        races = records.len(),
        decided = records.iter().filter(|r| r.result.is_some()).count(),
        "Snapshot normalized"
    );
    records
}
