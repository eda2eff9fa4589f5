//! Venue pattern statistics.
//!
//! Aggregates the historical corpus into a per-venue frequency distribution
//! over trifectas. Only wins by an outside boat with an allowed technique
//! are counted; the ranked list is cut once it covers the cumulative
//! probability target.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::types::{
    History, Lane, PatternBook, PatternCount, RaceRecord, RankedPattern, Technique, Trifecta,
    VenuePatternStats, VENUES,
};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Techniques counted when `lane` wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaneAllowance {
    pub lane: Lane,
    pub techniques: Vec<Technique>,
}

impl LaneAllowance {
    fn new(lane: Lane, techniques: &[Technique]) -> Self {
        Self {
            lane,
            techniques: techniques.to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternConfig {
    /// Technique dropped before the allow-list is consulted.
    pub excluded: Option<Technique>,
    /// Lane → technique allow-list. Lanes without a rule (lane 1 by
    /// default) never count.
    pub allowed: Vec<LaneAllowance>,
    /// Ranked list stops at the first pattern reaching this cumulative
    /// probability.
    pub cumulative_cutoff: f64,
}

impl Default for PatternConfig {
    fn default() -> Self {
        use Technique::{Overtake, OvertakeThrust};
        Self {
            excluded: Some(Technique::Thrust),
            allowed: vec![
                LaneAllowance::new(2, &[Overtake]),
                LaneAllowance::new(3, &[Overtake, OvertakeThrust]),
                LaneAllowance::new(4, &[Overtake, OvertakeThrust]),
                LaneAllowance::new(5, &[Overtake, OvertakeThrust]),
                LaneAllowance::new(6, &[Overtake, OvertakeThrust]),
            ],
            cumulative_cutoff: 0.97,
        }
    }
}

impl PatternConfig {
    /// Whether a win by `lane` with `technique` is counted.
    pub fn allows(&self, lane: Lane, technique: Technique) -> bool {
        if self.excluded == Some(technique) {
            return false;
        }
        self.allowed
            .iter()
            .any(|a| a.lane == lane && a.techniques.contains(&technique))
    }
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Tallies of one venue in first-seen order.
#[derive(Default)]
struct VenueTally {
    total_races: u32,
    filtered_races: u32,
    order: Vec<(Trifecta, u32, Technique)>,
    index: HashMap<Trifecta, usize>,
}

impl VenueTally {
    fn count(&mut self, trifecta: Trifecta, technique: Technique) {
        self.filtered_races += 1;
        match self.index.get(&trifecta) {
            Some(&i) => {
                let slot = &mut self.order[i];
                slot.1 += 1;
                // Last write wins: the stored technique is that of the most
                // recent race, not the most frequent one.
                slot.2 = technique;
            }
            None => {
                self.index.insert(trifecta, self.order.len());
                self.order.push((trifecta, 1, technique));
            }
        }
    }

    fn finish(self, venue: &str, cutoff: f64) -> VenuePatternStats {
        let mut stats = VenuePatternStats::empty(venue);
        stats.total_races = self.total_races;
        stats.filtered_races = self.filtered_races;
        if self.filtered_races == 0 {
            return stats;
        }

        let total = f64::from(self.filtered_races);
        let mut ranked: Vec<RankedPattern> = self
            .order
            .iter()
            .map(|&(trifecta, count, technique)| RankedPattern {
                trifecta,
                count,
                probability: f64::from(count) / total,
                cumulative: 0.0,
                technique,
            })
            .collect();
        stats.counts = ranked
            .iter()
            .map(|p| {
                let count = PatternCount {
                    count: p.count,
                    probability: p.probability,
                    technique: p.technique,
                };
                (p.trifecta, count)
            })
            .collect();

        // Stable descending sort by count; ties stay in first-seen order.
        ranked.sort_by(|a, b| b.count.cmp(&a.count));

        // Running count over the total, so a full list ends at exactly 1.0.
        let mut cum_count = 0u32;
        let mut kept = Vec::new();
        for mut p in ranked {
            cum_count += p.count;
            p.cumulative = f64::from(cum_count) / total;
            let reached = p.cumulative >= cutoff;
            kept.push(p);
            if reached {
                break;
            }
        }
        stats.patterns = kept;
        stats
    }
}

/// The (trifecta, technique) a race contributes, or why it contributes
/// nothing.
fn countable(race: &RaceRecord, config: &PatternConfig) -> Result<(Trifecta, Technique), &'static str> {
    let result = race.result.as_ref().ok_or("no result")?;
    let (Some(technique), Some(trifecta), Some(lane)) =
        (result.technique, result.trifecta, result.winning_lane)
    else {
        return Err("incomplete result");
    };
    if config.excluded == Some(technique) {
        return Err("excluded technique");
    }
    if !config.allows(lane, technique) {
        return Err("technique not allowed for winning lane");
    }
    Ok((trifecta, technique))
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Builds [`PatternBook`]s from the historical corpus.
#[derive(Debug, Clone, Default)]
pub struct PatternStatsEngine {
    config: PatternConfig,
}

impl PatternStatsEngine {
    pub fn new(config: PatternConfig) -> Self {
        Self { config }
    }

    /// Access the pattern configuration.
    pub fn config(&self) -> &PatternConfig {
        &self.config
    }

    /// Rebuild every venue's distribution from scratch.
    ///
    /// All 24 venues are present in the result even when the corpus has no
    /// race for them. Races with an unknown venue code get their own entry.
    pub fn build_pattern_statistics(&self, history: &History) -> PatternBook {
        let mut tallies: BTreeMap<String, VenueTally> = VENUES
            .iter()
            .map(|(code, _)| (code.to_string(), VenueTally::default()))
            .collect();

        let mut skipped = 0usize;
        for race in history.values().flatten() {
            if race.venue.is_empty() {
                skipped += 1;
                continue;
            }
            let tally = tallies.entry(race.venue.clone()).or_default();
            tally.total_races += 1;

            match countable(race, &self.config) {
                Ok((trifecta, technique)) => tally.count(trifecta, technique),
                Err(reason) => {
                    debug!(venue = %race.venue, race_no = race.race_no, reason, "Race not counted");
                }
            }
        }

        let venues: BTreeMap<String, VenuePatternStats> = tallies
            .into_iter()
            .map(|(code, tally)| {
                let stats = tally.finish(&code, self.config.cumulative_cutoff);
                (code, stats)
            })
            .collect();

        let counted: u32 = venues.values().map(|v| v.filtered_races).sum();
        info!(
            days = history.len(),
            venues = venues.len(),
            counted_races = counted,
            skipped_without_venue = skipped,
            "Pattern statistics rebuilt"
        );
        PatternBook::new(venues)
    }
}

/// [`PatternStatsEngine::build_pattern_statistics`] with the default rules.
pub fn build_pattern_statistics(history: &History) -> PatternBook {
    PatternStatsEngine::default().build_pattern_statistics(history)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
