//! Strategy engine: chance race detection, venue patterns and ticket
//! allocation.

pub mod allocation;
pub mod patterns;
pub mod signal;

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::types::{ChanceRace, PatternBook, RaceRecord, RankedPattern, Ticket};
use allocation::TicketAllocator;
use signal::SignalDetector;

pub use allocation::allocate_tickets;
pub use patterns::build_pattern_statistics;
pub use signal::detect_chance_races;

// ---------------------------------------------------------------------------
// Plans
// ---------------------------------------------------------------------------

/// Recommended tickets for one chance race.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RacePlan {
    pub chance: ChanceRace,
    /// Cumulative probability covered by the venue ranking the tickets come
    /// from; 0 when the venue had none.
    pub coverage: f64,
    /// Empty when the venue has no ranked patterns yet.
    pub tickets: Vec<Ticket>,
}

impl RacePlan {
    pub fn total_stake(&self) -> u64 {
        self.tickets.iter().map(|t| t.amount).sum()
    }
}

/// Patterns listed per venue in a day's summary.
pub const VENUE_SUMMARY_TOP: usize = 10;

/// Head of one venue's ranking, carried in the daily report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VenueSummary {
    pub name: String,
    pub total_races: u32,
    pub filtered_races: u32,
    pub top_patterns: Vec<RankedPattern>,
}

/// Everything recommended for one day's card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayPlan {
    #[serde(with = "crate::types::yyyymmdd")]
    pub date: NaiveDate,
    pub generated_at: DateTime<Utc>,
    pub races_analyzed: usize,
    /// Lowest lane-1 win probability first.
    pub plans: Vec<RacePlan>,
    /// Every venue with history, keyed by venue code.
    #[serde(default)]
    pub venue_summary: BTreeMap<String, VenueSummary>,
}

impl DayPlan {
    pub fn total_stake(&self) -> u64 {
        self.plans.iter().map(RacePlan::total_stake).sum()
    }

    pub fn ticket_count(&self) -> usize {
        self.plans.iter().map(|p| p.tickets.len()).sum()
    }
}

// ---------------------------------------------------------------------------
// Planner
// ---------------------------------------------------------------------------

/// Pipelines chance race detection → venue ranking lookup → allocation.
#[derive(Debug, Clone)]
pub struct RacePlanner {
    detector: SignalDetector,
    allocator: TicketAllocator,
}

impl RacePlanner {
    pub fn new(detector: SignalDetector, allocator: TicketAllocator) -> Self {
        Self {
            detector,
            allocator,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            SignalDetector::new(config.signal.clone()),
            TicketAllocator::new(config.allocation.clone()),
        )
    }

    /// Plan a day's races against the venue statistics in `book`.
    ///
    /// The plan is dated by its first race; an empty card is dated today.
    pub fn plan_day(&self, races: &[RaceRecord], book: &PatternBook) -> DayPlan {
        let date = races
            .first()
            .map(|r| r.date)
            .unwrap_or_else(|| Utc::now().date_naive());

        let chances = self.detector.detect_chance_races(races);

        let plans: Vec<RacePlan> = chances
            .into_iter()
            .map(|chance| {
                let ranking = book.ranking(&chance.venue);
                if ranking.is_empty() {
                    warn!(
                        venue = %chance.venue,
                        race_no = chance.race_no,
                        "Chance race at a venue without ranked patterns, no tickets"
                    );
                }
                let tickets = self.allocator.allocate_tickets(ranking, None);
                let coverage = ranking.last().map(|p| p.cumulative).unwrap_or(0.0);

                debug!(
                    venue = %chance.venue,
                    race_no = chance.race_no,
                    lane1_win_prob = format!("{:.1}%", chance.lane1_win_prob * 100.0),
                    tickets = tickets.len(),
                    coverage = format!("{:.1}%", coverage * 100.0),
                    "Race planned"
                );
                RacePlan {
                    chance,
                    coverage,
                    tickets,
                }
            })
            .collect();

        let venue_summary = book
            .venues()
            .filter(|v| v.total_races > 0)
            .map(|v| {
                let summary = VenueSummary {
                    name: v.name.clone(),
                    total_races: v.total_races,
                    filtered_races: v.filtered_races,
                    top_patterns: v.patterns.iter().take(VENUE_SUMMARY_TOP).cloned().collect(),
                };
                (v.venue.clone(), summary)
            })
            .collect();

        let plan = DayPlan {
            date,
            generated_at: Utc::now(),
            races_analyzed: races.len(),
            plans,
            venue_summary,
        };
        info!(
            date = %plan.date,
            races = plan.races_analyzed,
            chance_races = plan.plans.len(),
            tickets = plan.ticket_count(),
            stake = plan.total_stake(),
            "Day planned"
        );
        plan
    }
}

impl Default for RacePlanner {
    fn default() -> Self {
        Self::new(SignalDetector::default(), TicketAllocator::default())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::allocation::AllocationConfig;
    use crate::types::{History, RaceEntry, RaceResult, Technique, Trifecta};

    // ---- helpers -----------------------------------------------------------

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
    }

    fn make_race(venue: &str, race_no: u8, national: f64, local: f64) -> RaceRecord {
        RaceRecord {
            date: date(),
            venue: venue.into(),
            venue_name: String::new(),
            race_no,
            entries: vec![RaceEntry { lane: 1, national_rate: national, local_rate: local, ..Default::default() }],
            exhibit_starts: Vec::new(),
            motor_st_history: vec![0.16, 0.18, 0.20, 0.17, 0.19, 0.21, 0.18],
            result: None,
        }
    }

    fn make_book(venue: &str, outcomes: &[&str]) -> PatternBook {
        let mut history = History::new();
        for (i, combo) in outcomes.iter().enumerate() {
            let trifecta: Trifecta = combo.parse().unwrap();
            let mut race = make_race(venue, i as u8 + 1, 6.0, 6.0);
            race.result = Some(RaceResult {
                technique: Some(Technique::Overtake),
                winning_lane: Some(trifecta.first()),
                trifecta: Some(trifecta),
                ..Default::default()
            });
            history.entry(race.history_key()).or_default().push(race);
        }
        build_pattern_statistics(&history)
    }

    // ---- tests -------------------------------------------------------------

    #[test]
    fn test_no_races_empty_plan() {
        let plan = RacePlanner::default().plan_day(&[], &PatternBook::default());
        assert!(plan.plans.is_empty());
        assert_eq!(plan.total_stake(), 0);
    }

    #[test]
    fn test_chance_race_gets_full_budget() {
        let book = make_book("03", &["2-3-4", "2-3-4", "3-4-5", "4-5-6"]);
        let races = vec![make_race("03", 7, 3.8, 2.1), make_race("03", 8, 7.0, 7.0)];
        let plan = RacePlanner::default().plan_day(&races, &book);

        assert_eq!(plan.date, date());
        assert_eq!(plan.races_analyzed, 2);
        assert_eq!(plan.plans.len(), 1);
        let rp = &plan.plans[0];
        assert_eq!(rp.chance.race_no, 7);
        assert_eq!(rp.tickets.len(), 3);
        assert_eq!(rp.total_stake(), 30_000);
        assert_eq!(rp.tickets[0].trifecta.to_string(), "2-3-4");
        assert_eq!(rp.coverage, 1.0);
    }

    #[test]
    fn test_venue_summary_lists_top_patterns() {
        let book = make_book(
            "03",
            &[
                "2-1-3", "2-3-1", "2-3-4", "3-1-2", "3-2-1", "3-4-5",
                "4-1-2", "4-5-6", "5-1-2", "5-6-1", "6-1-2", "6-5-4",
            ],
        );

        let plan = RacePlanner::default().plan_day(&[make_race("03", 1, 7.0, 7.0)], &book);
        assert!(plan.plans.is_empty());
        assert_eq!(plan.venue_summary.len(), 1);
        let summary = &plan.venue_summary["03"];
        assert_eq!(summary.name, "江戸川");
        assert_eq!(summary.total_races, 12);
        assert_eq!(summary.filtered_races, 12);
        assert_eq!(summary.top_patterns.len(), VENUE_SUMMARY_TOP);
    }

    #[test]
    fn test_cloned_planner_plans_the_same() {
        let config = AppConfig {
            allocation: AllocationConfig { budget: 2_000, unit: 100 },
            ..Default::default()
        };
        let planner = RacePlanner::from_config(&config);
        let copy = planner.clone();
        let book = make_book("03", &["2-3-4", "3-4-5"]);
        let races = [make_race("03", 1, 3.8, 2.1)];
        assert_eq!(
            copy.plan_day(&races, &book).plans,
            planner.plan_day(&races, &book).plans
        );
        assert_eq!(copy.plan_day(&races, &book).total_stake(), 2_000);
    }

    #[test]
    fn test_venue_without_ranking_has_no_tickets() {
        let book = make_book("03", &["2-3-4"]);
        let plan = RacePlanner::default().plan_day(&[make_race("04", 1, 3.8, 2.1)], &book);
        assert_eq!(plan.plans.len(), 1);
        assert!(plan.plans[0].tickets.is_empty());
        assert_eq!(plan.plans[0].coverage, 0.0);
    }

    #[test]
    fn test_from_config_uses_budget() {
        let config = AppConfig {
            allocation: AllocationConfig { budget: 1_000, unit: 100 },
            ..Default::default()
        };
        let book = make_book("03", &["2-3-4", "3-4-5"]);
        let plan = RacePlanner::from_config(&config).plan_day(&[make_race("03", 1, 3.8, 2.1)], &book);
        assert_eq!(plan.total_stake(), 1_000);
    }
}
