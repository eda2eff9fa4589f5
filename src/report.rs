//! Plain-text sheets for the console: venue rankings, the cross-venue
//! probability table and per-race ticket sheets.

use std::fmt::Write;

use crate::strategy::{DayPlan, RacePlan};
use crate::types::{PatternBook, VenuePatternStats};

const RULE_WIDTH: usize = 60;

fn rule(out: &mut String, c: char) {
    out.extend(std::iter::repeat(c).take(RULE_WIDTH));
    out.push('\n');
}

/// Top `top_n` patterns of one venue.
pub fn render_ranking(stats: &VenuePatternStats, top_n: usize) -> String {
    let mut out = String::new();
    rule(&mut out, '=');
    let _ = writeln!(out, "  {} ({}) ranking, {:.1}% coverage", stats.name, stats.venue, stats.coverage() * 100.0);
    let _ = writeln!(out, "  Counted races: {} of {}", stats.filtered_races, stats.total_races);
    rule(&mut out, '=');
    if stats.patterns.is_empty() {
        let _ = writeln!(out, "  (no patterns)");
        return out;
    }
    let _ = writeln!(out, "  {:>4} | {:>7} | {:>7} | {:>7} | {:>5} | Technique", "Rank", "Bet", "Prob", "Cum", "Count");
    for (i, p) in stats.patterns.iter().take(top_n).enumerate() {
        let _ = writeln!(
            out,
            "  {:>4} | {:>7} | {:>6.2}% | {:>6.1}% | {:>5} | {}",
            i + 1,
            p.trifecta.to_string(),
            p.probability * 100.0,
            p.cumulative * 100.0,
            p.count,
            p.technique.label(),
        );
    }
    out
}

/// Every ranked pattern of every venue, one line each, venues in code order.
pub fn render_probability_table(book: &PatternBook) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:<5} {:<8} {:>7} {:>8} {:>8} {:>6} technique", "venue", "name", "bet", "prob", "cum", "count");
    for row in book.probability_table() {
        let _ = writeln!(
            out,
            "{:<5} {:<8} {:>7} {:>7.3}% {:>7.2}% {:>6} {}",
            row.venue,
            row.venue_name,
            row.trifecta.to_string(),
            row.probability * 100.0,
            row.cumulative * 100.0,
            row.count,
            row.technique.tag(),
        );
    }
    out
}

/// Ticket sheet for one chance race.
pub fn render_tickets(plan: &RacePlan) -> String {
    let chance = &plan.chance;
    let mut out = String::new();
    rule(&mut out, '=');
    let _ = writeln!(out, "  {} {}R  lane 1: {}", chance.venue_name, chance.race_no, chance.lane1.racer_name);
    let _ = writeln!(out, "  P(lane 1 wins) {:.1}%", chance.lane1_win_prob * 100.0);
    let _ = writeln!(out, "  weak:  {}", chance.weakness.reason);
    let _ = writeln!(out, "  start: {}", chance.start.reason);
    rule(&mut out, '=');
    if plan.tickets.is_empty() {
        let _ = writeln!(out, "  (no ranked patterns for this venue)");
        return out;
    }
    let _ = writeln!(out, "  {:>7} | {:>7} | {:>8} | Technique", "Bet", "Prob", "Amount");
    rule(&mut out, '-');
    for t in &plan.tickets {
        let _ = writeln!(
            out,
            "  {:>7} | {:>6.2}% | ¥{:>7} | {}",
            t.trifecta.to_string(),
            t.probability * 100.0,
            t.amount,
            t.technique.label(),
        );
    }
    rule(&mut out, '-');
    let _ = writeln!(out, "  {:>7} | {:>7} | ¥{:>7}", "Total", "", plan.total_stake());
    out
}

/// All ticket sheets of a day, with a one-line summary on top.
pub fn render_day_plan(plan: &DayPlan) -> String {
    let mut out = format!(
        "{}: {} races analysed, {} chance races, {} tickets, ¥{} staked\n",
        plan.date.format("%Y-%m-%d"),
        plan.races_analyzed,
        plan.plans.len(),
        plan.ticket_count(),
        plan.total_stake(),
    );
    for race in &plan.plans {
        out.push('\n');
        out.push_str(&render_tickets(race));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::{build_pattern_statistics, RacePlanner};
    use crate::types::{History, RaceEntry, RaceRecord, RaceResult, Technique, Trifecta};
    use chrono::NaiveDate;

    fn make_race(race_no: u8, combo: Option<&str>) -> RaceRecord {
        RaceRecord {
            date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            venue: "01".into(),
            venue_name: "桐生".into(),
            race_no,
            entries: vec![RaceEntry {
                lane: 1,
                racer_name: "山田".into(),
                national_rate: 3.8,
                local_rate: 2.1,
                ..Default::default()
            }],
            exhibit_starts: Vec::new(),
            motor_st_history: vec![0.19, 0.21, 0.20],
            result: combo.map(|c| {
                let trifecta: Trifecta = c.parse().unwrap();
                RaceResult {
                    technique: Some(Technique::Overtake),
                    winning_lane: Some(trifecta.first()),
                    trifecta: Some(trifecta),
                    ..Default::default()
                }
            }),
        }
    }

    fn make_book() -> PatternBook {
        let mut history = History::new();
        for (i, combo) in ["2-3-4", "2-3-4", "4-1-2"].iter().enumerate() {
            let race = make_race(i as u8 + 1, Some(combo));
            history.entry(race.history_key()).or_default().push(race);
        }
        build_pattern_statistics(&history)
    }

    #[test]
    fn test_ranking_lists_top_patterns() {
        let book = make_book();
        let text = render_ranking(book.venue("01").unwrap(), 1);
        assert!(text.contains("桐生 (01)"));
        assert!(text.contains("2-3-4"));
        assert!(!text.contains("4-1-2"));
        assert!(text.contains("Counted races: 3 of 3"));

        let empty = render_ranking(book.venue("02").unwrap(), 10);
        assert!(empty.contains("(no patterns)"));
    }

    #[test]
    fn test_probability_table_rows() {
        let text = render_probability_table(&make_book());
        assert_eq!(text.lines().count(), 3);
        assert!(text.lines().nth(1).unwrap().starts_with("01"));
    }

    #[test]
    fn test_day_plan_sheet() {
        let plan = RacePlanner::default().plan_day(&[make_race(9, None)], &make_book());
        let text = render_day_plan(&plan);
        assert!(text.starts_with("2026-03-01: 1 races analysed, 1 chance races, 2 tickets, ¥30000 staked"));
        assert!(text.contains("桐生 9R"));
        assert!(text.contains("¥  20000"));
        assert!(text.contains("Total"));
    }
}
