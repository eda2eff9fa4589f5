//! Deterministic raw race snapshots.
//!
//! Builds collector output the way the scraper hands it over: cell texts,
//! not typed values.

use blitzboat::parse::race_card::{RawBeforeInfo, RawEntryRow};
use blitzboat::parse::result::RawResultPage;
use blitzboat::parse::RawRace;
use chrono::NaiveDate;

pub fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
}

fn entry_row(lane: u8, national: &str, local: &str) -> RawEntryRow {
    RawEntryRow {
        racer_id: format!("40{lane:02}"),
        racer_name: format!("選手{lane}"),
        data_cells: vec![
            "F0L00.16".to_string(),
            format!("{national}30.0045.00"),
            format!("{local}28.0040.00"),
            format!("{}{}35.5050.00", 10 + lane, lane),
            "5533.3350.00".to_string(),
        ],
    }
}

/// A six-boat card whose lane 1 racer has the given national/local rates.
pub fn card(lane1_national: &str, lane1_local: &str) -> Vec<RawEntryRow> {
    let mut rows = vec![entry_row(1, lane1_national, lane1_local)];
    rows.extend((2..=6).map(|lane| entry_row(lane, "5.50", "5.40")));
    rows
}

/// Before-info page whose table lists the six exhibited starts in lane order.
pub fn before_info(starts: [&str; 6]) -> RawBeforeInfo {
    RawBeforeInfo {
        rows: starts
            .iter()
            .enumerate()
            .map(|(i, st)| vec![(i + 1).to_string(), "6.78".to_string(), st.to_string()])
            .collect(),
        text: String::new(),
    }
}

/// Result page for a finish order given as lanes, e.g. `[2, 3, 4, 1, 5, 6]`.
pub fn result_page(technique: &str, order: [u8; 6]) -> RawResultPage {
    const RANKS: [&str; 6] = ["１", "２", "３", "４", "５", "６"];
    RawResultPage {
        technique_text: Some(technique.to_string()),
        finish_rows: order
            .iter()
            .zip(RANKS)
            .map(|(lane, rank)| (rank.to_string(), lane.to_string()))
            .collect(),
        payout_rows: vec![
            ("3連単".to_string(), format!("{}−{}−{}", order[0], order[1], order[2])),
            ("3連複".to_string(), "1=2=3".to_string()),
        ],
        start_rows: order.iter().map(|lane| format!("{lane}.15")).collect(),
    }
}

pub fn race(venue: &str, date: NaiveDate, race_no: u8) -> RawRace {
    RawRace {
        date,
        venue: venue.to_string(),
        venue_name: None,
        race_no,
        entries: card("6.20", "6.10"),
        before_info: Some(before_info(["0.12", "0.14", "0.15", "0.13", "0.16", "0.17"])),
        result: None,
        motor_st_history: Vec::new(),
    }
}

/// A finished race won by `order[0]` with `technique`.
pub fn decided(venue: &str, date: NaiveDate, race_no: u8, technique: &str, order: [u8; 6]) -> RawRace {
    RawRace {
        result: Some(result_page(technique, order)),
        ..race(venue, date, race_no)
    }
}

/// An upcoming race with a weak lane 1 racer and a slow motor.
pub fn chance(venue: &str, date: NaiveDate, race_no: u8) -> RawRace {
    RawRace {
        entries: card("3.80", "2.10"),
        motor_st_history: vec![0.16, 0.18, 0.20, 0.17, 0.19, 0.21, 0.18],
        ..race(venue, date, race_no)
    }
}
