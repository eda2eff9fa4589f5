//! Race result (レース結果) normalization.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{Lane, LaneStart, Placing, RaceResult, Technique, Trifecta, LANE_COUNT};

lazy_static! {
    static ref TRIFECTA_RE: Regex = Regex::new(r"^[1-6]-[1-6]-[1-6]$").unwrap();
    /// Start table rows read `<lane>.<hundredths>`, e.g. `"1.25"`.
    static ref START_ROW_RE: Regex = Regex::new(r"^([0-9])\.([0-9]{2})$").unwrap();
}

/// Bet type label of the trifecta payout row.
const TRIFECTA_BET: &str = "3連単";

/// Cell texts of a result page, as scraped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawResultPage {
    /// Text of the row under the 決まり手 heading.
    #[serde(default)]
    pub technique_text: Option<String>,
    /// (rank, lane) cell pairs of the finish table.
    #[serde(default)]
    pub finish_rows: Vec<(String, String)>,
    /// (bet type, combination) cell pairs of the payout table.
    #[serde(default)]
    pub payout_rows: Vec<(String, String)>,
    /// Row texts of the start table.
    #[serde(default)]
    pub start_rows: Vec<String>,
}

/// Build a [`RaceResult`] from a scraped result page.
///
/// The payout table's trifecta wins over the one derived from the finish
/// order; both the finish order and the trifecta are kept.
pub fn build_result(page: &RawResultPage) -> RaceResult {
    let technique = page.technique_text.as_deref().and_then(Technique::find_in);
    let finish_order = parse_finish_order(&page.finish_rows);

    let from_finish = match finish_order.as_slice() {
        [a, b, c, ..] => Trifecta::new(a.lane, b.lane, c.lane).ok(),
        _ => None,
    };
    let from_payout = parse_payout_trifecta(&page.payout_rows);
    if let (Some(p), Some(f)) = (from_payout, from_finish) {
        if p != f {
            debug!(payout = %p, finish = %f, "Payout trifecta disagrees with finish order");
        }
    }

    let trifecta = from_payout.or(from_finish);
    let winning_lane = trifecta
        .map(|t| t.first())
        .or_else(|| finish_order.first().map(|p| p.lane));

    RaceResult {
        finish_order,
        technique,
        winning_lane,
        trifecta,
        start_times: parse_start_rows(&page.start_rows),
    }
}

/// Finish rows sorted by rank; needs at least three readable rows.
///
/// Rows whose rank is not a digit (disqualifications, absentees) are
/// skipped, as are repeats of a rank or lane already placed.
fn parse_finish_order(rows: &[(String, String)]) -> Vec<Placing> {
    let mut placings: Vec<Placing> = rows
        .iter()
        .filter_map(|(rank, lane)| {
            let rank = parse_rank(rank)?;
            let lane: Lane = lane.trim().parse().ok()?;
            let valid = |v: u8| (1..=LANE_COUNT as u8).contains(&v);
            (valid(rank) && valid(lane)).then_some(Placing { rank, lane })
        })
        .collect();
    placings.sort_by_key(|p| p.rank);

    let mut seen_lanes = Vec::with_capacity(LANE_COUNT);
    let mut seen_ranks = Vec::with_capacity(LANE_COUNT);
    placings.retain(|p| {
        if seen_lanes.contains(&p.lane) || seen_ranks.contains(&p.rank) {
            return false;
        }
        seen_lanes.push(p.lane);
        seen_ranks.push(p.rank);
        true
    });

    if placings.len() < 3 {
        return Vec::new();
    }
    placings
}

/// Rank digits are printed full-width (`"１"`); accept ASCII too.
fn parse_rank(text: &str) -> Option<u8> {
    let text = text.trim();
    match text {
        "１" => Some(1),
        "２" => Some(2),
        "３" => Some(3),
        "４" => Some(4),
        "５" => Some(5),
        "６" => Some(6),
        _ => text.parse().ok(),
    }
}

/// The trifecta combination from the payout table; the last valid row wins.
fn parse_payout_trifecta(rows: &[(String, String)]) -> Option<Trifecta> {
    rows.iter()
        .filter(|(bet, _)| bet.contains(TRIFECTA_BET))
        .filter_map(|(_, combo)| {
            let combo = combo.trim().replace(['−', 'ー'], "-");
            if !TRIFECTA_RE.is_match(&combo) {
                return None;
            }
            combo.parse::<Trifecta>().ok()
        })
        .last()
}

fn parse_start_rows(rows: &[String]) -> Vec<LaneStart> {
    rows.iter()
        .filter_map(|row| {
            let caps = START_ROW_RE.captures(row.trim())?;
            let lane: Lane = caps[1].parse().ok()?;
            let st: f64 = format!("0.{}", &caps[2]).parse().ok()?;
            let valid = (1..=LANE_COUNT as Lane).contains(&lane) && (0.01..=0.50).contains(&st);
            valid.then_some(LaneStart { lane, st })
        })
        .collect()
}
