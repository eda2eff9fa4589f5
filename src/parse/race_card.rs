//! Race card (出走表) and before-info (直前情報) normalization.
//!
//! Turns the cell texts a scraper pulled out of the race list and the
//! exhibition page into [`RaceEntry`] and [`ExhibitStart`] values. Missing
//! or unreadable cells become zero-valued fields.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::tokens::{
    parse_concatenated_rates, parse_exact_start, parse_motor_token, parse_start_cell,
    scan_exhibit_starts,
};
use crate::types::{ExhibitStart, Lane, RaceEntry, LANE_COUNT};

/// One boat's row of the race list, as scraped.
///
/// `data_cells` are the figure cells in page order: F/L + average ST,
/// national rates, local rates, motor, boat.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawEntryRow {
    #[serde(default)]
    pub racer_id: String,
    #[serde(default)]
    pub racer_name: String,
    #[serde(default)]
    pub data_cells: Vec<String>,
}

/// Text of the before-info page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawBeforeInfo {
    /// Table rows, each a list of cell texts.
    #[serde(default)]
    pub rows: Vec<Vec<String>>,
    /// The whole page as plain text.
    #[serde(default)]
    pub text: String,
}

const CELL_ST: usize = 0;
const CELL_NATIONAL: usize = 1;
const CELL_LOCAL: usize = 2;
const CELL_MOTOR: usize = 3;

/// Build one entry per row in page order, at most six; lane = position.
pub fn build_entries(rows: &[RawEntryRow]) -> Vec<RaceEntry> {
    if rows.len() > LANE_COUNT {
        debug!(rows = rows.len(), "Race card has extra rows, keeping the first six");
    }
    rows.iter()
        .take(LANE_COUNT)
        .enumerate()
        .map(|(idx, row)| build_entry(idx as Lane + 1, row))
        .collect()
}

fn build_entry(lane: Lane, row: &RawEntryRow) -> RaceEntry {
    let cell = |i: usize| row.data_cells.get(i).map(|c| c.trim());
    let first_rate = |i: usize| {
        cell(i)
            .and_then(|c| parse_concatenated_rates(c).first().copied())
            .unwrap_or(0.0)
    };

    let motor = cell(CELL_MOTOR).map(parse_motor_token).unwrap_or_default();

    RaceEntry {
        lane,
        racer_id: row.racer_id.trim().to_string(),
        racer_name: row.racer_name.trim().to_string(),
        national_rate: first_rate(CELL_NATIONAL),
        local_rate: first_rate(CELL_LOCAL),
        motor_no: motor.motor_no,
        motor_2rate: motor.rates.first().copied().unwrap_or(0.0),
        avg_st: cell(CELL_ST).and_then(parse_start_cell).unwrap_or(0.0),
    }
}

/// Exhibited start timings for lanes 1–6.
///
/// Cells holding exactly one `0.dd` value are assigned to lanes in order of
/// appearance. If that finds fewer than six, the structured result is
/// dropped and the page text is scanned instead: the first six standalone
/// values in [0.05, 0.40] map to lanes 1–6. The mapping is positional and
/// may be wrong when the page lists boats out of lane order.
pub fn build_exhibit_starts(info: &RawBeforeInfo) -> Vec<ExhibitStart> {
    let structured: Vec<f64> = info
        .rows
        .iter()
        .flatten()
        .filter_map(|cell| parse_exact_start(cell))
        .take(LANE_COUNT)
        .collect();

    let values = if structured.len() == LANE_COUNT {
        structured
    } else {
        let scanned: Vec<f64> = scan_exhibit_starts(&info.text)
            .into_iter()
            .take(LANE_COUNT)
            .collect();
        debug!(
            structured = structured.len(),
            scanned = scanned.len(),
            "Exhibit table incomplete, fell back to text scan"
        );
        scanned
    };

    values
        .into_iter()
        .enumerate()
        .map(|(idx, exhibit_st)| ExhibitStart {
            lane: idx as Lane + 1,
            exhibit_st,
        })
        .collect()
}
