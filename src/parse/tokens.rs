//! Numeric extraction from concatenated table-cell text.
//!
//! The race card prints several two-decimal figures back to back with no
//! separator, e.g. national rate, 2-place and 3-place rates as
//! `"4.1116.6738.10"`. Everything here is best-effort pattern matching:
//! unexpected shapes produce fewer values, never an error, and ambiguous
//! tokens are resolved exactly the way the pinned tests below describe.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// One or more digits, a dot, exactly two digits.
    static ref RATE_RE: Regex = Regex::new(r"[0-9]+\.[0-9]{2}").unwrap();
    /// A start timing: `0.dd`.
    static ref ST_RE: Regex = Regex::new(r"0\.[0-9]{2}").unwrap();
    /// A cell holding nothing but a start timing.
    static ref EXACT_ST_RE: Regex = Regex::new(r"^0\.[0-9]{2}$").unwrap();
    /// Leading motor/boat number when the token has no usable decimal point.
    static ref LEADING_ID_RE: Regex = Regex::new(r"^([0-9]{2,3})").unwrap();
}

/// Plausible range for an exhibited start timing, in seconds.
pub const EXHIBIT_ST_RANGE: (f64, f64) = (0.05, 0.40);

/// Split a run of two-decimal values.
///
/// Scans left to right for non-overlapping `digits.dd` matches:
/// `"4.1116.6738.10"` → `[4.11, 16.67, 38.10]`. A number id glued to the
/// front of the first rate is *not* separated (see [`parse_motor_token`]).
pub fn parse_concatenated_rates(text: &str) -> Vec<f64> {
    RATE_RE
        .find_iter(text)
        .filter_map(|m| m.as_str().parse::<f64>().ok())
        .collect()
}

/// A motor (or boat) cell: equipment number followed by its rates.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MotorToken {
    /// Equipment number as printed; empty when none could be located.
    pub motor_no: String,
    /// 2-place rate, 3-place rate, ... in order.
    pub rates: Vec<f64>,
}

/// Split a motor cell such as `"3621.8837.50"` into number `"36"` and rates
/// `[21.88, 37.50]`.
///
/// The digits before the first dot are the number followed by the integer
/// part of the first rate. With four or more of them the last two belong to
/// the rate; with three, the last one does; with fewer, the whole prefix is
/// taken as the number and the full token is scanned for rates.
pub fn parse_motor_token(text: &str) -> MotorToken {
    let text = text.trim();
    match text.find('.') {
        Some(dot) if dot > 0 => {
            let prefix = &text[..dot];
            let width = prefix.chars().count();
            let id_chars = match width {
                w if w >= 4 => w - 2,
                3 => 2,
                w => w,
            };
            let split = prefix
                .char_indices()
                .nth(id_chars)
                .map(|(i, _)| i)
                .unwrap_or(prefix.len());
            let rates = if id_chars == width {
                parse_concatenated_rates(text)
            } else {
                parse_concatenated_rates(&text[split..])
            };
            MotorToken {
                motor_no: prefix[..split].to_string(),
                rates,
            }
        }
        _ => MotorToken {
            motor_no: LEADING_ID_RE
                .captures(text)
                .map(|c| c[1].to_string())
                .unwrap_or_default(),
            rates: parse_concatenated_rates(text),
        },
    }
}

/// First start timing in an F/L + average ST cell (`"F0L00.16"` → 0.16).
pub fn parse_start_cell(text: &str) -> Option<f64> {
    ST_RE.find(text).and_then(|m| m.as_str().parse().ok())
}

/// The value of a cell that holds exactly one start timing.
pub fn parse_exact_start(cell: &str) -> Option<f64> {
    let cell = cell.trim();
    if EXACT_ST_RE.is_match(cell) {
        cell.parse().ok()
    } else {
        None
    }
}

/// Standalone `0.dd` tokens in free text that fall in [`EXHIBIT_ST_RANGE`],
/// in order of appearance.
///
/// A token counts only when it is not glued to another digit on either side,
/// so `"10.15"` and `"0.155"` contribute nothing.
pub fn scan_exhibit_starts(text: &str) -> Vec<f64> {
    let (lo, hi) = EXHIBIT_ST_RANGE;
    ST_RE
        .find_iter(text)
        .filter(|m| {
            let before = text[..m.start()].chars().next_back();
            let after = text[m.end()..].chars().next();
            !before.is_some_and(|c| c.is_ascii_digit()) && !after.is_some_and(|c| c.is_ascii_digit())
        })
        .filter_map(|m| m.as_str().parse::<f64>().ok())
        .filter(|v| (lo..=hi).contains(v))
        .collect()
}
