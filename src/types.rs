//! Shared types for BlitzBoat.
//!
//! These types form the data model used across all modules: parsed race
//! records flow in from `parse`, verdicts and allocations flow out of
//! `strategy`, and `storage` persists both as JSON.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Starting position 1–6. Lane 1 is the inside (structurally favored) lane.
pub type Lane = u8;

/// Number of boats in a race.
pub const LANE_COUNT: usize = 6;

// ---------------------------------------------------------------------------
// Venues
// ---------------------------------------------------------------------------

/// The 24 venues, keyed by the two-digit code the results site uses.
pub const VENUES: &[(&str, &str)] = &[
    ("01", "桐生"), ("02", "戸田"), ("03", "江戸川"), ("04", "平和島"),
    ("05", "多摩川"), ("06", "浜名湖"), ("07", "蒲郡"), ("08", "常滑"),
    ("09", "津"), ("10", "三国"), ("11", "びわこ"), ("12", "住之江"),
    ("13", "尼崎"), ("14", "鳴門"), ("15", "丸亀"), ("16", "児島"),
    ("17", "宮島"), ("18", "徳山"), ("19", "下関"), ("20", "若松"),
    ("21", "芦屋"), ("22", "福岡"), ("23", "唐津"), ("24", "大村"),
];

/// Display name for a venue code. Unknown codes get a generic label.
pub fn venue_name(code: &str) -> String {
    VENUES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| name.to_string())
        .unwrap_or_else(|| format!("Venue{code}"))
}

// ---------------------------------------------------------------------------
// Winning technique
// ---------------------------------------------------------------------------

/// How the winning boat won (決まり手). Serialized with the site's labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Technique {
    /// 逃げ: lane 1 leads from the start.
    #[serde(rename = "逃げ", alias = "leading-wire")]
    LeadingWire,
    /// まくり: overtakes on the outside.
    #[serde(rename = "まくり", alias = "overtake")]
    Overtake,
    /// まくり差し: overtakes and cuts inside.
    #[serde(rename = "まくり差し", alias = "overtake-thrust")]
    OvertakeThrust,
    /// 差し: cuts inside the leader.
    #[serde(rename = "差し", alias = "thrust")]
    Thrust,
    /// 抜き: passes after the first turn.
    #[serde(rename = "抜き", alias = "block-drop")]
    BlockDrop,
    /// 恵まれ: wins through others' disqualification or accident.
    #[serde(rename = "恵まれ", alias = "favored")]
    Favored,
}

impl Technique {
    /// All techniques, ordered so that no label is a prefix match of a later
    /// one (まくり差し must be tried before まくり, まくり before 差し).
    pub const SEARCH_ORDER: &'static [Technique] = &[
        Technique::OvertakeThrust,
        Technique::Overtake,
        Technique::Thrust,
        Technique::LeadingWire,
        Technique::BlockDrop,
        Technique::Favored,
    ];

    /// The label as printed on the results site.
    pub fn label(&self) -> &'static str {
        match self {
            Technique::LeadingWire => "逃げ",
            Technique::Overtake => "まくり",
            Technique::OvertakeThrust => "まくり差し",
            Technique::Thrust => "差し",
            Technique::BlockDrop => "抜き",
            Technique::Favored => "恵まれ",
        }
    }

    /// English tag used in logs and config files.
    pub fn tag(&self) -> &'static str {
        match self {
            Technique::LeadingWire => "leading-wire",
            Technique::Overtake => "overtake",
            Technique::OvertakeThrust => "overtake-thrust",
            Technique::Thrust => "thrust",
            Technique::BlockDrop => "block-drop",
            Technique::Favored => "favored",
        }
    }

    /// First technique whose label occurs anywhere in `text`.
    pub fn find_in(text: &str) -> Option<Technique> {
        Self::SEARCH_ORDER
            .iter()
            .copied()
            .find(|t| text.contains(t.label()))
    }
}

impl fmt::Display for Technique {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// Parse from either the site label or the English tag (case-insensitive).
impl std::str::FromStr for Technique {
    type Err = BlitzError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::SEARCH_ORDER
            .iter()
            .copied()
            .find(|t| t.label() == s || t.tag().eq_ignore_ascii_case(s))
            .ok_or_else(|| BlitzError::UnknownTechnique(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Trifecta
// ---------------------------------------------------------------------------

/// An ordered triple of distinct lanes: exact 1st/2nd/3rd.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Trifecta([Lane; 3]);

impl Trifecta {
    /// Build a trifecta, validating lane range and distinctness.
    pub fn new(first: Lane, second: Lane, third: Lane) -> Result<Self, BlitzError> {
        let lanes = [first, second, third];
        let in_range = lanes.iter().all(|l| (1..=LANE_COUNT as Lane).contains(l));
        let distinct = first != second && first != third && second != third;
        if !in_range || !distinct {
            return Err(BlitzError::InvalidTrifecta(format!("{first}-{second}-{third}")));
        }
        Ok(Self(lanes))
    }

    pub fn lanes(&self) -> [Lane; 3] {
        self.0
    }

    /// The winning lane.
    pub fn first(&self) -> Lane {
        self.0[0]
    }
}

impl fmt::Display for Trifecta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.0[0], self.0[1], self.0[2])
    }
}

impl std::str::FromStr for Trifecta {
    type Err = BlitzError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || BlitzError::InvalidTrifecta(s.to_string());
        let parts: Vec<&str> = s.trim().split('-').collect();
        if parts.len() != 3 {
            return Err(invalid());
        }
        let mut lanes = [0 as Lane; 3];
        for (slot, part) in lanes.iter_mut().zip(&parts) {
            *slot = part.trim().parse().map_err(|_| invalid())?;
        }
        Trifecta::new(lanes[0], lanes[1], lanes[2]).map_err(|_| invalid())
    }
}

impl TryFrom<String> for Trifecta {
    type Error = BlitzError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Trifecta> for String {
    fn from(t: Trifecta) -> Self {
        t.to_string()
    }
}

// ---------------------------------------------------------------------------
// Race records
// ---------------------------------------------------------------------------

/// One boat's pre-race card line.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RaceEntry {
    pub lane: Lane,
    /// Registration number (登録番号); empty when the card had no profile link.
    #[serde(default)]
    pub racer_id: String,
    #[serde(default)]
    pub racer_name: String,
    /// National win rate (全国勝率).
    pub national_rate: f64,
    /// Win rate at this venue (当地勝率).
    pub local_rate: f64,
    #[serde(default)]
    pub motor_no: String,
    /// Motor 2-place rate (%).
    pub motor_2rate: f64,
    /// Average start timing in seconds.
    pub avg_st: f64,
}

impl fmt::Display for RaceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}号艇 {} national={:.2} local={:.2} motor={} ({:.2}%) avgST={:.2}",
            self.lane,
            if self.racer_name.is_empty() { "-" } else { self.racer_name.as_str() },
            self.national_rate,
            self.local_rate,
            if self.motor_no.is_empty() { "-" } else { self.motor_no.as_str() },
            self.motor_2rate,
            self.avg_st,
        )
    }
}

/// Exhibited start timing (展示ST) for one lane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExhibitStart {
    pub lane: Lane,
    pub exhibit_st: f64,
}

/// A finishing position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placing {
    pub rank: u8,
    pub lane: Lane,
}

/// Official start timing for one lane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaneStart {
    pub lane: Lane,
    pub st: f64,
}

/// A decided race.
///
/// `trifecta` is taken from the payout table when available and from the
/// finish order otherwise; the two are kept side by side and never
/// reconciled.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RaceResult {
    pub finish_order: Vec<Placing>,
    pub technique: Option<Technique>,
    pub winning_lane: Option<Lane>,
    pub trifecta: Option<Trifecta>,
    #[serde(default)]
    pub start_times: Vec<LaneStart>,
}

impl RaceResult {
    /// The first three finishers as a trifecta, if they form a valid one.
    pub fn finish_trifecta(&self) -> Option<Trifecta> {
        match self.finish_order.as_slice() {
            [a, b, c, ..] => Trifecta::new(a.lane, b.lane, c.lane).ok(),
            _ => None,
        }
    }

    /// Whether the race was decided at all.
    pub fn is_decided(&self) -> bool {
        !self.finish_order.is_empty() || self.trifecta.is_some()
    }
}

/// The uniform race record shared by daily analysis and the historical
/// corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceRecord {
    #[serde(with = "yyyymmdd")]
    pub date: NaiveDate,
    /// Two-digit venue code.
    pub venue: String,
    #[serde(default)]
    pub venue_name: String,
    pub race_no: u8,
    pub entries: Vec<RaceEntry>,
    #[serde(default)]
    pub exhibit_starts: Vec<ExhibitStart>,
    /// Prior start timings of lane 1's motor, when the collaborator has them.
    #[serde(default)]
    pub motor_st_history: Vec<f64>,
    #[serde(default)]
    pub result: Option<RaceResult>,
}

impl RaceRecord {
    pub fn entry(&self, lane: Lane) -> Option<&RaceEntry> {
        self.entries.iter().find(|e| e.lane == lane)
    }

    /// Exhibited start timings recorded for `lane`, in page order.
    pub fn exhibit_for(&self, lane: Lane) -> Vec<f64> {
        self.exhibit_starts
            .iter()
            .filter(|s| s.lane == lane)
            .map(|s| s.exhibit_st)
            .collect()
    }

    /// Key of the (venue, day) bucket this race belongs to in the corpus.
    pub fn history_key(&self) -> String {
        history_key(&self.venue, self.date)
    }
}

impl fmt::Display for RaceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}R ({} entries)",
            self.date.format("%Y-%m-%d"),
            if self.venue_name.is_empty() { self.venue.as_str() } else { self.venue_name.as_str() },
            self.race_no,
            self.entries.len(),
        )
    }
}

/// Historical corpus: opaque `"{venue}_{yyyymmdd}"` key → races of that day.
pub type History = BTreeMap<String, Vec<RaceRecord>>;

/// Corpus key for a venue and day.
pub fn history_key(venue: &str, date: NaiveDate) -> String {
    format!("{venue}_{}", date.format("%Y%m%d"))
}

/// Serde adapter for `YYYYMMDD` dates, the format the results site uses.
pub mod yyyymmdd {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y%m%d";

    pub fn serialize<S: Serializer>(date: &NaiveDate, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&date.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveDate::parse_from_str(&raw, FORMAT).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Signal verdicts
// ---------------------------------------------------------------------------

/// Condition 1: is lane 1's racer structurally weak?
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaknessVerdict {
    pub triggered: bool,
    /// Every sub-condition that fired, or "not met".
    pub reason: String,
}

/// Summary of a start-timing sample and the normal fitted to it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StartTimeStats {
    pub samples: usize,
    pub mean: f64,
    /// Sample standard deviation (n − 1).
    pub std_dev: f64,
    /// mean + std_dev, the quantity compared to the threshold.
    pub combined: f64,
    /// Fitted location (maximum likelihood).
    pub mu: f64,
    /// Fitted scale (maximum likelihood, n divisor).
    pub sigma: f64,
    /// P(ST > threshold) under the fitted normal.
    pub prob_slow: f64,
    /// Two-sided 95% interval of the fitted normal.
    pub ci_95: (f64, f64),
}

/// Which evidence Condition 2 was decided on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "basis", rename_all = "snake_case")]
pub enum StartSignal {
    /// Enough history to fit a distribution.
    Fitted(StartTimeStats),
    /// Only a single exhibited start was available.
    ExhibitOnly { exhibit_st: f64 },
    /// Nothing to decide on.
    Insufficient,
}

/// Condition 2: is lane 1 likely to start late?
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartVerdict {
    pub triggered: bool,
    pub reason: String,
    pub signal: StartSignal,
}

impl StartVerdict {
    /// P(ST > threshold) when a distribution was fitted, else 0.
    pub fn prob_slow(&self) -> f64 {
        match &self.signal {
            StartSignal::Fitted(stats) => stats.prob_slow,
            _ => 0.0,
        }
    }
}

/// A race flagged as likely to deviate from the lane-1-favored outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChanceRace {
    #[serde(with = "yyyymmdd")]
    pub date: NaiveDate,
    pub venue: String,
    pub venue_name: String,
    pub race_no: u8,
    pub lane1: RaceEntry,
    pub weakness: WeaknessVerdict,
    pub start: StartVerdict,
    /// Estimated lane-1 win probability, in [0.05, 0.95].
    pub lane1_win_prob: f64,
    pub entries: Vec<RaceEntry>,
}

impl fmt::Display for ChanceRace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}R | lane1 {} | P(win)={:.1}% | {} | {}",
            self.venue_name,
            self.race_no,
            self.lane1.racer_name,
            self.lane1_win_prob * 100.0,
            self.weakness.reason,
            self.start.reason,
        )
    }
}

// ---------------------------------------------------------------------------
// Pattern statistics
// ---------------------------------------------------------------------------

/// Per-trifecta tally within a venue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternCount {
    pub count: u32,
    pub probability: f64,
    /// Technique of the most recently counted race with this trifecta.
    pub technique: Technique,
}

/// One entry of a venue's ranked pattern list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedPattern {
    pub trifecta: Trifecta,
    pub count: u32,
    pub probability: f64,
    pub cumulative: f64,
    pub technique: Technique,
}

/// Outcome distribution of one venue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VenuePatternStats {
    pub venue: String,
    pub name: String,
    pub total_races: u32,
    pub filtered_races: u32,
    pub counts: BTreeMap<Trifecta, PatternCount>,
    /// Descending by probability, truncated at the cumulative cutoff.
    pub patterns: Vec<RankedPattern>,
}

impl VenuePatternStats {
    pub fn empty(venue: &str) -> Self {
        Self {
            venue: venue.to_string(),
            name: venue_name(venue),
            total_races: 0,
            filtered_races: 0,
            counts: BTreeMap::new(),
            patterns: Vec::new(),
        }
    }

    /// Cumulative probability covered by the ranked list.
    pub fn coverage(&self) -> f64 {
        self.patterns.last().map(|p| p.cumulative).unwrap_or(0.0)
    }
}

/// Pattern statistics for every venue, keyed by venue code.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatternBook {
    venues: BTreeMap<String, VenuePatternStats>,
}

/// One row of the cross-venue probability table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityRow {
    pub venue: String,
    pub venue_name: String,
    pub trifecta: Trifecta,
    pub probability: f64,
    pub cumulative: f64,
    pub count: u32,
    pub technique: Technique,
}

impl PatternBook {
    pub fn new(venues: BTreeMap<String, VenuePatternStats>) -> Self {
        Self { venues }
    }

    pub fn venue(&self, code: &str) -> Option<&VenuePatternStats> {
        self.venues.get(code)
    }

    /// Ranked patterns of a venue; empty for unknown venues.
    pub fn ranking(&self, code: &str) -> &[RankedPattern] {
        self.venues
            .get(code)
            .map(|v| v.patterns.as_slice())
            .unwrap_or(&[])
    }

    pub fn venues(&self) -> impl Iterator<Item = &VenuePatternStats> {
        self.venues.values()
    }

    pub fn len(&self) -> usize {
        self.venues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.venues.is_empty()
    }

    /// Every ranked pattern of every venue, venues in code order.
    pub fn probability_table(&self) -> Vec<ProbabilityRow> {
        self.venues
            .values()
            .flat_map(|v| {
                v.patterns.iter().map(move |p| ProbabilityRow {
                    venue: v.venue.clone(),
                    venue_name: v.name.clone(),
                    trifecta: p.trifecta,
                    probability: p.probability,
                    cumulative: p.cumulative,
                    count: p.count,
                    technique: p.technique,
                })
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tickets
// ---------------------------------------------------------------------------

/// A recommended trifecta ticket with its stake.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub trifecta: Trifecta,
    /// Probability of the source pattern (not normalized).
    pub probability: f64,
    /// Stake in yen: a positive multiple of the minimum unit.
    pub amount: u64,
    pub technique: Technique,
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ¥{} ({:.1}%, {})",
            self.trifecta,
            self.amount,
            self.probability * 100.0,
            self.technique.label(),
        )
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for BlitzBoat.
///
/// The analysis core degrades instead of failing; these cover values that
/// are invalid outright.
#[derive(Debug, thiserror::Error)]
pub enum BlitzError {
    #[error("Invalid trifecta: {0}")]
    InvalidTrifecta(String),

    #[error("Unknown winning technique: {0}")]
    UnknownTechnique(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error ({path}): {message}")]
    Storage { path: String, message: String },
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- Venue tests --

    #[test]
    fn test_venue_name_known_and_unknown() {
        assert_eq!(venue_name("01"), "桐生");
        assert_eq!(venue_name("24"), "大村");
        assert_eq!(venue_name("99"), "Venue99");
        assert_eq!(VENUES.len(), 24);
    }

    // -- Technique tests --

    #[test]
    fn test_technique_find_prefers_longest_label() {
        assert_eq!(Technique::find_in("決まり手まくり差し"), Some(Technique::OvertakeThrust));
        assert_eq!(Technique::find_in("まくり"), Some(Technique::Overtake));
        assert_eq!(Technique::find_in(" 差し "), Some(Technique::Thrust));
        assert_eq!(Technique::find_in("逃げ"), Some(Technique::LeadingWire));
        assert_eq!(Technique::find_in("不成立"), None);
    }

    #[test]
    fn test_technique_from_str_accepts_label_and_tag() {
        assert_eq!("まくり".parse::<Technique>().unwrap(), Technique::Overtake);
        assert_eq!("Overtake-Thrust".parse::<Technique>().unwrap(), Technique::OvertakeThrust);
        assert_eq!("block-drop".parse::<Technique>().unwrap(), Technique::BlockDrop);
        assert!("sideways".parse::<Technique>().is_err());
    }

    #[test]
    fn test_technique_serializes_site_label() {
        let json = serde_json::to_string(&Technique::OvertakeThrust).unwrap();
        assert_eq!(json, "\"まくり差し\"");
        let back: Technique = serde_json::from_str("\"恵まれ\"").unwrap();
        assert_eq!(back, Technique::Favored);
    }

    // -- Trifecta tests --

    #[test]
    fn test_trifecta_parse_and_display() {
        let t: Trifecta = "2-3-4".parse().unwrap();
        assert_eq!(t.lanes(), [2, 3, 4]);
        assert_eq!(t.first(), 2);
        assert_eq!(t.to_string(), "2-3-4");
    }

    #[test]
    fn test_trifecta_rejects_invalid() {
        assert!("2-2-4".parse::<Trifecta>().is_err());
        assert!("0-1-2".parse::<Trifecta>().is_err());
        assert!("1-2-7".parse::<Trifecta>().is_err());
        assert!("1-2".parse::<Trifecta>().is_err());
        assert!("a-b-c".parse::<Trifecta>().is_err());
    }

    #[test]
    fn test_trifecta_as_json_map_key() {
        let mut m = BTreeMap::new();
        m.insert(Trifecta::new(6, 4, 2).unwrap(), 3u32);
        let json = serde_json::to_string(&m).unwrap();
        assert_eq!(json, r#"{"6-4-2":3}"#);
        let back: BTreeMap<Trifecta, u32> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, m);
    }

    // -- Race record tests --

    fn sample_record() -> RaceRecord {
        RaceRecord {
            date: NaiveDate::from_ymd_opt(2026, 2, 17).unwrap(),
            venue: "01".into(),
            venue_name: "桐生".into(),
            race_no: 3,
            entries: vec![RaceEntry { lane: 1, national_rate: 4.11, ..Default::default() }],
            exhibit_starts: vec![
                ExhibitStart { lane: 1, exhibit_st: 0.15 },
                ExhibitStart { lane: 2, exhibit_st: 0.12 },
            ],
            motor_st_history: Vec::new(),
            result: None,
        }
    }

    #[test]
    fn test_record_date_uses_site_format() {
        let json = serde_json::to_value(sample_record()).unwrap();
        assert_eq!(json["date"], "20260217");
        let back: RaceRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, sample_record());
    }

    #[test]
    fn test_record_history_key_and_lookup() {
        let r = sample_record();
        assert_eq!(r.history_key(), "01_20260217");
        assert_eq!(r.entry(1).unwrap().national_rate, 4.11);
        assert!(r.entry(2).is_none());
        assert_eq!(r.exhibit_for(1), vec![0.15]);
    }

    #[test]
    fn test_result_finish_trifecta() {
        let result = RaceResult {
            finish_order: vec![
                Placing { rank: 1, lane: 6 },
                Placing { rank: 2, lane: 4 },
                Placing { rank: 3, lane: 2 },
            ],
            ..Default::default()
        };
        assert_eq!(result.finish_trifecta().unwrap().to_string(), "6-4-2");
        assert!(result.is_decided());
        assert!(!RaceResult::default().is_decided());
    }

    // -- Pattern book tests --

    #[test]
    fn test_pattern_book_ranking_unknown_venue_is_empty() {
        let book = PatternBook::default();
        assert!(book.ranking("07").is_empty());
        assert!(book.probability_table().is_empty());
    }

    #[test]
    fn test_empty_venue_stats() {
        let v = VenuePatternStats::empty("12");
        assert_eq!(v.name, "住之江");
        assert_eq!(v.filtered_races, 0);
        assert_eq!(v.coverage(), 0.0);
    }
}
