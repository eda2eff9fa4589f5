//! Chance race detection.
//!
//! Two independent conditions are evaluated against lane 1:
//!
//! 1. **Weak racer**: low national win rate, or a national rate well above
//!    the racer's rate at this venue.
//! 2. **Slow start**: the motor's start timings, fitted to a normal
//!    distribution, sit late enough that lane 1 is likely to be beaten to
//!    the first turn.
//!
//! A race where both fire is a chance race: the inside boat, normally the
//! heavy favorite, is expected to underperform.

use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};
use tracing::{debug, info};

use crate::types::{
    ChanceRace, RaceRecord, StartSignal, StartTimeStats, StartVerdict, WeaknessVerdict,
};

const NOT_MET: &str = "not met";

// ---------------------------------------------------------------------------
// Configuration (defaults, overridden by config.toml at runtime)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    /// Condition 1 fires below this national win rate (T1).
    pub national_rate_threshold: f64,
    /// Condition 1 fires when national − local exceeds this (T2).
    pub rate_diff_threshold: f64,
    /// Start timing considered slow, in seconds (T3).
    pub st_slow_threshold: f64,
    /// Samples needed before a distribution is fitted.
    pub min_history: usize,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            national_rate_threshold: 4.5,
            rate_diff_threshold: 1.5,
            st_slow_threshold: 0.18,
            min_history: 2,
        }
    }
}

// ---------------------------------------------------------------------------
// Condition 1
// ---------------------------------------------------------------------------

/// Condition 1 with explicit thresholds.
fn weakness(national: f64, local: f64, config: &SignalConfig) -> WeaknessVerdict {
    let mut reasons = Vec::new();

    if national < config.national_rate_threshold {
        reasons.push(format!(
            "national rate {national:.2} < {}",
            config.national_rate_threshold
        ));
    }
    let diff = national - local;
    if diff > config.rate_diff_threshold {
        reasons.push(format!(
            "national - local = {diff:.2} > {}",
            config.rate_diff_threshold
        ));
    }

    WeaknessVerdict {
        triggered: !reasons.is_empty(),
        reason: if reasons.is_empty() {
            NOT_MET.to_string()
        } else {
            reasons.join(" / ")
        },
    }
}

/// Condition 1 under the default thresholds.
pub fn is_lane1_weak(national: f64, local: f64) -> WeaknessVerdict {
    weakness(national, local, &SignalConfig::default())
}

// ---------------------------------------------------------------------------
// Condition 2
// ---------------------------------------------------------------------------

/// Mean, sample spread and fitted normal of a start-timing sample.
///
/// The fit is the maximum-likelihood one (population scale), while the
/// threshold test uses the Bessel-corrected spread. A sample with no spread
/// cannot be fitted; it is treated as a point mass at its mean.
pub fn fit_start_times(samples: &[f64], threshold: f64) -> Option<StartTimeStats> {
    let n = samples.len();
    if n < 2 {
        return None;
    }
    let nf = n as f64;
    let mean = samples.iter().sum::<f64>() / nf;
    let ss: f64 = samples.iter().map(|x| (x - mean).powi(2)).sum();
    let std_dev = (ss / (nf - 1.0)).sqrt();
    let sigma = (ss / nf).sqrt();

    let (prob_slow, ci_95) = match Normal::new(mean, sigma) {
        Ok(normal) => (
            normal.sf(threshold),
            (normal.inverse_cdf(0.025), normal.inverse_cdf(0.975)),
        ),
        Err(_) => {
            let p = if mean > threshold { 1.0 } else { 0.0 };
            (p, (mean, mean))
        }
    };

    Some(StartTimeStats {
        samples: n,
        mean,
        std_dev,
        combined: mean + std_dev,
        mu: mean,
        sigma,
        prob_slow,
        ci_95,
    })
}

fn start_verdict(history: &[f64], exhibit: Option<f64>, config: &SignalConfig) -> StartVerdict {
    let threshold = config.st_slow_threshold;
    let samples: Vec<f64> = history.iter().copied().filter(|v| v.is_finite()).collect();

    if samples.len() >= config.min_history.max(2) {
        if let Some(stats) = fit_start_times(&samples, threshold) {
            let triggered = stats.combined > threshold;
            let reason = if triggered {
                format!(
                    "avg({:.4}) + std({:.4}) = {:.4} > {}",
                    stats.mean, stats.std_dev, stats.combined, threshold
                )
            } else {
                NOT_MET.to_string()
            };
            return StartVerdict {
                triggered,
                reason,
                signal: StartSignal::Fitted(stats),
            };
        }
    }

    match exhibit.filter(|v| v.is_finite()) {
        Some(exhibit_st) => {
            let triggered = exhibit_st > threshold;
            StartVerdict {
                triggered,
                reason: if triggered {
                    format!("exhibit ST {exhibit_st:.2} > {threshold}")
                } else {
                    NOT_MET.to_string()
                },
                signal: StartSignal::ExhibitOnly { exhibit_st },
            }
        }
        None => StartVerdict {
            triggered: false,
            reason: "insufficient data".to_string(),
            signal: StartSignal::Insufficient,
        },
    }
}

/// Condition 2 under the default thresholds.
///
/// `history` is a list of past start timings; `exhibit` is lane 1's
/// exhibited start, used alone when the history is too short to fit.
pub fn is_start_slow(history: &[f64], exhibit: Option<f64>) -> StartVerdict {
    start_verdict(history, exhibit, &SignalConfig::default())
}

// ---------------------------------------------------------------------------
// Win probability
// ---------------------------------------------------------------------------

/// Heuristic lane-1 win probability in [0.05, 0.95].
///
/// Starts from the national rate (capped at 0.70), adjusts by the
/// national/local gap, penalizes a likely slow start, then adds the inside
/// lane's structural advantage.
pub fn estimate_win_probability(national: f64, local: f64, prob_slow: f64) -> f64 {
    if !(national.is_finite() && local.is_finite() && prob_slow.is_finite()) {
        return 0.05;
    }
    let mut p = (national / 13.0).min(0.70);

    let diff = national - local;
    if diff > 0.0 {
        p -= diff * 0.03;
    } else if diff < 0.0 {
        p += diff.abs() * 0.02;
    }

    if prob_slow > 0.5 {
        p -= prob_slow * 0.15;
    }

    p += 0.15;
    p.clamp(0.05, 0.95)
}

// ---------------------------------------------------------------------------
// Detector
// ---------------------------------------------------------------------------

/// Flags chance races in a day's card.
#[derive(Debug, Clone, Default)]
pub struct SignalDetector {
    config: SignalConfig,
}

impl SignalDetector {
    pub fn new(config: SignalConfig) -> Self {
        Self { config }
    }

    /// Access the signal configuration.
    pub fn config(&self) -> &SignalConfig {
        &self.config
    }

    pub fn is_lane1_weak(&self, national: f64, local: f64) -> WeaknessVerdict {
        weakness(national, local, &self.config)
    }

    pub fn is_start_slow(&self, history: &[f64], exhibit: Option<f64>) -> StartVerdict {
        start_verdict(history, exhibit, &self.config)
    }

    /// Evaluate one race. `None` unless both conditions fire.
    ///
    /// The motor's start history is preferred; when the collector had none,
    /// lane 1's exhibited starts stand in for it.
    pub fn evaluate(&self, race: &RaceRecord) -> Option<ChanceRace> {
        let Some(lane1) = race.entry(1) else {
            debug!(venue = %race.venue, race_no = race.race_no, "No lane 1 entry, skipping");
            return None;
        };

        let weakness = self.is_lane1_weak(lane1.national_rate, lane1.local_rate);

        let exhibits = race.exhibit_for(1);
        let history: &[f64] = if race.motor_st_history.is_empty() {
            &exhibits
        } else {
            &race.motor_st_history
        };
        let start = self.is_start_slow(history, exhibits.first().copied());

        debug!(
            venue = %race.venue,
            race_no = race.race_no,
            weak = weakness.triggered,
            slow = start.triggered,
            weak_reason = %weakness.reason,
            slow_reason = %start.reason,
            "Lane 1 evaluated"
        );

        if !(weakness.triggered && start.triggered) {
            return None;
        }

        let lane1_win_prob =
            estimate_win_probability(lane1.national_rate, lane1.local_rate, start.prob_slow());

        Some(ChanceRace {
            date: race.date,
            venue: race.venue.clone(),
            venue_name: race.venue_name.clone(),
            race_no: race.race_no,
            lane1: lane1.clone(),
            weakness,
            start,
            lane1_win_prob,
            entries: race.entries.clone(),
        })
    }

    /// Every chance race in `races`, lowest lane-1 win probability first.
    pub fn detect_chance_races(&self, races: &[RaceRecord]) -> Vec<ChanceRace> {
        let mut chances: Vec<ChanceRace> = races.iter().filter_map(|r| self.evaluate(r)).collect();

        // Stable: equal probabilities keep card order.
        chances.sort_by(|a, b| {
            a.lane1_win_prob
                .partial_cmp(&b.lane1_win_prob)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        info!(
            races_in = races.len(),
            chance_races = chances.len(),
            "Chance race detection complete"
        );
        chances
    }
}

/// [`SignalDetector::detect_chance_races`] with the default thresholds.
pub fn detect_chance_races(races: &[RaceRecord]) -> Vec<ChanceRace> {
    SignalDetector::default().detect_chance_races(races)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
