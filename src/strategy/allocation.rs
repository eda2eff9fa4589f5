//! Budget allocation across ranked patterns.
//!
//! Splits a fixed budget over a venue's ranked trifectas in proportion to
//! their historical probability. Every stake is a whole number of betting
//! units and the stakes always add up to the budget exactly.

use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::types::{RankedPattern, Ticket};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllocationConfig {
    /// Total stake per race, in yen.
    pub budget: u64,
    /// Minimum bet unit, in yen.
    pub unit: u64,
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            budget: 30_000,
            unit: 100,
        }
    }
}

// ---------------------------------------------------------------------------
// Allocator
// ---------------------------------------------------------------------------

/// Round half to even, the way the stakes have always been rounded
/// (`2.5` → 2, `3.5` → 4).
fn round_half_even(x: f64) -> i128 {
    Decimal::from_f64_retain(x)
        .map(|d| d.round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven))
        .and_then(|d| d.to_i128())
        .unwrap_or_else(|| x.round() as i128)
}

#[derive(Debug, Clone)]
pub struct TicketAllocator {
    config: AllocationConfig,
}

impl Default for TicketAllocator {
    fn default() -> Self {
        Self::new(AllocationConfig::default())
    }
}

impl TicketAllocator {
    pub fn new(config: AllocationConfig) -> Self {
        Self { config }
    }

    /// Access the allocation configuration.
    pub fn config(&self) -> &AllocationConfig {
        &self.config
    }

    /// Allocate `budget` (or the configured budget) over `patterns`.
    ///
    /// Steps:
    /// 1. Quantize the budget down to a whole number of units and keep at
    ///    most one pattern per unit.
    /// 2. Stake each pattern `budget × p / Σp`, rounded half-even to units,
    ///    at least one unit.
    /// 3. Add the rounding difference to the first pattern (at least one
    ///    unit), then any residual to the last.
    /// 4. Move whole units from the largest stakes to any stake the
    ///    adjustment left below one unit.
    ///
    /// Input order is preserved. Returns an empty list when there is
    /// nothing to stake on or nothing to stake.
    pub fn allocate_tickets(&self, patterns: &[RankedPattern], budget: Option<u64>) -> Vec<Ticket> {
        let unit = self.config.unit;
        if unit == 0 {
            warn!("Allocation unit is zero, no tickets");
            return Vec::new();
        }
        let requested = budget.unwrap_or(self.config.budget);
        let budget = requested / unit * unit;
        if budget != requested {
            warn!(requested, budget, unit, "Budget is not a multiple of the unit, rounded down");
        }

        let max_tickets = usize::try_from(budget / unit).unwrap_or(usize::MAX);
        let patterns = if patterns.len() > max_tickets {
            warn!(
                patterns = patterns.len(),
                max_tickets,
                "More patterns than betting units, keeping the top ones"
            );
            &patterns[..max_tickets]
        } else {
            patterns
        };
        if patterns.is_empty() {
            return Vec::new();
        }

        let weight = |p: &RankedPattern| {
            if p.probability.is_finite() && p.probability > 0.0 {
                p.probability
            } else {
                0.0
            }
        };
        let total: f64 = patterns.iter().map(weight).sum();
        if total <= 0.0 {
            debug!(patterns = patterns.len(), "Zero total probability, no tickets");
            return Vec::new();
        }

        // Widened so budgets up to u64::MAX cannot overflow the adjustments.
        let (budget, unit) = (i128::from(budget), i128::from(unit));
        let mut amounts: Vec<i128> = patterns
            .iter()
            .map(|p| {
                let raw = budget as f64 * (weight(p) / total);
                (round_half_even(raw / unit as f64) * unit).max(unit)
            })
            .collect();

        let diff = budget - amounts.iter().sum::<i128>();
        if diff != 0 {
            amounts[0] = (amounts[0] + diff).max(unit);
        }
        let residual = budget - amounts.iter().sum::<i128>();
        if residual != 0 {
            if let Some(last) = amounts.last_mut() {
                *last += residual;
            }
        }
        repair_below_unit(&mut amounts, unit);

        debug!(
            tickets = amounts.len(),
            budget,
            first_adjustment = diff,
            last_adjustment = residual,
            "Tickets allocated"
        );

        patterns
            .iter()
            .zip(amounts)
            .map(|(p, amount)| Ticket {
                trifecta: p.trifecta,
                probability: p.probability,
                amount: u64::try_from(amount).unwrap_or(0),
                technique: p.technique,
            })
            .collect()
    }
}

/// Lift every stake below one unit by taking whole units from the largest
/// other stake (first one on ties). Feasible because the caller guarantees
/// `Σ amounts ≥ len × unit`.
fn repair_below_unit(amounts: &mut [i128], unit: i128) {
    for i in 0..amounts.len() {
        while amounts[i] < unit {
            let mut donor: Option<usize> = None;
            for (j, &a) in amounts.iter().enumerate() {
                if j != i && a > unit && donor.map_or(true, |d| a > amounts[d]) {
                    donor = Some(j);
                }
            }
            let Some(j) = donor else {
                return;
            };
            amounts[j] -= unit;
            amounts[i] += unit;
        }
    }
}

/// [`TicketAllocator::allocate_tickets`] with the default budget and unit.
pub fn allocate_tickets(patterns: &[RankedPattern], budget: Option<u64>) -> Vec<Ticket> {
    TicketAllocator::default().allocate_tickets(patterns, budget)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
