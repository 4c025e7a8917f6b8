//! Year-over-year drop detection
//!
//! Tracks the previous accepted total across the whole stream. Detection is
//! not decade-scoped: a drop from 1909 to 1910 is still seen, and the
//! aggregator attributes it to the window holding the later year.
//!
//! Totals are compared in `Decimal` after rounding to `COMPARE_SCALE`
//! places, so a one-decimal drop of exactly the threshold (64.4 -> 63.4)
//! is not flagged by f64 representation error.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Decimal places kept when comparing totals.
pub const COMPARE_SCALE: u32 = 6;

/// `None` for non-finite or out-of-range values.
fn to_decimal(value: f64) -> Option<Decimal> {
    Decimal::from_f64_retain(value).map(|d| d.round_dp(COMPARE_SCALE))
}

/// Outcome of comparing one total against its predecessor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DropCheck {
    /// `previous - current`; `None` for the first record of the stream.
    pub delta: Option<f64>,
    /// Any decrease at all.
    pub decreased: bool,
    /// Drop strictly greater than the threshold.
    pub significant: bool,
}

/// Previous-total state carried across decade windows.
#[derive(Debug, Clone, PartialEq)]
pub struct DropDetector {
    threshold: f64,
    threshold_dec: Option<Decimal>,
    previous_total: Option<f64>,
}

impl DropDetector {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            threshold_dec: to_decimal(threshold),
            previous_total: None,
        }
    }

    /// Compare `total` with the previous total, then remember it.
    pub fn observe(&mut self, total: f64) -> DropCheck {
        let check = match self.previous_total {
            Some(previous) => self.compare(previous, total),
            None => DropCheck {
                delta: None,
                decreased: false,
                significant: false,
            },
        };

        self.previous_total = Some(total);
        check
    }

    fn compare(&self, previous: f64, total: f64) -> DropCheck {
        let exact = match (to_decimal(previous), to_decimal(total), self.threshold_dec) {
            (Some(p), Some(t), Some(threshold)) => {
                p.checked_sub(t).map(|delta| (delta, threshold))
            }
            _ => None,
        };

        match exact {
            Some((delta, threshold)) => DropCheck {
                delta: Some(delta.to_f64().unwrap_or(previous - total)),
                decreased: delta > Decimal::ZERO,
                significant: delta > threshold,
            },
            // Values Decimal cannot hold fall back to plain f64.
            None => {
                let delta = previous - total;
                DropCheck {
                    delta: Some(delta),
                    decreased: total < previous,
                    significant: delta > self.threshold,
                }
            }
        }
    }

    pub fn previous_total(&self) -> Option<f64> {
        self.previous_total
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}
