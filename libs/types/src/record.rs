//! Annual life expectancy observations
//!
//! A `YearRecord` is one row of the stream: a year and the total, female and
//! male life expectancy observed for it. Records are immutable once built and
//! are consumed exactly once by the aggregator.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Calendar year of an observation.
///
/// Signed so that decade arithmetic never needs a bounds check.
pub type Year = i32;

/// One annual observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YearRecord {
    pub year: Year,
    pub total: f64,
    pub female: f64,
    pub male: f64,
}

impl YearRecord {
    pub fn new(year: Year, total: f64, female: f64, male: f64) -> Self {
        Self {
            year,
            total,
            female,
            male,
        }
    }

    /// Decade this record belongs to.
    pub fn decade(&self) -> Decade {
        Decade::of(self.year)
    }
}

impl fmt::Display for YearRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (total={}, female={}, male={})",
            self.year, self.total, self.female, self.male
        )
    }
}

/// A ten-year span identified by its first year (1900, 1910, ...).
///
/// Bounds are held as `i64`: the decades around `Year::MIN` and `Year::MAX`
/// start or end outside the `Year` range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Decade(i64);

impl Decade {
    /// Number of years in a decade.
    pub const SPAN: Year = 10;

    /// Decade containing `year`, rounding down to the boundary.
    ///
    /// Floors toward negative infinity, so year -1 lands in decade -10.
    pub fn of(year: Year) -> Self {
        let span = i64::from(Self::SPAN);
        Self(i64::from(year).div_euclid(span) * span)
    }

    /// First year of the decade.
    pub fn start(&self) -> i64 {
        self.0
    }

    /// Last year of the decade (inclusive).
    pub fn end(&self) -> i64 {
        self.0 + i64::from(Self::SPAN) - 1
    }

    pub fn contains(&self, year: Year) -> bool {
        Self::of(year) == *self
    }

    /// Label in `start-end` form, e.g. `1900-1909`.
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Decade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start(), self.end())
    }
}
