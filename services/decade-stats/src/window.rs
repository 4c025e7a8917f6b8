//! Decade window accumulator
//!
//! Running statistics for one ten-year span: record count, sums of the
//! three series, lowest and highest record by total, and the years flagged
//! as significant drops.
//!
//! Sums are accumulated and averages computed only when the window closes,
//! so rounding error does not compound across updates. Closing consumes the
//! window, so a closed window can never be mutated again.

use serde::{Deserialize, Serialize};
use types::record::{Decade, Year, YearRecord};

use crate::report::DecadeReport;

/// The open (mutable) accumulator for a single decade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecadeWindow {
    decade: Decade,
    count: usize,
    sum_total: f64,
    sum_female: f64,
    sum_male: f64,
    /// Lowest record by total; ties keep the earliest.
    lowest: YearRecord,
    /// Highest record by total; ties keep the earliest.
    highest: YearRecord,
    anomalous_years: Vec<Year>,
}

impl DecadeWindow {
    /// Open a window seeded with the first record of its decade.
    pub fn open(record: &YearRecord) -> Self {
        Self {
            decade: record.decade(),
            count: 1,
            sum_total: record.total,
            sum_female: record.female,
            sum_male: record.male,
            lowest: *record,
            highest: *record,
            anomalous_years: Vec::new(),
        }
    }

    /// Fold a record of the same decade into the running statistics.
    pub fn accumulate(&mut self, record: &YearRecord) {
        debug_assert!(self.decade.contains(record.year));

        self.count += 1;
        self.sum_total += record.total;
        self.sum_female += record.female;
        self.sum_male += record.male;

        // Strict comparisons: the first record seen wins a tie.
        if record.total < self.lowest.total {
            self.lowest = *record;
        }
        if record.total > self.highest.total {
            self.highest = *record;
        }
    }

    /// Record that `year` was a significant drop.
    pub fn flag_anomaly(&mut self, year: Year) {
        self.anomalous_years.push(year);
    }

    /// Freeze the window into its report.
    pub fn close(self) -> DecadeReport {
        let count = self.count as f64;
        let avg_total = self.sum_total / count;
        let avg_female = self.sum_female / count;
        let avg_male = self.sum_male / count;

        DecadeReport {
            decade: self.decade,
            count: self.count,
            avg_total,
            avg_female,
            avg_male,
            lowest: self.lowest,
            highest: self.highest,
            gender_gap: avg_female - avg_male,
            anomalous_years: self.anomalous_years,
        }
    }

    pub fn decade(&self) -> Decade {
        self.decade
    }

    /// Number of records accumulated so far.
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn sum_total(&self) -> f64 {
        self.sum_total
    }

    pub fn sum_female(&self) -> f64 {
        self.sum_female
    }

    pub fn sum_male(&self) -> f64 {
        self.sum_male
    }

    pub fn lowest(&self) -> &YearRecord {
        &self.lowest
    }

    pub fn highest(&self) -> &YearRecord {
        &self.highest
    }

    pub fn anomalous_years(&self) -> &[Year] {
        &self.anomalous_years
    }
}
