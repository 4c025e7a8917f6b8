//! Decade reports and their text rendering
//!
//! A `DecadeReport` is the frozen summary of one closed window. Values keep
//! full precision; rounding happens only in `ReportFormatter`.

use serde::{Deserialize, Serialize};
use types::record::{Decade, Year, YearRecord};

/// Summary of one closed decade window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecadeReport {
    pub decade: Decade,
    /// Records accumulated; fewer than ten for a partial decade.
    pub count: usize,
    pub avg_total: f64,
    pub avg_female: f64,
    pub avg_male: f64,
    pub lowest: YearRecord,
    pub highest: YearRecord,
    /// `avg_female - avg_male`.
    pub gender_gap: f64,
    /// Years flagged as significant drops, in arrival order.
    pub anomalous_years: Vec<Year>,
}

impl DecadeReport {
    /// Label in `start-end` form, e.g. `1900-1909`.
    pub fn label(&self) -> String {
        self.decade.label()
    }

    pub fn has_anomalies(&self) -> bool {
        !self.anomalous_years.is_empty()
    }

    /// Whether the decade saw fewer records than it has years.
    pub fn is_partial(&self) -> bool {
        self.count < Decade::SPAN as usize
    }
}

/// Appended to the lowest line when the lowest year is a flagged drop.
pub const LOWEST_DROP_MARKER: &str = " [significant drop]";

/// Renders reports as operator-facing text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportFormatter {
    precision: usize,
}

impl Default for ReportFormatter {
    fn default() -> Self {
        Self { precision: 1 }
    }
}

impl ReportFormatter {
    pub fn new(precision: usize) -> Self {
        Self { precision }
    }

    pub fn precision(&self) -> usize {
        self.precision
    }

    /// Render a report in the multi-line `DECADE REPORT` shape.
    ///
    /// The lowest line carries `LOWEST_DROP_MARKER` when that year was also
    /// flagged. The drop line is omitted when no year was flagged.
    pub fn render(&self, report: &DecadeReport) -> String {
        let p = self.precision;
        let marker = if report.anomalous_years.contains(&report.lowest.year) {
            LOWEST_DROP_MARKER
        } else {
            ""
        };

        let mut lines = vec![
            format!("DECADE REPORT: {}", report.label()),
            format!(
                "Avg. Life Expectancy: Total = {:.*}, Female = {:.*}, Male = {:.*}",
                p, report.avg_total, p, report.avg_female, p, report.avg_male
            ),
            format!(
                "Lowest Life Expectancy: {}{}",
                self.record_line(&report.lowest),
                marker
            ),
            format!(
                "Highest Life Expectancy: {}",
                self.record_line(&report.highest)
            ),
            format!("Gender Gap (Avg.): {:.*} years", p, report.gender_gap),
        ];

        if report.has_anomalies() {
            let years = report
                .anomalous_years
                .iter()
                .map(|y| y.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            lines.push(format!("Significant drop(s) detected in year(s): {}", years));
        }

        lines.join("\n")
    }

    fn record_line(&self, record: &YearRecord) -> String {
        let p = self.precision;
        format!(
            "{} (Total = {:.*}, Female = {:.*}, Male = {:.*})",
            record.year, p, record.total, p, record.female, p, record.male
        )
    }
}
