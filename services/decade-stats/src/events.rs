//! Output events of the streaming aggregator
//!
//! Every accepted record yields one `UpdateEvent` for the visualization
//! sink. A record that closes a decade additionally carries the closed
//! window's `DecadeReport`.

use serde::{Deserialize, Serialize};
use types::record::{Year, YearRecord};

use crate::report::DecadeReport;

/// One data point per series for the live chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UpdateEvent {
    pub year: Year,
    pub total: f64,
    pub female: f64,
    pub male: f64,
    /// Total is below the previous accepted total.
    pub decreased: bool,
    /// Year was flagged as a significant drop.
    pub anomalous: bool,
}

impl UpdateEvent {
    pub fn from_record(record: &YearRecord, decreased: bool, anomalous: bool) -> Self {
        Self {
            year: record.year,
            total: record.total,
            female: record.female,
            male: record.male,
            decreased,
            anomalous,
        }
    }
}

/// Everything produced by one successful `ingest` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestOutput {
    pub update: UpdateEvent,
    /// Report of the window this record closed, if it crossed a decade
    /// boundary.
    pub closed: Option<DecadeReport>,
}

impl IngestOutput {
    pub fn closed_decade(&self) -> bool {
        self.closed.is_some()
    }
}
