//! Streaming decade aggregator
//!
//! Consumes records one at a time in arrival order and keeps exactly one
//! open decade window. A record from a later decade closes the open window
//! and returns its report before opening the next one; `close_final` closes
//! whatever is open when the stream ends.
//!
//! Ordering invariants:
//! - Years strictly increase across accepted records
//! - A rejected record leaves every piece of state untouched
//! - Closed windows are consumed into reports and never revisited
//!
//! The aggregator does no I/O. It holds no reference to the chart or the
//! report formatter; all outputs are returned to the caller.

use tracing::{debug, info};
use types::errors::OutOfOrderError;
use types::record::{Year, YearRecord};

use crate::anomaly::DropDetector;
use crate::config::AggregatorConfig;
use crate::events::{IngestOutput, UpdateEvent};
use crate::report::DecadeReport;
use crate::window::DecadeWindow;

/// Errors that reject a single record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IngestError {
    #[error(transparent)]
    OutOfOrder(#[from] OutOfOrderError),

    #[error("duplicate record: year {year} already accepted")]
    Duplicate { year: Year },
}

/// Stateful decade aggregator for a single record stream.
#[derive(Debug, Clone)]
pub struct StreamingAggregator {
    /// Currently open window, if any record has been accepted.
    window: Option<DecadeWindow>,
    /// Previous-total state, carried across windows.
    detector: DropDetector,
    /// Year of the last accepted record.
    last_year: Option<Year>,
    /// Total records accepted since creation.
    records_accepted: u64,
    /// Total windows closed since creation.
    windows_closed: u64,
}

impl StreamingAggregator {
    pub fn new(config: &AggregatorConfig) -> Self {
        info!(
            drop_threshold = config.drop_threshold,
            "StreamingAggregator initialized"
        );

        Self {
            window: None,
            detector: DropDetector::new(config.drop_threshold),
            last_year: None,
            records_accepted: 0,
            windows_closed: 0,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(&AggregatorConfig::default())
    }

    /// Ingest a single record.
    ///
    /// Returns the update event for the record and, when the record belongs
    /// to a later decade than the open window, the report of the window it
    /// closed.
    pub fn ingest(&mut self, record: YearRecord) -> Result<IngestOutput, IngestError> {
        // Validate before touching any state.
        if let Some(last_year) = self.last_year {
            if record.year < last_year {
                return Err(OutOfOrderError {
                    year: record.year,
                    last_year,
                }
                .into());
            }
            if record.year == last_year {
                return Err(IngestError::Duplicate { year: record.year });
            }
        }

        let decade = record.decade();

        // Years only increase, so a different decade is a later one.
        let crosses_boundary = self
            .window
            .as_ref()
            .map_or(false, |open| open.decade() != decade);
        let closed = if crosses_boundary {
            self.close_open()
        } else {
            None
        };

        let check = self.detector.observe(record.total);

        match self.window.as_mut() {
            Some(window) => window.accumulate(&record),
            None => {
                info!(decade = %decade, year = record.year, "Opening decade window");
                self.window = Some(DecadeWindow::open(&record));
            }
        }

        if check.significant {
            if let Some(window) = self.window.as_mut() {
                window.flag_anomaly(record.year);
            }
            info!(
                year = record.year,
                delta = check.delta.unwrap_or_default(),
                threshold = self.detector.threshold(),
                "Significant drop detected"
            );
        }

        self.last_year = Some(record.year);
        self.records_accepted += 1;

        debug!(
            year = record.year,
            total = record.total,
            decreased = check.decreased,
            "Record accepted"
        );

        Ok(IngestOutput {
            update: UpdateEvent::from_record(&record, check.decreased, check.significant),
            closed,
        })
    }

    /// Close the open window at stream end.
    ///
    /// Returns `None` if no record was ever accepted or the window was
    /// already closed.
    pub fn close_final(&mut self) -> Option<DecadeReport> {
        self.close_open()
    }

    /// Window currently accumulating, if any.
    pub fn open_window(&self) -> Option<&DecadeWindow> {
        self.window.as_ref()
    }

    /// Year of the last accepted record, if any.
    pub fn last_year(&self) -> Option<Year> {
        self.last_year
    }

    /// Total of the last accepted record, if any.
    pub fn previous_total(&self) -> Option<f64> {
        self.detector.previous_total()
    }

    pub fn records_accepted(&self) -> u64 {
        self.records_accepted
    }

    pub fn windows_closed(&self) -> u64 {
        self.windows_closed
    }

    fn close_open(&mut self) -> Option<DecadeReport> {
        let window = self.window.take()?;
        let report = window.close();
        self.windows_closed += 1;

        info!(
            decade = %report.decade,
            count = report.count,
            anomalies = report.anomalous_years.len(),
            "Decade window closed"
        );

        Some(report)
    }
}
