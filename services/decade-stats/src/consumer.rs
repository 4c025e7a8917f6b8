//! Channel consumption loop
//!
//! Pulls raw messages off the ordered message channel, parses them into
//! records, runs them through the aggregator, feeds the visualization sink,
//! and logs each closed decade's report.
//!
//! Rejected records (malformed, out-of-order, duplicate) are logged with the
//! offending year or value and skipped; the stream always continues.
//!
//! Stopping:
//! - Channel closed: the stream ended, so the final window is closed and
//!   reported
//! - Shutdown signal: pulling stops and the open window is left as is, so
//!   the caller can inspect it or call `finish`

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};
use types::errors::MalformedRecordError;
use types::message::parse_message;

use crate::aggregator::{IngestError, StreamingAggregator};
use crate::config::ConsumerConfig;
use crate::events::IngestOutput;
use crate::report::{DecadeReport, ReportFormatter};
use crate::sink::VisualizationSink;

/// One message as delivered by the channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delivery {
    /// Position of the message in the stream.
    pub offset: u64,
    /// Raw JSON text.
    pub payload: String,
}

impl Delivery {
    pub fn new(offset: u64, payload: impl Into<String>) -> Self {
        Self {
            offset,
            payload: payload.into(),
        }
    }
}

/// Why a single message was skipped.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RecordRejection {
    #[error("malformed record: {0}")]
    Malformed(#[from] MalformedRecordError),

    #[error("rejected record: {0}")]
    Ingest(#[from] IngestError),
}

/// Why the consumption loop returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Every sender hung up; the final window was closed.
    StreamEnded,
    /// Shutdown was requested; the open window was left open.
    Shutdown,
}

/// Counters kept by the consumption loop.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumerStats {
    pub received: u64,
    pub accepted: u64,
    pub malformed: u64,
    pub out_of_order: u64,
    pub duplicates: u64,
    pub reports_emitted: u64,
}

impl ConsumerStats {
    pub fn rejected(&self) -> u64 {
        self.malformed + self.out_of_order + self.duplicates
    }
}

/// Drives one aggregator from one message stream.
pub struct StreamConsumer<S: VisualizationSink> {
    config: ConsumerConfig,
    aggregator: StreamingAggregator,
    formatter: ReportFormatter,
    sink: S,
    reports: Vec<DecadeReport>,
    stats: ConsumerStats,
}

impl<S: VisualizationSink> StreamConsumer<S> {
    pub fn new(config: ConsumerConfig, sink: S) -> Self {
        let aggregator = StreamingAggregator::new(&config.aggregator);
        let formatter = ReportFormatter::new(config.aggregator.display_precision);

        Self {
            config,
            aggregator,
            formatter,
            sink,
            reports: Vec::new(),
            stats: ConsumerStats::default(),
        }
    }

    /// Parse and ingest one raw message.
    ///
    /// On success the sink has been updated and any closed report recorded.
    pub fn process_message(
        &mut self,
        payload: &str,
    ) -> Result<Option<DecadeReport>, RecordRejection> {
        let record = parse_message(payload)?;
        let IngestOutput { update, closed } = self.aggregator.ingest(record)?;

        self.sink.on_update(&update);

        if let Some(report) = &closed {
            self.emit_report(report);
        }

        Ok(closed)
    }

    /// Handle one delivery, logging and counting any rejection.
    pub fn handle(&mut self, delivery: &Delivery) {
        self.stats.received += 1;
        debug!(
            offset = delivery.offset,
            payload = %delivery.payload,
            "Received message"
        );

        match self.process_message(&delivery.payload) {
            Ok(_) => self.stats.accepted += 1,
            Err(RecordRejection::Malformed(err)) => {
                self.stats.malformed += 1;
                warn!(
                    offset = delivery.offset,
                    payload = %delivery.payload,
                    error = %err,
                    "Dropping malformed record"
                );
            }
            Err(RecordRejection::Ingest(IngestError::OutOfOrder(err))) => {
                self.stats.out_of_order += 1;
                warn!(
                    offset = delivery.offset,
                    year = err.year,
                    last_year = err.last_year,
                    "Dropping out-of-order record"
                );
            }
            Err(RecordRejection::Ingest(IngestError::Duplicate { year })) => {
                self.stats.duplicates += 1;
                warn!(offset = delivery.offset, year, "Dropping duplicate record");
            }
        }
    }

    /// Close the final window at stream end and emit its report.
    pub fn finish(&mut self) -> Option<DecadeReport> {
        let report = self.aggregator.close_final()?;
        self.emit_report(&report);
        Some(report)
    }

    /// Pull deliveries until the channel closes or shutdown is signalled.
    pub async fn run(
        &mut self,
        rx: &mut mpsc::Receiver<Delivery>,
        shutdown: &mut watch::Receiver<bool>,
    ) -> StopReason {
        info!(
            topic = %self.config.topic,
            group_id = %self.config.group_id,
            "Polling messages"
        );

        if *shutdown.borrow_and_update() {
            info!("Shutdown requested before consumption started");
            return StopReason::Shutdown;
        }

        loop {
            tokio::select! {
                biased;

                Ok(()) = shutdown.changed() => {
                    if *shutdown.borrow_and_update() {
                        info!(
                            accepted = self.stats.accepted,
                            open_decade = ?self.aggregator.open_window().map(|w| w.decade()),
                            "Consumer interrupted"
                        );
                        return StopReason::Shutdown;
                    }
                }

                delivery = rx.recv() => match delivery {
                    Some(delivery) => self.handle(&delivery),
                    None => {
                        self.finish();
                        info!(
                            topic = %self.config.topic,
                            received = self.stats.received,
                            accepted = self.stats.accepted,
                            rejected = self.stats.rejected(),
                            reports = self.stats.reports_emitted,
                            "Stream ended, consumer closed"
                        );
                        return StopReason::StreamEnded;
                    }
                },
            }
        }
    }

    pub fn aggregator(&self) -> &StreamingAggregator {
        &self.aggregator
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Reports emitted so far, oldest first.
    pub fn reports(&self) -> &[DecadeReport] {
        &self.reports
    }

    pub fn stats(&self) -> &ConsumerStats {
        &self.stats
    }

    pub fn formatter(&self) -> &ReportFormatter {
        &self.formatter
    }

    /// Consume into the sink and the reports.
    pub fn into_parts(self) -> (S, Vec<DecadeReport>) {
        (self.sink, self.reports)
    }

    fn emit_report(&mut self, report: &DecadeReport) {
        self.stats.reports_emitted += 1;
        info!(
            decade = %report.decade,
            "\n{}",
            self.formatter.render(report)
        );
        self.reports.push(report.clone());
    }
}
