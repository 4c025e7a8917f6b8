//! Visualization sinks for update events
//!
//! The chart itself lives outside this service. A sink receives one
//! `UpdateEvent` per accepted record; `ChartSeries` keeps the plotted series
//! in memory for whoever draws them.

use serde::{Deserialize, Serialize};
use types::record::Year;

use crate::events::UpdateEvent;

/// Receiver of per-record chart updates.
pub trait VisualizationSink {
    fn on_update(&mut self, event: &UpdateEvent);
}

/// Bar style for the total series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BarStyle {
    /// Increase or no change from the previous year.
    Rise,
    /// Any decrease from the previous year.
    Decline,
}

/// One plotted year across all series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub year: Year,
    pub total: f64,
    pub female: f64,
    pub male: f64,
    pub style: BarStyle,
    pub anomalous: bool,
}

/// In-memory chart data: total as bars, female and male as lines.
#[derive(Debug, Clone, Default)]
pub struct ChartSeries {
    points: Vec<ChartPoint>,
}

impl ChartSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn points(&self) -> impl Iterator<Item = &ChartPoint> {
        self.points.iter()
    }

    pub fn years(&self) -> Vec<Year> {
        self.points.iter().map(|p| p.year).collect()
    }

    pub fn totals(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.total).collect()
    }

    pub fn females(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.female).collect()
    }

    pub fn males(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.male).collect()
    }

    pub fn styles(&self) -> Vec<BarStyle> {
        self.points.iter().map(|p| p.style).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl VisualizationSink for ChartSeries {
    fn on_update(&mut self, event: &UpdateEvent) {
        let style = if event.decreased {
            BarStyle::Decline
        } else {
            BarStyle::Rise
        };

        self.points.push(ChartPoint {
            year: event.year,
            total: event.total,
            female: event.female,
            male: event.male,
            style,
            anomalous: event.anomalous,
        });
    }
}
