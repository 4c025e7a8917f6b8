//! Streaming behavior tests for the decade statistics service
//!
//! Exercises the aggregator the way the consumer drives it: one record at a
//! time, in arrival order, with `close_final` at stream end.
//!
//! Tests include:
//! - Full-decade averages and gender gap
//! - Min/max tie-breaking
//! - Threshold boundary for significant drops, including one-decimal data
//! - Partial final decade
//! - Out-of-order recovery
//! - Two-decade end-to-end scenario

use decade_stats::aggregator::{IngestError, StreamingAggregator};
use decade_stats::config::{AggregatorConfig, ConsumerConfig};
use decade_stats::consumer::{Delivery, StreamConsumer};
use decade_stats::report::{DecadeReport, ReportFormatter};
use decade_stats::sink::{BarStyle, ChartSeries};
use proptest::prelude::*;
use types::errors::OutOfOrderError;
use types::record::{Year, YearRecord};

/// Feed records in order and collect every report, including the final one.
fn run_stream(records: &[YearRecord]) -> Vec<DecadeReport> {
    let mut agg = StreamingAggregator::with_defaults();
    let mut reports = Vec::new();
    for record in records {
        let out = agg.ingest(*record).unwrap();
        reports.extend(out.closed);
    }
    reports.extend(agg.close_final());
    reports
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// 1900-1919 with a steady climb and a single 1.5 year drop in 1915.
fn two_decade_scenario() -> Vec<YearRecord> {
    let mut total = 47.3;
    (1900..1920)
        .map(|year| {
            if year == 1915 {
                total -= 1.5;
            } else if year > 1900 {
                total += 0.8;
            }
            YearRecord::new(year, total, total + 3.0, total - 3.0)
        })
        .collect()
}

#[test]
fn test_full_decade_averages_are_arithmetic_means() {
    let records: Vec<YearRecord> = (0..10)
        .map(|i| {
            let x = i as f64;
            YearRecord::new(1950 + i, 68.2 + 0.3 * x, 71.1 + 0.25 * x, 65.6 + 0.35 * x)
        })
        .collect();

    let reports = run_stream(&records);
    assert_eq!(reports.len(), 1);
    let report = &reports[0];

    let totals: Vec<f64> = records.iter().map(|r| r.total).collect();
    let females: Vec<f64> = records.iter().map(|r| r.female).collect();
    let males: Vec<f64> = records.iter().map(|r| r.male).collect();

    assert_eq!(report.label(), "1950-1959");
    assert_eq!(report.count, 10);
    assert!((report.avg_total - mean(&totals)).abs() < 1e-9);
    assert!((report.avg_female - mean(&females)).abs() < 1e-9);
    assert!((report.avg_male - mean(&males)).abs() < 1e-9);
}

#[test]
fn test_gender_gap_positive_when_female_exceeds_male() {
    let records: Vec<YearRecord> = (1920..1930)
        .map(|year| YearRecord::new(year, 56.0, 58.0, 54.5))
        .collect();

    let report = &run_stream(&records)[0];
    assert!(report.gender_gap > 0.0);
    assert!((report.gender_gap - 3.5).abs() < 1e-9);
}

#[test]
fn test_lowest_is_earliest_of_tied_minimum() {
    let totals = [50.0, 47.0, 52.0, 47.0, 49.0, 47.0];
    let records: Vec<YearRecord> = totals
        .iter()
        .enumerate()
        .map(|(i, &t)| YearRecord::new(1930 + i as Year, t, t + 2.0, t - 2.0))
        .collect();

    let report = &run_stream(&records)[0];
    assert_eq!(report.lowest.year, 1931);
    assert_eq!(report.highest.year, 1932);
}

#[test]
fn test_drop_exactly_at_threshold_not_flagged() {
    let records = vec![
        YearRecord::new(1940, 62.0, 64.0, 60.0),
        YearRecord::new(1941, 61.0, 63.0, 59.0),
    ];
    let report = &run_stream(&records)[0];
    assert!(report.anomalous_years.is_empty());
}

#[test]
fn test_one_decimal_drops_at_threshold_not_flagged() {
    let records = vec![
        YearRecord::new(1950, 64.4, 66.8, 62.0),
        YearRecord::new(1951, 63.4, 65.8, 61.0),
        YearRecord::new(1952, 32.2, 34.2, 30.2),
        YearRecord::new(1953, 31.2, 33.2, 29.2),
    ];
    let report = &run_stream(&records)[0];
    assert!(report.anomalous_years.contains(&1952));
    assert!(!report.anomalous_years.contains(&1951));
    assert!(!report.anomalous_years.contains(&1953));
}

#[test]
fn test_drop_just_above_threshold_flagged() {
    let records = vec![
        YearRecord::new(1940, 62.0, 64.0, 60.0),
        YearRecord::new(1941, 60.75, 63.0, 59.0),
    ];
    let report = &run_stream(&records)[0];
    assert_eq!(report.anomalous_years, vec![1941]);
}

#[test]
fn test_drop_across_decade_boundary_reported_in_later_decade() {
    let records = vec![
        YearRecord::new(1908, 51.0, 53.0, 49.0),
        YearRecord::new(1909, 52.0, 54.0, 50.0),
        YearRecord::new(1910, 50.0, 52.0, 48.0),
        YearRecord::new(1911, 51.0, 53.0, 49.0),
    ];

    let reports = run_stream(&records);
    assert_eq!(reports.len(), 2);
    assert!(reports[0].anomalous_years.is_empty());
    assert_eq!(reports[1].anomalous_years, vec![1910]);
}

#[test]
fn test_partial_final_decade() {
    let records: Vec<YearRecord> = (1900..=1905)
        .map(|year| YearRecord::new(year, 47.0 + (year - 1900) as f64, 49.0, 45.0))
        .collect();

    let reports = run_stream(&records);
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].label(), "1900-1909");
    assert_eq!(reports[0].count, 6);
    assert!((reports[0].avg_total - 49.5).abs() < 1e-9);
}

#[test]
fn test_out_of_order_then_resume() {
    let mut agg = StreamingAggregator::with_defaults();
    for year in 1900..=1905 {
        agg.ingest(YearRecord::new(year, 50.0, 52.0, 48.0)).unwrap();
    }
    let before = agg.open_window().cloned().unwrap();

    let err = agg
        .ingest(YearRecord::new(1903, 10.0, 11.0, 9.0))
        .unwrap_err();
    assert_eq!(
        err,
        IngestError::OutOfOrder(OutOfOrderError {
            year: 1903,
            last_year: 1905
        })
    );
    assert_eq!(agg.open_window().unwrap(), &before);

    let out = agg.ingest(YearRecord::new(1906, 50.5, 52.5, 48.5)).unwrap();
    assert!(out.closed.is_none());
    assert!(!out.update.anomalous);
    assert_eq!(agg.open_window().unwrap().count(), 7);
    assert_eq!(agg.open_window().unwrap().lowest().total, 50.0);
}

#[test]
fn test_two_decade_end_to_end() {
    let records = two_decade_scenario();
    let reports = run_stream(&records);

    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].label(), "1900-1909");
    assert_eq!(reports[1].label(), "1910-1919");
    assert_eq!(reports[0].count, 10);
    assert_eq!(reports[1].count, 10);
    assert!(reports[0].anomalous_years.is_empty());
    assert_eq!(reports[1].anomalous_years, vec![1915]);
    assert!((reports[1].gender_gap - 6.0).abs() < 1e-9);
}

#[test]
fn test_consumer_end_to_end_over_messages() {
    let mut consumer = StreamConsumer::new(ConsumerConfig::default(), ChartSeries::new());

    for (offset, record) in two_decade_scenario().iter().enumerate() {
        consumer.handle(&Delivery::new(offset as u64, record.to_message().unwrap()));
    }
    consumer.handle(&Delivery::new(99, r#"{"year": 1920}"#));
    consumer.finish();

    assert_eq!(consumer.reports().len(), 2);
    assert_eq!(consumer.stats().accepted, 20);
    assert_eq!(consumer.stats().malformed, 1);

    let chart = consumer.sink();
    assert_eq!(chart.len(), 20);
    let declines: Vec<Year> = chart
        .points()
        .filter(|p| p.style == BarStyle::Decline)
        .map(|p| p.year)
        .collect();
    assert_eq!(declines, vec![1915]);

    let text = consumer.formatter().render(&consumer.reports()[1]);
    assert!(text.starts_with("DECADE REPORT: 1910-1919\n"));
    assert!(text.ends_with("Significant drop(s) detected in year(s): 1915"));
}

#[test]
fn test_rendered_report_omits_drop_line_when_clean() {
    let reports = run_stream(&two_decade_scenario());
    let text = ReportFormatter::default().render(&reports[0]);

    assert_eq!(text.lines().count(), 5);
    assert!(!text.contains("Significant drop"));
}

#[test]
fn test_configured_threshold_changes_flags() {
    let config = AggregatorConfig {
        drop_threshold: 2.0,
        ..AggregatorConfig::default()
    };
    let mut agg = StreamingAggregator::new(&config);
    for record in two_decade_scenario() {
        agg.ingest(record).unwrap();
    }
    let report = agg.close_final().unwrap();
    assert!(report.anomalous_years.is_empty());
}

proptest! {
    #[test]
    fn prop_tenths_drop_of_exact_threshold_not_flagged(a in 10i32..1200) {
        let mut agg = StreamingAggregator::with_defaults();
        let previous = a as f64 / 10.0;
        let current = (a - 10) as f64 / 10.0;
        agg.ingest(YearRecord::new(1960, previous, previous, previous)).unwrap();
        let out = agg.ingest(YearRecord::new(1961, current, current, current)).unwrap();
        prop_assert!(!out.update.anomalous);
        prop_assert!(out.update.decreased);
    }

    #[test]
    fn prop_decade_average_matches_mean(
        totals in prop::collection::vec(20.0f64..90.0, 10),
        start in (180i32..210).prop_map(|d| d * 10),
    ) {
        let records: Vec<YearRecord> = totals
            .iter()
            .enumerate()
            .map(|(i, &t)| YearRecord::new(start + i as Year, t, t + 1.0, t - 1.0))
            .collect();

        let reports = run_stream(&records);
        prop_assert_eq!(reports.len(), 1);
        prop_assert!((reports[0].avg_total - mean(&totals)).abs() < 1e-9);
        prop_assert!((reports[0].gender_gap - 2.0).abs() < 1e-9);
    }

    #[test]
    fn prop_lowest_and_highest_are_earliest_extremes(
        totals in prop::collection::vec(prop::sample::select(vec![40.0f64, 45.0, 50.0]), 1..=10),
    ) {
        let records: Vec<YearRecord> = totals
            .iter()
            .enumerate()
            .map(|(i, &t)| YearRecord::new(1960 + i as Year, t, t, t))
            .collect();

        let report = &run_stream(&records)[0];
        let min = totals.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = totals.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let first_min = totals.iter().position(|&t| t == min).unwrap() as Year;
        let first_max = totals.iter().position(|&t| t == max).unwrap() as Year;

        prop_assert_eq!(report.lowest.year, 1960 + first_min);
        prop_assert_eq!(report.highest.year, 1960 + first_max);
    }

    #[test]
    fn prop_out_of_order_never_mutates(
        accepted in 1i32..20,
        back in 1i32..20,
    ) {
        let mut agg = StreamingAggregator::with_defaults();
        for i in 0..accepted {
            agg.ingest(YearRecord::new(1900 + i, 50.0 + i as f64, 52.0, 48.0)).unwrap();
        }
        let window = agg.open_window().cloned();
        let closed = agg.windows_closed();
        let last = 1900 + accepted - 1;

        let result = agg.ingest(YearRecord::new(last - back, 1.0, 1.0, 1.0));
        prop_assert!(result.is_err());
        prop_assert_eq!(agg.open_window().cloned(), window);
        prop_assert_eq!(agg.windows_closed(), closed);
        prop_assert_eq!(agg.last_year(), Some(last));
    }
}
