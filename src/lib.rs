//! # Pharmacy Series Builder
//!
//! A library for turning flat pharmacy acquisition/revenue records into
//! ordered, gap-filled series for charting.
//!
//! ## Core concepts
//!
//! - **Records**: validated rows of (pharmacy, cluster, metric, fiscal
//!   year, quarter, calendar month, value), usually ingested from CSV
//! - **Periods**: typed bucket keys at month, fiscal-quarter or
//!   fiscal-year granularity, with chronological ordering and chart labels
//! - **Gap-filling**: an explicit range produces the complete period
//!   sequence between its bounds, so months without data stay visible as
//!   zeros instead of disappearing
//! - **Summaries**: period-over-period percentage change with
//!   current-period selection against an injectable clock
//!
//! ## Example
//!
//! ```rust,ignore
//! use pharmacy_series_builder::*;
//!
//! let records = read_records_from_path("upload.csv")?;
//! let dataset = Dataset::new(records);
//!
//! let aggregator = PeriodAggregator::new(FiscalCalendar::default());
//! let chart = metric_chart(
//!     &aggregator,
//!     &dataset,
//!     "Total Revenue",
//!     Granularity::Quarter,
//!     Some("Q1-FY2025"),
//!     Some("Q4-FY2025"),
//! );
//! let summary = metric_summary(
//!     &aggregator,
//!     &dataset,
//!     "Total Revenue",
//!     Granularity::Quarter,
//!     None,
//!     None,
//! );
//! ```

pub mod aggregator;
pub mod chart;
pub mod dataset;
pub mod error;
pub mod fiscal;
pub mod ingestion;
pub mod period;
pub mod schema;
pub mod utils;

pub use aggregator::{
    ChangeDirection, Clock, FixedClock, PeriodAggregator, PeriodSummary, SeriesPoint, SystemClock,
    TOTAL_SERIES_KEY,
};
pub use chart::{ChartData, ChartDataset};
pub use dataset::{
    AcquisitionStatus, ClusterInfo, Dataset, DatasetStats, DateRange, PharmacyInfo,
};
pub use error::{Result, SeriesBuilderError};
pub use fiscal::{FiscalCalendar, FiscalPeriod};
pub use ingestion::{read_records, read_records_from_path, EXPECTED_COLUMNS};
pub use period::Period;
pub use schema::{Granularity, Quarter, RevenueRecord};

use log::debug;

/// Chart data for one metric of a dataset: the metric filter is applied,
/// then one aligned dataset per pharmacy is built over the shared label
/// sequence.
pub fn metric_chart(
    aggregator: &PeriodAggregator,
    dataset: &Dataset,
    metric: &str,
    granularity: Granularity,
    range_start: Option<&str>,
    range_end: Option<&str>,
) -> ChartData {
    let filtered = dataset.filter_metric(metric);
    debug!(
        "Building {:?} chart for metric '{}' over {} records",
        granularity,
        metric,
        filtered.len()
    );
    ChartData::from_records(aggregator, granularity, &filtered, range_start, range_end)
}

/// Period-over-period summary for one metric of a dataset.
pub fn metric_summary(
    aggregator: &PeriodAggregator,
    dataset: &Dataset,
    metric: &str,
    granularity: Granularity,
    range_start: Option<&str>,
    range_end: Option<&str>,
) -> PeriodSummary {
    let filtered = dataset.filter_metric(metric);
    debug!(
        "Building {:?} summary for metric '{}' over {} records",
        granularity,
        metric,
        filtered.len()
    );
    aggregator.build_percentage_series(granularity, &filtered, range_start, range_end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(pharmacy: &str, metric: &str, fiscal_year: i32, quarter: Quarter, date: NaiveDate, value: f64) -> RevenueRecord {
        RevenueRecord {
            pharmacy: pharmacy.to_string(),
            cluster: "North".to_string(),
            acquisition_date: None,
            metric: metric.to_string(),
            fiscal_year,
            quarter,
            date,
            value,
        }
    }

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_metric_chart_filters_other_metrics() {
        let dataset = Dataset::new(vec![
            record("A", "Total Revenue", 2025, Quarter::Q1, date(2024, 4, 1), 100.0),
            record("A", "Prescriptions", 2025, Quarter::Q1, date(2024, 4, 1), 900.0),
        ]);
        let aggregator = PeriodAggregator::with_clock(
            FiscalCalendar::default(),
            Box::new(FixedClock(date(2024, 8, 1))),
        );

        let chart = metric_chart(
            &aggregator,
            &dataset,
            "Total Revenue",
            Granularity::Quarter,
            None,
            None,
        );
        assert_eq!(chart.datasets.len(), 1);
        assert_eq!(chart.datasets[0].data, vec![100.0]);
    }

    #[test]
    fn test_metric_summary_empty_when_metric_unknown() {
        let dataset = Dataset::new(vec![record(
            "A",
            "Total Revenue",
            2025,
            Quarter::Q1,
            date(2024, 4, 1),
            100.0,
        )]);
        let aggregator = PeriodAggregator::with_clock(
            FiscalCalendar::default(),
            Box::new(FixedClock(date(2024, 8, 1))),
        );

        let summary = metric_summary(
            &aggregator,
            &dataset,
            "Margin",
            Granularity::Month,
            None,
            None,
        );
        assert!(summary.points.is_empty());
        assert_eq!(summary.current_period, None);
    }
}
