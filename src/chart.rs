use crate::aggregator::PeriodAggregator;
use crate::schema::{Granularity, RevenueRecord};
use serde::Serialize;

/// One pharmacy's aligned value sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartDataset {
    pub label: String,
    pub data: Vec<f64>,
}

/// Chart-ready labels and datasets. Every dataset has exactly one value
/// per label; periods a pharmacy has no data for report `0.0`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<ChartDataset>,
}

impl ChartData {
    /// Builds one dataset per pharmacy over the shared label sequence.
    /// Datasets keep first-appearance order so series colors stay stable
    /// across renders of the same upload.
    pub fn from_records(
        aggregator: &PeriodAggregator,
        granularity: Granularity,
        records: &[RevenueRecord],
        range_start: Option<&str>,
        range_end: Option<&str>,
    ) -> ChartData {
        let labels = aggregator.build_labels(granularity, records, range_start, range_end);
        let series = aggregator.build_series(granularity, records, &labels, true);

        let mut pharmacies: Vec<&str> = Vec::new();
        for record in records {
            if !pharmacies.contains(&record.pharmacy.as_str()) {
                pharmacies.push(&record.pharmacy);
            }
        }

        let datasets = pharmacies
            .into_iter()
            .filter_map(|pharmacy| {
                series.get(pharmacy).map(|data| ChartDataset {
                    label: pharmacy.to_string(),
                    data: data.clone(),
                })
            })
            .collect();

        ChartData {
            labels: labels.iter().map(|period| period.to_string()).collect(),
            datasets,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::FixedClock;
    use crate::fiscal::FiscalCalendar;
    use crate::schema::Quarter;
    use chrono::NaiveDate;

    fn record(pharmacy: &str, fiscal_year: i32, quarter: Quarter, date: NaiveDate, value: f64) -> RevenueRecord {
        RevenueRecord {
            pharmacy: pharmacy.to_string(),
            cluster: "North".to_string(),
            acquisition_date: None,
            metric: "Total Revenue".to_string(),
            fiscal_year,
            quarter,
            date,
            value,
        }
    }

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn aggregator() -> PeriodAggregator {
        PeriodAggregator::with_clock(
            FiscalCalendar::default(),
            Box::new(FixedClock(date(2024, 9, 1))),
        )
    }

    #[test]
    fn test_datasets_align_and_zero_fill() {
        let records = vec![
            record("Beacon", 2025, Quarter::Q1, date(2024, 4, 1), 100.0),
            record("Alder", 2025, Quarter::Q1, date(2024, 4, 1), 40.0),
            record("Beacon", 2025, Quarter::Q2, date(2024, 7, 1), 120.0),
        ];

        let chart = ChartData::from_records(&aggregator(), Granularity::Quarter, &records, None, None);

        assert_eq!(chart.labels, vec!["Q1 FY2025", "Q2 FY2025"]);
        assert_eq!(chart.datasets.len(), 2);

        // First-appearance order, not alphabetical.
        assert_eq!(chart.datasets[0].label, "Beacon");
        assert_eq!(chart.datasets[0].data, vec![100.0, 120.0]);
        assert_eq!(chart.datasets[1].label, "Alder");
        assert_eq!(chart.datasets[1].data, vec![40.0, 0.0]);
    }

    #[test]
    fn test_empty_records_produce_empty_chart() {
        let chart = ChartData::from_records(&aggregator(), Granularity::Month, &[], None, None);
        assert!(chart.labels.is_empty());
        assert!(chart.datasets.is_empty());
    }

    #[test]
    fn test_range_extends_labels_for_all_datasets() {
        let records = vec![
            record("Beacon", 2025, Quarter::Q1, date(2024, 4, 1), 100.0),
            record("Alder", 2025, Quarter::Q1, date(2024, 6, 1), 40.0),
        ];

        let chart = ChartData::from_records(
            &aggregator(),
            Granularity::Month,
            &records,
            Some("2024-04"),
            Some("2024-06"),
        );

        assert_eq!(chart.labels, vec!["Apr-24", "May-24", "Jun-24"]);
        for dataset in &chart.datasets {
            assert_eq!(dataset.data.len(), chart.labels.len());
        }
        assert_eq!(chart.datasets[0].data, vec![100.0, 0.0, 0.0]);
        assert_eq!(chart.datasets[1].data, vec![0.0, 0.0, 40.0]);
    }

    #[test]
    fn test_serializes_to_chart_payload() {
        let records = vec![record("Beacon", 2025, Quarter::Q1, date(2024, 4, 1), 100.0)];
        let chart = ChartData::from_records(&aggregator(), Granularity::Quarter, &records, None, None);

        let json = serde_json::to_value(&chart).unwrap();
        assert_eq!(json["labels"][0], "Q1 FY2025");
        assert_eq!(json["datasets"][0]["label"], "Beacon");
        assert_eq!(json["datasets"][0]["data"][0], 100.0);
    }
}
