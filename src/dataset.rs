use crate::schema::RevenueRecord;
use crate::utils::parse_flexible_date;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

/// Whether a pharmacy has completed acquisition as of a reference date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AcquisitionStatus {
    Acquired,
    Pipeline,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PharmacyInfo {
    pub name: String,
    pub cluster: String,
    pub acquisition_date: Option<NaiveDate>,
    pub status: AcquisitionStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterInfo {
    pub name: String,
    pub pharmacy_count: usize,
    pub pharmacies: Vec<PharmacyInfo>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetStats {
    pub total_rows: usize,
    pub unique_pharmacies: usize,
    pub unique_clusters: usize,
    pub unique_metrics: usize,
    pub date_range: Option<DateRange>,
}

/// An immutable snapshot of the uploaded records.
///
/// The host replaces the whole snapshot on each upload; listings and
/// filters here always return fresh copies, so a snapshot can be shared
/// across concurrent read-only callers.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<RevenueRecord>,
}

impl Dataset {
    pub fn new(records: Vec<RevenueRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[RevenueRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Basic statistics, or `None` for an empty dataset.
    pub fn stats(&self) -> Option<DatasetStats> {
        if self.records.is_empty() {
            return None;
        }

        let mut pharmacies = Vec::new();
        let mut clusters = Vec::new();
        let mut metrics = Vec::new();
        for record in &self.records {
            if !pharmacies.contains(&&record.pharmacy) {
                pharmacies.push(&record.pharmacy);
            }
            if !clusters.contains(&&record.cluster) {
                clusters.push(&record.cluster);
            }
            if !metrics.contains(&&record.metric) {
                metrics.push(&record.metric);
            }
        }

        let start = self.records.iter().map(|r| r.date).min();
        let end = self.records.iter().map(|r| r.date).max();
        let date_range = start.zip(end).map(|(start, end)| DateRange { start, end });

        Some(DatasetStats {
            total_rows: self.records.len(),
            unique_pharmacies: pharmacies.len(),
            unique_clusters: clusters.len(),
            unique_metrics: metrics.len(),
            date_range,
        })
    }

    /// One entry per pharmacy with its acquisition status as of `today`,
    /// sorted by name. Cluster and acquisition date come from the
    /// pharmacy's first row.
    pub fn pharmacies(&self, today: NaiveDate) -> Vec<PharmacyInfo> {
        let mut by_name: BTreeMap<&str, PharmacyInfo> = BTreeMap::new();

        for record in &self.records {
            by_name
                .entry(&record.pharmacy)
                .or_insert_with(|| PharmacyInfo {
                    name: record.pharmacy.clone(),
                    cluster: record.cluster.clone(),
                    acquisition_date: record.acquisition_date,
                    status: acquisition_status(record.acquisition_date, today),
                });
        }

        by_name.into_values().collect()
    }

    /// One entry per cluster with its member pharmacies, sorted by
    /// cluster name.
    pub fn clusters(&self, today: NaiveDate) -> Vec<ClusterInfo> {
        let pharmacies = self.pharmacies(today);
        let mut by_cluster: BTreeMap<String, Vec<PharmacyInfo>> = BTreeMap::new();

        for pharmacy in pharmacies {
            by_cluster
                .entry(pharmacy.cluster.clone())
                .or_default()
                .push(pharmacy);
        }

        by_cluster
            .into_iter()
            .map(|(name, pharmacies)| ClusterInfo {
                name,
                pharmacy_count: pharmacies.len(),
                pharmacies,
            })
            .collect()
    }

    /// Distinct metric names in first-appearance order.
    pub fn metrics(&self) -> Vec<String> {
        let mut metrics: Vec<String> = Vec::new();
        for record in &self.records {
            if !metrics.contains(&record.metric) {
                metrics.push(record.metric.clone());
            }
        }
        metrics
    }

    /// Rows reporting `metric`.
    pub fn filter_metric(&self, metric: &str) -> Vec<RevenueRecord> {
        self.records
            .iter()
            .filter(|record| record.metric == metric)
            .cloned()
            .collect()
    }

    /// Rows for the allow-listed pharmacies; an empty allow-list keeps
    /// everything.
    pub fn filter_pharmacies(&self, pharmacies: &[String]) -> Vec<RevenueRecord> {
        if pharmacies.is_empty() {
            return self.records.clone();
        }

        self.records
            .iter()
            .filter(|record| pharmacies.contains(&record.pharmacy))
            .cloned()
            .collect()
    }

    /// Rows for pharmacies acquired on or before `bound`. An unparseable
    /// bound keeps everything; pharmacies without an acquisition date are
    /// dropped once the filter applies.
    pub fn filter_acquired_on_or_before(&self, bound: &str) -> Vec<RevenueRecord> {
        let Some(cutoff) = parse_flexible_date(bound) else {
            return self.records.clone();
        };

        self.records
            .iter()
            .filter(|record| {
                record
                    .acquisition_date
                    .map(|acquired| acquired <= cutoff)
                    .unwrap_or(false)
            })
            .cloned()
            .collect()
    }
}

fn acquisition_status(acquisition_date: Option<NaiveDate>, today: NaiveDate) -> AcquisitionStatus {
    match acquisition_date {
        Some(acquired) if acquired <= today => AcquisitionStatus::Acquired,
        _ => AcquisitionStatus::Pipeline,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Quarter;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn record(
        pharmacy: &str,
        cluster: &str,
        acquisition_date: Option<NaiveDate>,
        metric: &str,
        day: NaiveDate,
        value: f64,
    ) -> RevenueRecord {
        RevenueRecord {
            pharmacy: pharmacy.to_string(),
            cluster: cluster.to_string(),
            acquisition_date,
            metric: metric.to_string(),
            fiscal_year: 2025,
            quarter: Quarter::Q1,
            date: day,
            value,
        }
    }

    fn sample() -> Dataset {
        Dataset::new(vec![
            record(
                "Beacon",
                "North",
                Some(date(2024, 4, 1)),
                "Total Revenue",
                date(2024, 4, 1),
                100.0,
            ),
            record(
                "Beacon",
                "North",
                Some(date(2024, 4, 1)),
                "Prescriptions",
                date(2024, 5, 1),
                820.0,
            ),
            record(
                "Alder",
                "South",
                None,
                "Total Revenue",
                date(2024, 6, 1),
                40.0,
            ),
        ])
    }

    #[test]
    fn test_stats() {
        let stats = sample().stats().unwrap();
        assert_eq!(stats.total_rows, 3);
        assert_eq!(stats.unique_pharmacies, 2);
        assert_eq!(stats.unique_clusters, 2);
        assert_eq!(stats.unique_metrics, 2);

        let range = stats.date_range.unwrap();
        assert_eq!(range.start, date(2024, 4, 1));
        assert_eq!(range.end, date(2024, 6, 1));
    }

    #[test]
    fn test_stats_empty_dataset() {
        assert_eq!(Dataset::default().stats(), None);
    }

    #[test]
    fn test_pharmacy_listing_with_status() {
        let pharmacies = sample().pharmacies(date(2024, 5, 1));
        assert_eq!(pharmacies.len(), 2);

        // Sorted by name.
        assert_eq!(pharmacies[0].name, "Alder");
        assert_eq!(pharmacies[0].status, AcquisitionStatus::Pipeline);
        assert_eq!(pharmacies[1].name, "Beacon");
        assert_eq!(pharmacies[1].status, AcquisitionStatus::Acquired);
    }

    #[test]
    fn test_future_acquisition_is_pipeline() {
        let pharmacies = sample().pharmacies(date(2024, 3, 1));
        assert!(pharmacies
            .iter()
            .all(|pharmacy| pharmacy.status == AcquisitionStatus::Pipeline));
    }

    #[test]
    fn test_cluster_listing() {
        let clusters = sample().clusters(date(2024, 5, 1));
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].name, "North");
        assert_eq!(clusters[0].pharmacy_count, 1);
        assert_eq!(clusters[0].pharmacies[0].name, "Beacon");
    }

    #[test]
    fn test_metric_listing_first_appearance_order() {
        assert_eq!(sample().metrics(), vec!["Total Revenue", "Prescriptions"]);
    }

    #[test]
    fn test_filter_metric() {
        let filtered = sample().filter_metric("Total Revenue");
        assert_eq!(filtered.len(), 2);
        assert!(filtered.iter().all(|r| r.metric == "Total Revenue"));

        assert!(sample().filter_metric("Margin").is_empty());
    }

    #[test]
    fn test_filter_pharmacies() {
        let dataset = sample();
        assert_eq!(dataset.filter_pharmacies(&[]).len(), 3);

        let filtered = dataset.filter_pharmacies(&["Alder".to_string()]);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].pharmacy, "Alder");
    }

    #[test]
    fn test_filter_acquired_on_or_before() {
        let dataset = sample();

        let filtered = dataset.filter_acquired_on_or_before("Apr-24");
        assert_eq!(filtered.len(), 2);
        assert!(filtered.iter().all(|r| r.pharmacy == "Beacon"));

        // Unparseable bound keeps everything.
        assert_eq!(dataset.filter_acquired_on_or_before("whenever").len(), 3);

        // A bound before every acquisition drops all rows.
        assert!(dataset.filter_acquired_on_or_before("Jan-24").is_empty());
    }

    #[test]
    fn test_filters_do_not_mutate_the_snapshot() {
        let dataset = sample();
        let before = dataset.records().to_vec();
        let _ = dataset.filter_metric("Total Revenue");
        let _ = dataset.filter_pharmacies(&["Beacon".to_string()]);
        assert_eq!(dataset.records(), before.as_slice());
    }
}
