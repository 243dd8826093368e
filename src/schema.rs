use crate::error::SeriesBuilderError;
use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fiscal quarter within a fiscal year. Ordering is chronological
/// (Q1 < Q2 < Q3 < Q4), never lexical.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
pub enum Quarter {
    Q1,
    Q2,
    Q3,
    Q4,
}

impl Quarter {
    pub fn number(self) -> u8 {
        match self {
            Quarter::Q1 => 1,
            Quarter::Q2 => 2,
            Quarter::Q3 => 3,
            Quarter::Q4 => 4,
        }
    }

    /// The quarter following this one; wraps from Q4 back to Q1.
    pub fn next(self) -> Quarter {
        match self {
            Quarter::Q1 => Quarter::Q2,
            Quarter::Q2 => Quarter::Q3,
            Quarter::Q3 => Quarter::Q4,
            Quarter::Q4 => Quarter::Q1,
        }
    }
}

impl fmt::Display for Quarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Q{}", self.number())
    }
}

impl FromStr for Quarter {
    type Err = SeriesBuilderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "Q1" => Ok(Quarter::Q1),
            "Q2" => Ok(Quarter::Q2),
            "Q3" => Ok(Quarter::Q3),
            "Q4" => Ok(Quarter::Q4),
            _ => Err(SeriesBuilderError::InvalidQuarter(s.to_string())),
        }
    }
}

/// Aggregation granularity for labels, series and summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    /// Calendar month buckets, labeled like "Jan-24".
    Month,
    /// Fiscal quarter buckets, labeled like "Q1 FY2025".
    Quarter,
    /// Fiscal year buckets, labeled like "FY2025".
    FiscalYear,
}

impl FromStr for Granularity {
    type Err = SeriesBuilderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "month" => Ok(Granularity::Month),
            "quarter" => Ok(Granularity::Quarter),
            "fiscal_year" => Ok(Granularity::FiscalYear),
            other => Err(SeriesBuilderError::InvalidGranularity(other.to_string())),
        }
    }
}

/// A single validated row of the uploaded dataset.
///
/// `fiscal_year` and `quarter` jointly identify the fiscal quarter the
/// row's `date` falls in; the upstream loader is responsible for keeping
/// them consistent with the configured fiscal calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RevenueRecord {
    #[schemars(description = "Pharmacy name as it appears in the source file")]
    pub pharmacy: String,

    #[schemars(description = "Cluster (regional grouping) the pharmacy belongs to")]
    pub cluster: String,

    #[schemars(
        description = "Date the pharmacy was acquired, if it has been. Absent for pipeline pharmacies."
    )]
    pub acquisition_date: Option<NaiveDate>,

    #[schemars(description = "Metric name this row reports, e.g. 'Total Revenue'")]
    pub metric: String,

    #[schemars(description = "Fiscal year the row belongs to, labeled by the calendar year it ends in")]
    pub fiscal_year: i32,

    #[schemars(description = "Fiscal quarter within the fiscal year")]
    pub quarter: Quarter,

    #[schemars(description = "Calendar date of the observation at month granularity")]
    pub date: NaiveDate,

    #[schemars(description = "Observed value for the metric. Summed as-is, no currency rounding.")]
    pub value: f64,
}

impl RevenueRecord {
    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(RevenueRecord)
    }

    pub fn schema_as_json() -> Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}
