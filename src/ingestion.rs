use crate::error::{Result, SeriesBuilderError};
use crate::schema::{Quarter, RevenueRecord};
use crate::utils::{parse_fiscal_year, parse_flexible_date};
use log::info;
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

/// Column headers the upload must carry. Extra columns are ignored.
pub const EXPECTED_COLUMNS: [&str; 8] = [
    "Pharmacy",
    "Cluster",
    "Acquisition_Date",
    "Metric",
    "Fiscal_Year",
    "Quarter",
    "Date",
    "Value",
];

#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(rename = "Pharmacy")]
    pharmacy: String,
    #[serde(rename = "Cluster")]
    cluster: String,
    #[serde(rename = "Acquisition_Date")]
    acquisition_date: Option<String>,
    #[serde(rename = "Metric")]
    metric: String,
    #[serde(rename = "Fiscal_Year")]
    fiscal_year: String,
    #[serde(rename = "Quarter")]
    quarter: String,
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Value")]
    value: f64,
}

/// Reads an uploaded CSV into validated records.
///
/// Structural problems (missing columns, a required field that does not
/// parse) fail hard with the offending line number; the optional
/// acquisition date soft-fails to `None` instead.
pub fn read_records<R: Read>(reader: R) -> Result<Vec<RevenueRecord>> {
    let mut csv_reader = csv::Reader::from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let missing: Vec<String> = EXPECTED_COLUMNS
        .iter()
        .filter(|expected| !headers.iter().any(|header| header == **expected))
        .map(|expected| expected.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(SeriesBuilderError::MissingColumns(missing));
    }

    let mut records = Vec::new();
    for (index, row) in csv_reader.deserialize::<RawRecord>().enumerate() {
        // Line numbers are 1-based and the header occupies line 1.
        let line = index + 2;
        records.push(convert_row(row?, line)?);
    }

    info!("Ingested {} revenue records", records.len());
    Ok(records)
}

pub fn read_records_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<RevenueRecord>> {
    let file = std::fs::File::open(path)?;
    read_records(file)
}

fn convert_row(row: RawRecord, line: usize) -> Result<RevenueRecord> {
    let date = parse_flexible_date(&row.date).ok_or_else(|| SeriesBuilderError::InvalidRecord {
        line,
        details: format!("unparseable date '{}'", row.date),
    })?;

    let fiscal_year =
        parse_fiscal_year(&row.fiscal_year).ok_or_else(|| SeriesBuilderError::InvalidRecord {
            line,
            details: format!("unparseable fiscal year '{}'", row.fiscal_year),
        })?;

    let quarter: Quarter =
        row.quarter
            .parse()
            .map_err(|_| SeriesBuilderError::InvalidRecord {
                line,
                details: format!("invalid quarter '{}'", row.quarter),
            })?;

    let acquisition_date = row
        .acquisition_date
        .as_deref()
        .and_then(parse_flexible_date);

    Ok(RevenueRecord {
        pharmacy: row.pharmacy,
        cluster: row.cluster,
        acquisition_date,
        metric: row.metric,
        fiscal_year,
        quarter,
        date,
        value: row.value,
    })
}
