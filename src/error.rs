use thiserror::Error;

#[derive(Error, Debug)]
pub enum SeriesBuilderError {
    #[error("Missing required columns: {0:?}")]
    MissingColumns(Vec<String>),

    #[error("Row {line}: {details}")]
    InvalidRecord { line: usize, details: String },

    #[error("Invalid quarter label '{0}': expected Q1, Q2, Q3 or Q4")]
    InvalidQuarter(String),

    #[error("Invalid fiscal year start month {0}: must be between 1 and 12")]
    InvalidFiscalStartMonth(u32),

    #[error("Invalid granularity '{0}': expected month, quarter or fiscal_year")]
    InvalidGranularity(String),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SeriesBuilderError>;
