use thiserror::Error;

#[derive(Error, Debug)]
pub enum KpiError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Workbook error: {0}")]
    Workbook(String),

    #[cfg(feature = "sheets")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Sheets API returned {status}: {body}")]
    Sheets { status: u16, body: String },

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("Source error: {0}")]
    Source(String),

    #[error("Invalid range: {0}")]
    InvalidRange(String),

    #[error("Invalid date: {0} (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, KpiError>;
