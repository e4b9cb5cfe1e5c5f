use thiserror::Error;

#[derive(Error, Debug)]
pub enum QaError {
    #[error("No uploaded file found")]
    NoDataset,

    #[error("Malformed table: {0}")]
    MalformedTable(String),

    #[error("Ingestion error: {0}")]
    Ingestion(String),

    #[error("Polars error: {0}")]
    Polars(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Summarizer error: {0}")]
    Summarizer(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Request body too large")]
    PayloadTooLarge,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<polars::prelude::PolarsError> for QaError {
    fn from(e: polars::prelude::PolarsError) -> Self {
        QaError::Polars(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, QaError>;
