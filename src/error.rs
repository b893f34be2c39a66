use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("No input files found under {0}")]
    NoInputFiles(String),

    #[error("Read error: {0}")]
    Read(String),

    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Row count changed during transformation: expected {expected}, got {actual}")]
    RowCountMismatch { expected: usize, actual: usize },

    #[error("Write error: {0}")]
    Write(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Polars error: {0}")]
    Polars(String),
}

impl From<polars::error::PolarsError> for EtlError {
    fn from(err: polars::error::PolarsError) -> Self {
        EtlError::Polars(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
