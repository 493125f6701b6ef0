use thiserror::Error;

use crate::app::ports::StoreError;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("transport envelope invalid: {0}")]
    Envelope(#[from] serde_json::Error),

    #[error("transport envelope contains no records")]
    EmptyEnvelope,

    #[error("required column missing from report: {0}")]
    MissingColumn(&'static str),

    #[error("unparseable timestamp in column {column}: {value:?}")]
    Timestamp {
        column: &'static str,
        value: String,
    },

    #[error("CSV read failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("object store error: {0}")]
    Store(#[from] StoreError),

    #[error("parquet encoding failed: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("arrow batch build failed: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}

pub type Result<T> = std::result::Result<T, IngestError>;
