use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CreditAnalysisError {
    #[error("Field mapping configuration not found: {0}")]
    MappingConfigNotFound(PathBuf),

    #[error("Invalid field mapping configuration: {0}")]
    InvalidMappingConfig(String),

    #[error("Invalid standards for ratio '{ratio}': {details}")]
    InvalidStandards { ratio: String, details: String },

    #[error("Invalid decision thresholds: reject threshold {reject} exceeds accept threshold {accept}")]
    InvalidThresholds { accept: usize, reject: usize },

    #[error("Non-numeric value for field '{field}' in period '{period}': {value}")]
    NonNumericField {
        period: String,
        field: String,
        value: String,
    },

    #[error("Invalid statement format: {0}")]
    InvalidStatementFormat(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CreditAnalysisError>;
