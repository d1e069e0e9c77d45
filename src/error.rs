use crate::domain::validation::ValidationErrors;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("Validation error: {0}")]
    Validation(ValidationErrors),
    #[error("Failed to submit form: {0}")]
    Submission(String),
    #[error("Failed to register patient: {0}")]
    ProfileRegistration(String),
    #[error("A submission is already in progress")]
    SubmissionInFlight,
    #[error("Cannot {action} while in the {step} step")]
    InvalidStep {
        action: &'static str,
        step: &'static str,
    },
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Access denied: {0}")]
    AccessDenied(String),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Internal error: {0}")]
    Internal(String),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[cfg(feature = "storage-rocksdb")]
    #[error("RocksDB error: {0}")]
    RocksDb(#[from] rocksdb::Error),
}

impl From<ValidationErrors> for BookingError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

pub type Result<T> = std::result::Result<T, BookingError>;
