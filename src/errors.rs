use thiserror::Error;

/// Crate-wide service error. Every service entry point returns
/// `Result<_, ServiceError>`. Empty inputs are valid empty results, not
/// errors; only misconfiguration and collaborator failures surface here.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// A request was rejected before any computation started: no horizon
    /// selected, safety percentage out of range, and similar.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Data source error: {0}")]
    DataSourceError(String),

    #[error("Cache error: {0}")]
    CacheError(#[from] crate::cache::CacheError),

    #[error("Export error: {0}")]
    ExportError(String),

    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(errors.to_string())
    }
}

impl From<csv::Error> for ServiceError {
    fn from(err: csv::Error) -> Self {
        ServiceError::ExportError(err.to_string())
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        ServiceError::DataSourceError(err.to_string())
    }
}
