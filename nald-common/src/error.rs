//! Common error types for the NALD import service

use thiserror::Error;

/// Common result type for import operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the import pipeline
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found in the legacy source
    #[error("Not found: {0}")]
    NotFound(String),

    /// Data integrity error in legacy rows. Carries the legacy
    /// region code and identifier so the unit can be re-run manually
    /// after a source-data fix.
    #[error("Transform error for {region_code}:{legacy_id}: {message}")]
    Transform {
        region_code: i64,
        legacy_id: String,
        message: String,
    },

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Build a data-integrity error with legacy row context
    pub fn transform(region_code: i64, legacy_id: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Transform {
            region_code,
            legacy_id: legacy_id.into(),
            message: message.into(),
        }
    }

    /// Whether the error is worth retrying with backoff.
    ///
    /// Database and I/O failures are assumed transient (unavailable
    /// database, network blips). Data-integrity and configuration
    /// errors are terminal: retrying cannot fix the source data.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Database(_) | Error::Io(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transform_errors_are_terminal() {
        let err = Error::transform(1, "123", "unmapped status code XYZ");
        assert!(!err.is_transient());
        assert_eq!(
            err.to_string(),
            "Transform error for 1:123: unmapped status code XYZ"
        );
    }

    #[test]
    fn io_errors_are_transient() {
        let err = Error::Io(std::io::Error::new(std::io::ErrorKind::Other, "down"));
        assert!(err.is_transient());
    }
}
