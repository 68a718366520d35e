//! Error types for the quality gate.
//!
//! Only programmer and I/O errors live here. Data-content findings such as a
//! missing column or a drifted distribution are reported through
//! [`ValidationResult`](crate::schema::ValidationResult) and
//! [`DriftReport`](crate::drift::DriftReport), never through `GateError`.

use thiserror::Error;

/// The main error type for the quality gate.
#[derive(Error, Debug)]
pub enum GateError {
    /// A column constraint was declared in a way that can never be evaluated.
    #[error("Invalid constraint on column '{column}': {message}")]
    InvalidConstraint {
        /// Column the constraint was declared for
        column: String,
        /// What is wrong with the declaration
        message: String,
    },

    /// The schema as a whole is malformed (e.g. a column declared twice).
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    /// The dataset could not be assembled (duplicate names, ragged columns).
    #[error("Invalid dataset: {0}")]
    InvalidDataset(String),

    /// Error related to configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Error from data source operations.
    #[error("Data source error: {message}")]
    DataSource {
        /// Type of data source (e.g., "CSV", "Arrow")
        source_type: String,
        /// Detailed error message
        message: String,
        /// Optional underlying error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Error from Arrow operations.
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Error from I/O operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Error when an operation is not supported.
    #[error("Operation not supported: {0}")]
    NotSupported(String),

    /// Generic internal error for unexpected conditions.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A type alias for `Result<T, GateError>`.
pub type Result<T> = std::result::Result<T, GateError>;

impl GateError {
    /// Creates a new invalid constraint error.
    pub fn invalid_constraint(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConstraint {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Creates a new data source error.
    pub fn data_source(source_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DataSource {
            source_type: source_type.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new data source error with a source error.
    pub fn data_source_with_source(
        source_type: impl Into<String>,
        message: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::DataSource {
            source_type: source_type.into(),
            message: message.into(),
            source: Some(source),
        }
    }
}

/// Extension trait for adding context to errors.
pub trait ErrorContext<T> {
    /// Adds context to an error.
    fn context(self, msg: &str) -> Result<T>;

    /// Adds context with a lazy message.
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: Into<GateError>,
{
    fn context(self, msg: &str) -> Result<T> {
        self.with_context(|| msg.to_string())
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| match e.into() {
            GateError::Internal(inner) => GateError::Internal(format!("{}: {inner}", f())),
            GateError::DataSource {
                source_type,
                message,
                source,
            } => GateError::DataSource {
                source_type,
                message: format!("{}: {message}", f()),
                source,
            },
            other => GateError::Internal(format!("{}: {other}", f())),
        })
    }
}
