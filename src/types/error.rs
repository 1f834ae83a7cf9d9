//! Error types for the question pipeline.
//!
//! Uses `thiserror` for ergonomic error definitions with automatic `From` implementations.

use thiserror::Error;

/// Error type for all pipeline operations.
///
/// No component handles these locally. Every variant travels up to
/// [`Pipeline::run`](crate::pipeline::Pipeline::run), which is the only place
/// errors are turned into user-facing output.
#[derive(Error, Debug)]
pub enum NlqError {
    /// Chat model request failed (network, auth, rate limit, bad response)
    #[error("Language model request failed: {0}")]
    LlmError(String),

    /// Query execution failed outside the driver (or in a test double)
    #[error("Query execution failed: {0}")]
    QueryError(String),

    /// PostgreSQL connection or execution error
    #[error("PostgreSQL error: {}", postgres_message(.0))]
    Postgres(#[from] tokio_postgres::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// CSV output error
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Coarse classification of an [`NlqError`].
///
/// Presentation does not depend on it; it exists for logging and callers
/// that want to tell model failures from database failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Anything that went wrong talking to the model endpoint
    UpstreamModel,
    /// Anything that went wrong connecting to or querying the database
    QueryExecution,
    /// Missing or malformed configuration
    Configuration,
    /// Serialization and local I/O
    Internal,
}

impl ErrorKind {
    /// Get kind name as string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UpstreamModel => "upstream_model",
            Self::QueryExecution => "query_execution",
            Self::Configuration => "configuration",
            Self::Internal => "internal",
        }
    }
}

impl NlqError {
    /// Create a model error with context.
    pub fn llm(msg: impl Into<String>) -> Self {
        Self::LlmError(msg.into())
    }

    /// Create a query error with context.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::QueryError(msg.into())
    }

    /// Create a configuration error with context.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Classify the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::LlmError(_) => ErrorKind::UpstreamModel,
            Self::QueryError(_) | Self::Postgres(_) => ErrorKind::QueryExecution,
            Self::ConfigError(_) => ErrorKind::Configuration,
            Self::JsonError(_) | Self::CsvError(_) | Self::IoError(_) => ErrorKind::Internal,
        }
    }
}

/// Short text for a driver error.
///
/// The driver's own `Display` is only "db error" for anything the server
/// reports, so the server's severity and message are used instead. Other
/// errors get their immediate cause appended.
fn postgres_message(err: &tokio_postgres::Error) -> String {
    if let Some(db) = err.as_db_error() {
        return format!("{}: {}", db.severity(), db.message());
    }

    match std::error::Error::source(err) {
        Some(cause) => format!("{}: {}", err, cause),
        None => err.to_string(),
    }
}
