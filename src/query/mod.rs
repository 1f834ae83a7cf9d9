//! Execution of generated SQL.

pub mod executor;
pub mod value;

pub use executor::PostgresExecutor;
pub use value::decode_text_value;

use crate::types::{ResultSet, Result};
use async_trait::async_trait;

/// Runs one SQL statement and returns every row.
///
/// Implementations must not catch errors; connection and execution failures
/// go back to the caller untouched.
#[async_trait]
pub trait SqlRunner: Send + Sync {
    /// Execute SQL text and fetch all rows with their column names.
    async fn run(&self, sql: &str) -> Result<ResultSet>;
}
