//! Core data types for the question pipeline.
//!
//! - `ResultSet`: column names plus rows returned by the executor
//! - `NlqError`: error type for every pipeline operation
//! - `Result`: convenient result type alias

pub mod error;
pub mod result;
pub mod result_set;

pub use error::{ErrorKind, NlqError};
pub use result::Result;
pub use result_set::ResultSet;
