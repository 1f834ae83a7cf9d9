//! Result type alias.

use super::error::NlqError;

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, NlqError>;
