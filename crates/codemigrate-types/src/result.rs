//! Result type alias for codemigrate operations

use crate::Error;

/// Result type alias for codemigrate operations
pub type Result<T> = std::result::Result<T, Error>;
