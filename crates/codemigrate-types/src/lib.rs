//! Core type system and error handling for codemigrate
//!
//! This crate provides the foundational types shared by every codemigrate crate:
//!
//! - **Error handling**: one error enum, grouped by kind
//! - **Core types**: task kinds, rename collision policy and run statistics
//!
//! # Features
//!
//! - `serde`: Enable serialization support
//!
//! # Examples
//!
//! ```rust
//! use codemigrate_types::{Error, MigrationStats, Result, TaskKind};
//!
//! fn example_operation() -> Result<MigrationStats> {
//!     let mut stats = MigrationStats::new();
//!     stats.record_success(TaskKind::Transform);
//!     if stats.actions() == 0 {
//!         return Err(Error::other("nothing happened"));
//!     }
//!     Ok(stats)
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod result;
pub mod types;

// Re-export commonly used types
pub use error::{Error, ErrorKind};
pub use result::Result;
pub use types::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_creation() {
        let stats = MigrationStats::new();
        assert_eq!(stats.tasks, 0);
        assert_eq!(stats.actions(), 0);
    }

    #[test]
    fn test_error_kind() {
        let config_error = Error::config("invalid create result");
        assert_eq!(config_error.kind(), ErrorKind::Config);
    }
}
