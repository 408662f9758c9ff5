//! codemigrate testing suite
//!
//! End-to-end tests for the codemigrate workspace live under `tests/`; this
//! crate only carries the fixtures they share.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Unified test utilities
///
/// Temporary project trees and helpers to inspect them after a migration
/// has been written.
pub mod test_utils;
