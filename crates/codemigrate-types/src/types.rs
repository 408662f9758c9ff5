//! Core data types for codemigrate
//!
//! Enums and counters shared by the overlay, the engine and the configuration
//! layer.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a migration task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum TaskKind {
    /// Rewrite the content of matched files in place
    Transform,
    /// Move matched files to a new path
    Rename,
    /// Delete matched files
    Remove,
    /// Produce new files, optionally derived from matched ones
    Create,
}

impl TaskKind {
    /// Event-name prefix used for this kind
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Transform => "transform",
            Self::Rename => "rename",
            Self::Remove => "remove",
            Self::Create => "create",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a rename does when its target path already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum CollisionPolicy {
    /// Warn and overwrite the existing file
    #[default]
    Overwrite,
    /// Report the file as failed and leave both paths untouched
    Fail,
}

/// Counters collected while a migration runs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MigrationStats {
    /// Number of tasks executed
    pub tasks: u64,
    /// Files rewritten by transform tasks
    pub transformed: u64,
    /// Files moved by rename tasks
    pub renamed: u64,
    /// Files deleted by remove tasks
    pub removed: u64,
    /// Files produced by create tasks
    pub created: u64,
    /// Created files that replace an existing file
    pub overridden: u64,
    /// Per-file callback failures
    pub failed: u64,
    /// Files skipped because a callback cancelled them
    pub cancelled: u64,
}

impl MigrationStats {
    /// Create a new empty statistics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of file actions recorded
    pub fn actions(&self) -> u64 {
        self.transformed + self.renamed + self.removed + self.created
    }

    /// Record one successful action of the given kind
    pub fn record_success(&mut self, kind: TaskKind) {
        match kind {
            TaskKind::Transform => self.transformed += 1,
            TaskKind::Rename => self.renamed += 1,
            TaskKind::Remove => self.removed += 1,
            TaskKind::Create => self.created += 1,
        }
    }
}
