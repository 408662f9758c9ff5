//! File actions recorded in the instruction log

use crate::task::TaskInfo;
use codemigrate_types::TaskKind;
use codemigrate_vfs::File;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Record of one file-level effect of a task.
///
/// Actions are append-only: once a task has produced them they are never
/// changed. A create action carrying `original_file` overwrites an existing
/// file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum FileAction {
    /// Content rewrite of a file in place
    #[serde(rename_all = "camelCase")]
    Transform {
        /// Originating task
        task: TaskInfo,
        /// File before the rewrite
        original_file: File,
        /// File after the rewrite
        new_file: File,
    },
    /// Move of a file, content unchanged
    #[serde(rename_all = "camelCase")]
    Rename {
        /// Originating task
        task: TaskInfo,
        /// Absolute path before the move
        original_file_path: PathBuf,
        /// Absolute path after the move
        new_file_path: PathBuf,
    },
    /// Deletion of a file
    #[serde(rename_all = "camelCase")]
    Remove {
        /// Originating task
        task: TaskInfo,
        /// Absolute path of the deleted file
        file_path: PathBuf,
    },
    /// New file, possibly replacing an existing one
    #[serde(rename_all = "camelCase")]
    Create {
        /// Originating task
        task: TaskInfo,
        /// File that existed at the target path before the create
        #[serde(skip_serializing_if = "Option::is_none")]
        original_file: Option<File>,
        /// Created file
        new_file: File,
    },
}

impl FileAction {
    /// Kind of the task that produced this action
    pub fn kind(&self) -> TaskKind {
        self.task().kind
    }

    /// Originating task
    pub fn task(&self) -> &TaskInfo {
        match self {
            Self::Transform { task, .. }
            | Self::Rename { task, .. }
            | Self::Remove { task, .. }
            | Self::Create { task, .. } => task,
        }
    }

    /// Path the action leaves behind: the new location for renames, the
    /// deleted path for removes.
    pub fn path(&self) -> &Path {
        match self {
            Self::Transform { new_file, .. } | Self::Create { new_file, .. } => new_file.path(),
            Self::Rename { new_file_path, .. } => new_file_path,
            Self::Remove { file_path, .. } => file_path,
        }
    }

    /// Whether this is a create that replaces an existing file
    pub fn is_override(&self) -> bool {
        matches!(
            self,
            Self::Create {
                original_file: Some(_),
                ..
            }
        )
    }
}
