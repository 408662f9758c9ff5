//! Migration tasks and the callbacks they carry

use codemigrate_types::{Error, Result, TaskKind};
use codemigrate_vfs::File;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Unique identifier for a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TaskId(Uuid);

impl TaskId {
    /// Create a new task ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the inner UUID
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Callback-free description of a task.
///
/// Travels with every event and every [`FileAction`](crate::FileAction) so
/// observers and exports never need the task's closure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskInfo {
    /// Task ID
    pub id: TaskId,
    /// Human readable label
    pub title: String,
    /// Task kind
    pub kind: TaskKind,
    /// Pattern the task was registered with, absent for standalone creates
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

impl TaskInfo {
    fn new(title: impl Into<String>, kind: TaskKind, pattern: Option<String>) -> Self {
        Self {
            id: TaskId::new(),
            title: title.into(),
            kind,
            pattern,
        }
    }

    /// Pattern the task resolves, empty for standalone creates
    pub fn pattern(&self) -> &str {
        self.pattern.as_deref().unwrap_or_default()
    }
}

/// Returns the new source of a file, or `None` to leave it untouched
pub type TransformFn<'a> = Box<dyn FnMut(&File) -> anyhow::Result<Option<String>> + 'a>;

/// Returns the new path of a file, or `None` to keep it where it is
pub type RenameFn<'a> = Box<dyn FnMut(&File) -> anyhow::Result<Option<PathBuf>> + 'a>;

/// Returns `true` to confirm the removal of a file
pub type RemoveFn<'a> = Box<dyn FnMut(&File) -> anyhow::Result<bool> + 'a>;

/// Rewrites the content of every matched file
pub struct TransformTask<'a> {
    /// Task description
    pub info: TaskInfo,
    pub(crate) callback: TransformFn<'a>,
}

impl<'a> TransformTask<'a> {
    /// Create a transform task
    pub fn new<F>(title: impl Into<String>, pattern: impl Into<String>, callback: F) -> Self
    where
        F: FnMut(&File) -> anyhow::Result<Option<String>> + 'a,
    {
        Self {
            info: TaskInfo::new(title, TaskKind::Transform, Some(pattern.into())),
            callback: Box::new(callback),
        }
    }
}

/// Moves every matched file to a path chosen by the callback
pub struct RenameTask<'a> {
    /// Task description
    pub info: TaskInfo,
    pub(crate) callback: RenameFn<'a>,
}

impl<'a> RenameTask<'a> {
    /// Create a rename task
    pub fn new<F>(title: impl Into<String>, pattern: impl Into<String>, callback: F) -> Self
    where
        F: FnMut(&File) -> anyhow::Result<Option<PathBuf>> + 'a,
    {
        Self {
            info: TaskInfo::new(title, TaskKind::Rename, Some(pattern.into())),
            callback: Box::new(callback),
        }
    }
}

/// Deletes matched files the callback confirms
pub struct RemoveTask<'a> {
    /// Task description
    pub info: TaskInfo,
    pub(crate) callback: Option<RemoveFn<'a>>,
}

impl<'a> RemoveTask<'a> {
    /// Create a remove task that asks `callback` about every match
    pub fn new<F>(title: impl Into<String>, pattern: impl Into<String>, callback: F) -> Self
    where
        F: FnMut(&File) -> anyhow::Result<bool> + 'a,
    {
        Self {
            info: TaskInfo::new(title, TaskKind::Remove, Some(pattern.into())),
            callback: Some(Box::new(callback)),
        }
    }

    /// Create a remove task that deletes every match
    pub fn matching(title: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            info: TaskInfo::new(title, TaskKind::Remove, Some(pattern.into())),
            callback: None,
        }
    }
}

/// Name and content of a matched file, handed to a pattern-bound create callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreateInput<'f> {
    /// Path of the matched file, relative to the working directory
    pub file_name: &'f Path,
    /// Content of the matched file
    pub source: &'f str,
}

impl<'f> TryFrom<&'f File> for CreateInput<'f> {
    type Error = Error;

    /// Fails with [`Error::Encoding`] when the file is not UTF-8 text
    fn try_from(file: &'f File) -> Result<Self> {
        Ok(Self {
            file_name: file.file_name(),
            source: file.source()?,
        })
    }
}

/// File produced by a create callback.
///
/// Both fields are public so a callback can build the value piecemeal;
/// the executor rejects an empty `file_name` or a missing `source`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateOutput {
    /// Target path, relative to the working directory or absolute
    pub file_name: PathBuf,
    /// Content to write
    pub source: Option<String>,
}

impl CreateOutput {
    /// Create a complete output
    pub fn new(file_name: impl Into<PathBuf>, source: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            source: Some(source.into()),
        }
    }

    /// Checks the output and splits it into its path and content
    pub fn validate(self) -> Result<(PathBuf, String)> {
        if self.file_name.as_os_str().is_empty() {
            return Err(Error::config(
                "the return value of a create function must contain a non-empty file name",
            ));
        }
        let source = self.source.ok_or_else(|| {
            Error::config(format!(
                "the return value of a create function for '{}' must contain a source",
                self.file_name.display()
            ))
        })?;
        Ok((self.file_name, source))
    }
}

/// Create callback, either bound to a pattern or standalone
pub enum CreateFn<'a> {
    /// Invoked once per matched file
    Matched(Box<dyn FnMut(CreateInput<'_>) -> anyhow::Result<Option<CreateOutput>> + 'a>),
    /// Invoked exactly once with no input
    Standalone(Box<dyn FnMut() -> anyhow::Result<Option<CreateOutput>> + 'a>),
}

/// Produces new files
pub struct CreateTask<'a> {
    /// Task description
    pub info: TaskInfo,
    pub(crate) callback: CreateFn<'a>,
}

impl<'a> CreateTask<'a> {
    /// Create a task that derives one new file from every match
    pub fn matched<F>(title: impl Into<String>, pattern: impl Into<String>, callback: F) -> Self
    where
        F: FnMut(CreateInput<'_>) -> anyhow::Result<Option<CreateOutput>> + 'a,
    {
        Self {
            info: TaskInfo::new(title, TaskKind::Create, Some(pattern.into())),
            callback: CreateFn::Matched(Box::new(callback)),
        }
    }

    /// Create a task that generates a single file
    pub fn standalone<F>(title: impl Into<String>, callback: F) -> Self
    where
        F: FnMut() -> anyhow::Result<Option<CreateOutput>> + 'a,
    {
        Self {
            info: TaskInfo::new(title, TaskKind::Create, None),
            callback: CreateFn::Standalone(Box::new(callback)),
        }
    }
}

/// A registered unit of migration work
pub enum Task<'a> {
    /// Content rewrite
    Transform(TransformTask<'a>),
    /// Move
    Rename(RenameTask<'a>),
    /// Delete
    Remove(RemoveTask<'a>),
    /// New files
    Create(CreateTask<'a>),
}

impl Task<'_> {
    /// Description of the task
    pub fn info(&self) -> &TaskInfo {
        match self {
            Self::Transform(task) => &task.info,
            Self::Rename(task) => &task.info,
            Self::Remove(task) => &task.info,
            Self::Create(task) => &task.info,
        }
    }

    /// Task kind
    pub fn kind(&self) -> TaskKind {
        self.info().kind
    }
}

impl fmt::Debug for Task<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Task").field(self.info()).finish()
    }
}

impl<'a> From<TransformTask<'a>> for Task<'a> {
    fn from(task: TransformTask<'a>) -> Self {
        Self::Transform(task)
    }
}

impl<'a> From<RenameTask<'a>> for Task<'a> {
    fn from(task: RenameTask<'a>) -> Self {
        Self::Rename(task)
    }
}

impl<'a> From<RemoveTask<'a>> for Task<'a> {
    fn from(task: RemoveTask<'a>) -> Self {
        Self::Remove(task)
    }
}

impl<'a> From<CreateTask<'a>> for Task<'a> {
    fn from(task: CreateTask<'a>) -> Self {
        Self::Create(task)
    }
}
