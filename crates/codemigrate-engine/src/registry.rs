//! Registration surface handed to migration scripts

use crate::action::FileAction;
use crate::migration::{Migration, MigrationOptions};
use crate::task::{CreateInput, CreateOutput};
use codemigrate_types::Result;
use codemigrate_vfs::{File, VirtualFileSystem};
use std::path::PathBuf;

/// Borrowed view of a [`Migration`] that only lets a script register work.
///
/// A script cannot write the overlay to disk or run hooks; that stays with
/// whoever owns the migration.
pub struct TaskRegistry<'m> {
    migration: &'m mut Migration,
}

impl<'m> TaskRegistry<'m> {
    pub(crate) fn new(migration: &'m mut Migration) -> Self {
        Self { migration }
    }

    /// Rewrites the content of every file matching `pattern`
    pub fn transform<F>(&mut self, title: &str, pattern: &str, transform: F) -> Result<&[FileAction]>
    where
        F: FnMut(&File) -> anyhow::Result<Option<String>>,
    {
        self.migration.transform(title, pattern, transform)
    }

    /// Moves every file matching `pattern`
    pub fn rename<F>(&mut self, title: &str, pattern: &str, rename: F) -> Result<&[FileAction]>
    where
        F: FnMut(&File) -> anyhow::Result<Option<PathBuf>>,
    {
        self.migration.rename(title, pattern, rename)
    }

    /// Deletes every file matching `pattern` that `remove` confirms
    pub fn remove<F>(&mut self, title: &str, pattern: &str, remove: F) -> Result<&[FileAction]>
    where
        F: FnMut(&File) -> anyhow::Result<bool>,
    {
        self.migration.remove(title, pattern, remove)
    }

    /// Derives one new file from every file matching `pattern`
    pub fn create<F>(&mut self, title: &str, pattern: &str, create: F) -> Result<&[FileAction]>
    where
        F: FnMut(CreateInput<'_>) -> anyhow::Result<Option<CreateOutput>>,
    {
        self.migration.create_matching(title, pattern, create)
    }

    /// Generates a single file
    pub fn create_file<F>(&mut self, title: &str, create: F) -> Result<&[FileAction]>
    where
        F: FnMut() -> anyhow::Result<Option<CreateOutput>>,
    {
        self.migration.create_file(title, create)
    }

    /// Registers a post-write hook
    pub fn after<F>(&mut self, hook: F)
    where
        F: FnMut() -> anyhow::Result<()> + 'static,
    {
        self.migration.after(hook);
    }

    /// Options of the migration
    pub fn options(&self) -> &MigrationOptions {
        self.migration.options()
    }

    /// Overlay as the tasks registered so far left it
    pub fn fs(&self) -> &VirtualFileSystem {
        self.migration.fs()
    }
}
