//! Migration controller
//!
//! A [`Migration`] owns the overlay, the instruction log, the event bus and
//! the post-write hooks. Every registration call runs its task immediately
//! against the overlay; nothing reaches the disk before [`Migration::write`].

use crate::action::FileAction;
use crate::events::{EventBus, MigrationEvent, MigrationObserver};
use crate::executor::{self, TaskContext};
use crate::registry::TaskRegistry;
use crate::reporter::TracingReporter;
use crate::task::{CreateInput, CreateOutput, CreateTask, RemoveTask, RenameTask, Task, TransformTask};
use codemigrate_config::Config;
use codemigrate_types::{CollisionPolicy, Error, MigrationStats, Result};
use codemigrate_vfs::{CommitSummary, File, VirtualFileSystem};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Options of a migration run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationOptions {
    /// Project directory every pattern is resolved against
    pub cwd: PathBuf,
    /// What a rename does when its target exists
    pub rename_collision: CollisionPolicy,
    /// Globs no pattern ever matches
    pub ignore: Vec<String>,
    /// Whether directory walks follow symbolic links
    pub follow_symlinks: bool,
}

impl MigrationOptions {
    /// Options with the default configuration for `cwd`
    pub fn new<P: Into<PathBuf>>(cwd: P) -> Self {
        Self::from_config(cwd, &Config::default())
    }

    /// Options for `cwd` taken from a loaded configuration
    pub fn from_config<P: Into<PathBuf>>(cwd: P, config: &Config) -> Self {
        Self {
            cwd: cwd.into(),
            rename_collision: config.migration.rename_collision,
            ignore: config.migration.ignore.clone(),
            follow_symlinks: config.migration.follow_symlinks,
        }
    }

    /// Set the rename collision policy
    pub fn with_rename_collision(mut self, policy: CollisionPolicy) -> Self {
        self.rename_collision = policy;
        self
    }

    /// Replace the ignore globs
    pub fn with_ignore<I, S>(mut self, globs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore = globs.into_iter().map(Into::into).collect();
        self
    }
}

/// Lifecycle of a migration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationState {
    /// No task has run yet
    Idle,
    /// Tasks are executing against the overlay
    Running,
    /// The overlay is being written to disk
    Committing,
    /// Everything staged so far is on disk
    Done,
}

/// Hook invoked after the overlay has been written
pub type AfterHook = Box<dyn FnMut() -> anyhow::Result<()>>;

/// Migration controller
pub struct Migration {
    options: MigrationOptions,
    fs: VirtualFileSystem,
    events: EventBus,
    instructions: Vec<FileAction>,
    after_hooks: Vec<AfterHook>,
    state: MigrationState,
}

impl Migration {
    /// Create a controller without observers
    pub fn new(options: MigrationOptions) -> Result<Self> {
        let fs = VirtualFileSystem::new(&options.cwd)?.with_follow_symlinks(options.follow_symlinks);
        debug!("Migration created for {}", fs.cwd().display());

        Ok(Self {
            options,
            fs,
            events: EventBus::new(),
            instructions: Vec::new(),
            after_hooks: Vec::new(),
            state: MigrationState::Idle,
        })
    }

    /// Create a controller that reports every event through `tracing`
    pub fn create(options: MigrationOptions) -> Result<Self> {
        let mut migration = Self::new(options)?;
        migration.subscribe(TracingReporter::new());
        Ok(migration)
    }

    /// Subscribe an observer to the event stream
    pub fn subscribe<O: MigrationObserver + 'static>(&mut self, observer: O) {
        self.events.subscribe(observer);
    }

    /// Migration options
    pub fn options(&self) -> &MigrationOptions {
        &self.options
    }

    /// Overlay shared by every task
    pub fn fs(&self) -> &VirtualFileSystem {
        &self.fs
    }

    /// Current lifecycle state
    pub fn state(&self) -> MigrationState {
        self.state
    }

    /// Counters tallied from the event stream
    pub fn stats(&self) -> &MigrationStats {
        self.events.stats()
    }

    /// Runs `task` against the overlay and appends its actions to the
    /// instruction log. Returns the actions this task produced.
    pub fn run_task(&mut self, mut task: Task<'_>) -> Result<&[FileAction]> {
        self.state = MigrationState::Running;
        self.events.emit(&MigrationEvent::TaskStart { task: task.info() });
        info!("Running {} task '{}'", task.kind(), task.info().title);

        let mut ctx = TaskContext {
            fs: &mut self.fs,
            events: &mut self.events,
            options: &self.options,
        };
        let actions = executor::execute(&mut task, &mut ctx)?;

        debug!(
            "Task '{}' produced {} action(s)",
            task.info().title,
            actions.len()
        );
        let start = self.instructions.len();
        self.instructions.extend(actions);
        Ok(&self.instructions[start..])
    }

    /// Rewrites the content of every file matching `pattern`
    pub fn transform<F>(&mut self, title: &str, pattern: &str, transform: F) -> Result<&[FileAction]>
    where
        F: FnMut(&File) -> anyhow::Result<Option<String>>,
    {
        self.run_task(TransformTask::new(title, pattern, transform).into())
    }

    /// Moves every file matching `pattern` to the path `rename` returns
    pub fn rename<F>(&mut self, title: &str, pattern: &str, rename: F) -> Result<&[FileAction]>
    where
        F: FnMut(&File) -> anyhow::Result<Option<PathBuf>>,
    {
        self.run_task(RenameTask::new(title, pattern, rename).into())
    }

    /// Deletes every file matching `pattern` that `remove` confirms
    pub fn remove<F>(&mut self, title: &str, pattern: &str, remove: F) -> Result<&[FileAction]>
    where
        F: FnMut(&File) -> anyhow::Result<bool>,
    {
        self.run_task(RemoveTask::new(title, pattern, remove).into())
    }

    /// Deletes every file matching `pattern`
    pub fn remove_matching(&mut self, title: &str, pattern: &str) -> Result<&[FileAction]> {
        self.run_task(RemoveTask::matching(title, pattern).into())
    }

    /// Derives one new file from every file matching `pattern`
    pub fn create_matching<F>(&mut self, title: &str, pattern: &str, create: F) -> Result<&[FileAction]>
    where
        F: FnMut(CreateInput<'_>) -> anyhow::Result<Option<CreateOutput>>,
    {
        self.run_task(CreateTask::matched(title, pattern, create).into())
    }

    /// Generates a single file unrelated to any existing one
    pub fn create_file<F>(&mut self, title: &str, create: F) -> Result<&[FileAction]>
    where
        F: FnMut() -> anyhow::Result<Option<CreateOutput>>,
    {
        self.run_task(CreateTask::standalone(title, create).into())
    }

    /// Registers a hook for [`Migration::run`]
    pub fn after<F>(&mut self, hook: F)
    where
        F: FnMut() -> anyhow::Result<()> + 'static,
    {
        self.after_hooks.push(Box::new(hook));
    }

    /// Number of registered post-write hooks
    pub fn after_hook_count(&self) -> usize {
        self.after_hooks.len()
    }

    /// Every action recorded so far, in execution order
    pub fn get_migration_instructions(&self) -> &[FileAction] {
        &self.instructions
    }

    /// Create actions that will replace an existing file on write
    pub fn pending_overrides(&self) -> Vec<&FileAction> {
        self.instructions
            .iter()
            .filter(|action| action.is_override())
            .collect()
    }

    /// The instruction log as pretty-printed JSON
    pub fn instructions_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.instructions)
            .map_err(|e| Error::other(format!("Failed to serialize instructions: {}", e)))
    }

    /// Writes every staged change to disk. Calling it again without
    /// registering new tasks does nothing.
    pub fn write(&mut self) -> Result<CommitSummary> {
        self.state = MigrationState::Committing;
        let summary = self.fs.commit()?;
        self.state = MigrationState::Done;

        info!(
            "Migration written: {} file(s) written, {} deleted",
            summary.written, summary.deleted
        );
        Ok(summary)
    }

    /// Writes to disk, then runs the post-write hooks in registration order.
    /// The first failing hook stops the run.
    pub fn run(&mut self) -> Result<CommitSummary> {
        let summary = self.write()?;

        for (index, hook) in self.after_hooks.iter_mut().enumerate() {
            debug!("Running after hook #{}", index);
            hook().map_err(|e| Error::Hook {
                index,
                message: format!("{:#}", e),
            })?;
        }

        Ok(summary)
    }

    /// Logs `title` and hands a [`TaskRegistry`] to `script`
    pub fn migrate<F>(&mut self, title: &str, script: F) -> anyhow::Result<()>
    where
        F: FnOnce(&mut TaskRegistry<'_>) -> anyhow::Result<()>,
    {
        info!("Starting: {}", title);
        let mut registry = TaskRegistry::new(self);
        script(&mut registry)
    }

    /// Working directory of the migration
    pub fn cwd(&self) -> &Path {
        self.fs.cwd()
    }
}

impl fmt::Debug for Migration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Migration")
            .field("options", &self.options)
            .field("state", &self.state)
            .field("instructions", &self.instructions.len())
            .field("after_hooks", &self.after_hooks.len())
            .field("events", &self.events)
            .finish()
    }
}
