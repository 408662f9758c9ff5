//! One execution strategy per task kind
//!
//! Every executor resolves its pattern against the overlay, opens the matched
//! files one at a time, hands each to the task's callback, stages the outcome
//! in the overlay and returns the produced actions in match order. A failing
//! callback or an unreadable file only costs its own file.
//!
//! An `Err` from an executor aborts the whole task. Executors only return one
//! before they have staged anything, so every staged change has an action.

use crate::action::FileAction;
use crate::events::{EventBus, MigrationEvent};
use crate::migration::MigrationOptions;
use crate::task::{Task, TaskInfo};
use codemigrate_types::{Error, Result};
use codemigrate_vfs::{File, PatternMatcher, VirtualFileSystem};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub mod create;
pub mod remove;
pub mod rename;
pub mod transform;

/// Everything an executor may touch while a task runs
pub struct TaskContext<'m> {
    /// Shared overlay
    pub fs: &'m mut VirtualFileSystem,
    /// Event bus
    pub events: &'m mut EventBus,
    /// Migration options
    pub options: &'m MigrationOptions,
}

impl TaskContext<'_> {
    /// Resolves `pattern` against the overlay, honouring the ignore globs
    pub fn matched_paths(&self, pattern: &str) -> Result<Vec<PathBuf>> {
        let matcher = PatternMatcher::new(pattern)?.with_ignore(&self.options.ignore)?;
        let paths = matcher.resolve(&*self.fs);
        debug!("Resolved '{}' to {} file(s)", pattern, paths.len());
        Ok(paths)
    }

    /// Opens one matched file. A file that cannot be read is reported through
    /// a start and a fail event and yields `None`.
    pub fn open(&mut self, task: &TaskInfo, relative: &Path) -> Option<File> {
        match File::open(&*self.fs, relative) {
            Ok(file) => Some(file),
            Err(error) => {
                warn!("Cannot read {}: {}", relative.display(), error);
                let file = File::with_source(&*self.fs, relative, Vec::<u8>::new());
                self.emit(&MigrationEvent::Start {
                    task,
                    file: Some(&file),
                });
                self.fail(task, &file, &error);
                None
            }
        }
    }

    /// Reports a per-file failure that did not come from the callback
    pub fn fail(&mut self, task: &TaskInfo, file: &File, error: &Error) {
        self.emit(&MigrationEvent::Fail {
            task,
            file: Some(file),
            error,
        });
    }

    /// Publish an event
    pub fn emit(&mut self, event: &MigrationEvent<'_>) {
        self.events.emit(event);
    }
}

/// Runs `task` against the context and returns its actions
pub fn execute(task: &mut Task<'_>, ctx: &mut TaskContext<'_>) -> Result<Vec<FileAction>> {
    match task {
        Task::Transform(task) => transform::run(task, ctx),
        Task::Rename(task) => rename::run(task, ctx),
        Task::Remove(task) => remove::run(task, ctx),
        Task::Create(task) => create::run(task, ctx),
    }
}

#[cfg(test)]
pub(crate) mod fixture {
    use super::TaskContext;
    use crate::events::{EventBus, EventRecorder};
    use crate::migration::MigrationOptions;
    use codemigrate_vfs::VirtualFileSystem;
    use std::fs;
    use tempfile::TempDir;

    /// Temporary project with an overlay, a bus and a recorder subscribed to it
    pub(crate) struct Fixture {
        _dir: TempDir,
        pub fs: VirtualFileSystem,
        pub events: EventBus,
        pub recorder: EventRecorder,
        pub options: MigrationOptions,
    }

    impl Fixture {
        pub fn new(files: &[(&str, &str)]) -> Self {
            let binary: Vec<(&str, &[u8])> = files
                .iter()
                .map(|(name, content)| (*name, content.as_bytes()))
                .collect();
            Self::with_bytes(&binary)
        }

        pub fn with_bytes(files: &[(&str, &[u8])]) -> Self {
            let dir = TempDir::new().unwrap();
            for (name, content) in files {
                let path = dir.path().join(name);
                fs::create_dir_all(path.parent().unwrap()).unwrap();
                fs::write(path, content).unwrap();
            }
            let fs = VirtualFileSystem::new(dir.path()).unwrap();
            let recorder = EventRecorder::new();
            let mut events = EventBus::new();
            events.subscribe(recorder.clone());
            let options = MigrationOptions::new(dir.path());

            Self {
                _dir: dir,
                fs,
                events,
                recorder,
                options,
            }
        }

        pub fn context(&mut self) -> TaskContext<'_> {
            TaskContext {
                fs: &mut self.fs,
                events: &mut self.events,
                options: &self.options,
            }
        }

        pub fn read(&self, name: &str) -> String {
            self.fs.read_to_string(name).unwrap()
        }

        pub fn mkdir(&self, name: &str) {
            fs::create_dir_all(self.fs.cwd().join(name)).unwrap();
        }
    }
}
