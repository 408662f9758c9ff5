//! Migration engine for codemigrate
//!
//! This crate runs declarative file migrations against a virtual filesystem
//! overlay and records every effect in an ordered instruction log before
//! anything is written to disk.
//!
//! # Features
//!
//! - **Four task kinds**: transform, rename, remove and create
//! - **Immediate execution**: each registered task runs against the overlay
//!   state the previous tasks left behind
//! - **Per-file isolation**: a failing callback skips its file, not the task
//! - **Events**: synchronous observers see every lifecycle moment
//! - **Dry runs**: inspect or export the instruction log, then `run()`
//!
//! # Examples
//!
//! ```rust,no_run
//! use codemigrate_engine::{Migration, MigrationOptions};
//! use codemigrate_vfs::File;
//!
//! # fn example() -> anyhow::Result<()> {
//! let mut migration = Migration::create(MigrationOptions::new("/path/to/project"))?;
//!
//! migration.migrate("js to ts", |tasks| {
//!     tasks.rename("rename sources", "src/**/*.js", |file: &File| {
//!         Ok(Some(file.file_name().with_extension("ts")))
//!     })?;
//!     tasks.transform("drop var", "src/**/*.ts", |file: &File| {
//!         Ok(Some(file.source()?.replace("var ", "let ")))
//!     })?;
//!     Ok(())
//! })?;
//!
//! println!("{} pending action(s)", migration.get_migration_instructions().len());
//! migration.run()?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod action;
pub mod events;
pub mod executor;
pub mod migration;
pub mod registry;
pub mod reporter;
pub mod task;

pub use action::FileAction;
pub use events::{EventBus, EventError, EventRecorder, MigrationEvent, MigrationObserver, RecordedEvent};
pub use migration::{AfterHook, Migration, MigrationOptions, MigrationState};
pub use registry::TaskRegistry;
pub use reporter::TracingReporter;
pub use task::{
    CreateFn, CreateInput, CreateOutput, CreateTask, RemoveTask, RenameTask, Task, TaskId,
    TaskInfo, TransformTask,
};

pub use codemigrate_types::{CollisionPolicy, Error, MigrationStats, Result, TaskKind};
pub use codemigrate_vfs::{CommitSummary, File, VirtualFileSystem};
