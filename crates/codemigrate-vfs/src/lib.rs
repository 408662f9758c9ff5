//! Virtual filesystem overlay for codemigrate
//!
//! Every task of a migration reads and writes through one
//! [`VirtualFileSystem`]. Writes and deletes are staged in memory and only
//! reach the disk when the overlay is committed; unmodified paths read straight
//! through to the real project directory.
//!
//! - [`VirtualFileSystem`]: staged writes/deletes over a real directory tree
//! - [`File`]: immutable snapshot of one file as seen through the overlay
//! - [`PatternMatcher`]: glob resolution against overlay plus disk
//!
//! # Examples
//!
//! ```rust,no_run
//! use codemigrate_vfs::{get_files, VirtualFileSystem};
//!
//! # fn example() -> codemigrate_types::Result<()> {
//! let mut fs = VirtualFileSystem::new("/path/to/project")?;
//! for file in get_files(&fs, "src/**/*.js", &[])? {
//!     let renamed = file.file_name().with_extension("ts");
//!     fs.rename(file.path(), &renamed)?;
//! }
//! fs.commit()?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod file;
pub mod overlay;
pub mod path;
pub mod pattern;

pub use file::File;
pub use overlay::{CommitSummary, PendingChange, StagedOp, VirtualFileSystem};
pub use pattern::{get_files, PatternMatcher};
