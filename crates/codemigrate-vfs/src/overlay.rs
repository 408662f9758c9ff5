//! In-memory staging overlay over a real directory tree
//!
//! The overlay maps absolute paths to their most recent staged operation.
//! A path without a staged operation is "unmodified" and reads fall through
//! to the disk. Nothing touches the disk until [`VirtualFileSystem::commit`].

use crate::path::{normalize, to_slash};
use codemigrate_types::{Error, Result};
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Operation staged for one path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StagedOp {
    /// Write the given bytes, creating the file if needed
    Write(Vec<u8>),
    /// Delete the file
    Delete,
}

/// A staged change as reported by [`VirtualFileSystem::pending_changes`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingChange {
    /// Absolute path of the change
    pub path: PathBuf,
    /// Operation that will be applied on commit
    pub op: StagedOp,
}

/// Outcome of a commit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitSummary {
    /// Files written to disk
    pub written: usize,
    /// Files deleted from disk
    pub deleted: usize,
}

impl CommitSummary {
    /// Whether the commit touched the disk at all
    pub fn is_empty(&self) -> bool {
        self.written == 0 && self.deleted == 0
    }
}

#[derive(Debug, Clone)]
struct Staged {
    seq: u64,
    op: StagedOp,
}

/// Virtual filesystem overlay rooted at a working directory.
///
/// ### Invariants
///
/// 1. Every key of the staging map is absolute and normalized.
/// 2. The most recent staged operation for a path wins.
/// 3. Reads consult the staging map before the disk.
/// 4. `commit` applies operations in staging order and leaves the overlay clean.
#[derive(Debug)]
pub struct VirtualFileSystem {
    cwd: PathBuf,
    follow_symlinks: bool,
    staged: HashMap<PathBuf, Staged>,
    next_seq: u64,
}

impl VirtualFileSystem {
    /// Creates an overlay over `cwd`, which must be an existing directory.
    pub fn new<P: AsRef<Path>>(cwd: P) -> Result<Self> {
        let cwd = cwd.as_ref();
        let cwd = if cwd.is_absolute() {
            normalize(cwd)
        } else {
            let current = std::env::current_dir().map_err(|e| Error::io(cwd, &e))?;
            normalize(current.join(cwd))
        };

        if !cwd.is_dir() {
            return Err(Error::FileNotFound { path: cwd });
        }

        Ok(Self {
            cwd,
            follow_symlinks: false,
            staged: HashMap::new(),
            next_seq: 0,
        })
    }

    /// Follow symbolic links while listing the working tree
    pub fn with_follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    /// Working directory the overlay is rooted at
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Resolves `path` against the working directory into an absolute,
    /// normalized path.
    pub fn resolve<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        normalize(self.cwd.join(path))
    }

    /// Returns `path` relative to the working directory, if it lies inside it.
    pub fn relative<P: AsRef<Path>>(&self, path: P) -> Option<PathBuf> {
        self.resolve(path)
            .strip_prefix(&self.cwd)
            .ok()
            .map(Path::to_path_buf)
    }

    /// Checks whether a file exists, staged state first
    pub fn exists<P: AsRef<Path>>(&self, path: P) -> bool {
        let path = self.resolve(path);
        match self.staged.get(&path) {
            Some(staged) => matches!(staged.op, StagedOp::Write(_)),
            None => path.is_file(),
        }
    }

    /// Whether `path` is a directory on disk that no staged write shadows.
    ///
    /// A file can never be written over such a path.
    pub fn is_dir<P: AsRef<Path>>(&self, path: P) -> bool {
        let path = self.resolve(path);
        !self.staged.contains_key(&path) && path.is_dir()
    }

    /// Reads the raw bytes of a file, staged state first
    pub fn read<P: AsRef<Path>>(&self, path: P) -> Result<Vec<u8>> {
        let path = self.resolve(path);
        match self.staged.get(&path) {
            Some(Staged {
                op: StagedOp::Write(content),
                ..
            }) => Ok(content.clone()),
            Some(Staged {
                op: StagedOp::Delete,
                ..
            }) => Err(Error::FileNotFound { path }),
            None => match fs::read(&path) {
                Ok(bytes) => Ok(bytes),
                Err(e) if e.kind() == ErrorKind::NotFound => Err(Error::FileNotFound { path }),
                Err(e) => Err(Error::io(&path, &e)),
            },
        }
    }

    /// Reads a file as UTF-8 text, staged state first
    pub fn read_to_string<P: AsRef<Path>>(&self, path: P) -> Result<String> {
        let bytes = self.read(&path)?;
        String::from_utf8(bytes).map_err(|_| Error::Encoding {
            path: self.resolve(path),
        })
    }

    /// Stages a write of `content` to `path`
    pub fn write_file<P: AsRef<Path>, C: Into<Vec<u8>>>(&mut self, path: P, content: C) {
        let path = self.resolve(path);
        debug!("Staged write: {}", path.display());
        self.stage(path, StagedOp::Write(content.into()));
    }

    /// Stages a delete of `path`, which must currently exist
    pub fn remove_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = self.resolve(path);
        if !self.exists(&path) {
            return Err(Error::FileNotFound { path });
        }
        debug!("Staged delete: {}", path.display());
        self.stage(path, StagedOp::Delete);
        Ok(())
    }

    /// Stages a move of `from` to `to`, keeping the content unchanged
    pub fn rename<P: AsRef<Path>, Q: AsRef<Path>>(&mut self, from: P, to: Q) -> Result<()> {
        let from = self.resolve(from);
        let to = self.resolve(to);
        if from == to {
            return Ok(());
        }

        let content = self.read(&from)?;
        debug!("Staged rename: {} -> {}", from.display(), to.display());
        self.stage(from, StagedOp::Delete);
        self.stage(to, StagedOp::Write(content));
        Ok(())
    }

    fn stage(&mut self, path: PathBuf, op: StagedOp) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.staged.insert(path, Staged { seq, op });
    }

    /// Lists every file visible through the overlay, relative to the working
    /// directory and sorted by path.
    pub fn list_files(&self) -> BTreeSet<PathBuf> {
        self.list_files_pruned(|_| false)
    }

    /// Like [`list_files`](Self::list_files), but never descends into a
    /// directory for which `skip_dir` returns `true`. `skip_dir` receives the
    /// directory path relative to the working directory.
    ///
    /// Staged writes are always listed, wherever they live.
    pub fn list_files_pruned<F>(&self, mut skip_dir: F) -> BTreeSet<PathBuf>
    where
        F: FnMut(&Path) -> bool,
    {
        let mut files = BTreeSet::new();
        let cwd = &self.cwd;

        let walker = WalkDir::new(cwd)
            .follow_links(self.follow_symlinks)
            .into_iter()
            .filter_entry(|entry| {
                if entry.depth() == 0 || !entry.file_type().is_dir() {
                    return true;
                }
                match entry.path().strip_prefix(cwd) {
                    Ok(relative) => {
                        let skip = skip_dir(relative);
                        if skip {
                            debug!("Pruned {}", to_slash(relative));
                        }
                        !skip
                    }
                    Err(_) => true,
                }
            });
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry under {}: {}", cwd.display(), e);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            if let Ok(relative) = entry.path().strip_prefix(cwd) {
                files.insert(relative.to_path_buf());
            }
        }

        for (path, staged) in &self.staged {
            let Ok(relative) = path.strip_prefix(cwd) else {
                continue;
            };
            match staged.op {
                StagedOp::Write(_) => files.insert(relative.to_path_buf()),
                StagedOp::Delete => files.remove(relative),
            };
        }

        files
    }

    /// Whether any operation is waiting to be committed
    pub fn is_dirty(&self) -> bool {
        !self.staged.is_empty()
    }

    /// Staged changes in the order they will be applied
    pub fn pending_changes(&self) -> Vec<PendingChange> {
        let mut staged: Vec<_> = self.staged.iter().collect();
        staged.sort_by_key(|(_, staged)| staged.seq);
        staged
            .into_iter()
            .map(|(path, staged)| PendingChange {
                path: path.clone(),
                op: staged.op.clone(),
            })
            .collect()
    }

    /// Applies every staged operation to the disk in staging order.
    ///
    /// Each applied operation leaves the overlay immediately, so a failed
    /// commit keeps the remaining operations staged. Committing a clean
    /// overlay is a no-op.
    pub fn commit(&mut self) -> Result<CommitSummary> {
        let mut summary = CommitSummary::default();
        if self.staged.is_empty() {
            debug!("Nothing to commit");
            return Ok(summary);
        }

        for change in self.pending_changes() {
            match &change.op {
                StagedOp::Write(content) => {
                    if let Some(parent) = change.path.parent() {
                        fs::create_dir_all(parent).map_err(|e| Error::io(parent, &e))?;
                    }
                    fs::write(&change.path, content).map_err(|e| Error::io(&change.path, &e))?;
                    summary.written += 1;
                    debug!("Wrote {}", to_slash(self.relative(&change.path).unwrap_or_default()));
                }
                StagedOp::Delete => match fs::remove_file(&change.path) {
                    Ok(()) => {
                        summary.deleted += 1;
                        debug!("Deleted {}", change.path.display());
                    }
                    Err(e) if e.kind() == ErrorKind::NotFound => {}
                    Err(e) => return Err(Error::io(&change.path, &e)),
                },
            }
            self.staged.remove(&change.path);
        }

        info!(
            "Committed {} write(s) and {} delete(s) under {}",
            summary.written,
            summary.deleted,
            self.cwd.display()
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn project() -> (TempDir, VirtualFileSystem) {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.txt"), "alpha").unwrap();
        fs::create_dir_all(temp_dir.path().join("src")).unwrap();
        fs::write(temp_dir.path().join("src/index.js"), "export {}").unwrap();
        let vfs = VirtualFileSystem::new(temp_dir.path()).unwrap();
        (temp_dir, vfs)
    }

    #[test]
    fn test_new_requires_directory() {
        let temp_dir = TempDir::new().unwrap();
        let result = VirtualFileSystem::new(temp_dir.path().join("missing"));
        assert!(matches!(result, Err(Error::FileNotFound { .. })));
    }

    #[test]
    fn test_reads_fall_through_to_disk() {
        let (_dir, vfs) = project();
        assert!(vfs.exists("a.txt"));
        assert_eq!(vfs.read_to_string("a.txt").unwrap(), "alpha");
        assert!(!vfs.exists("nope.txt"));
        assert!(matches!(
            vfs.read_to_string("nope.txt"),
            Err(Error::FileNotFound { .. })
        ));
    }

    #[test]
    fn test_staged_write_shadows_disk() {
        let (dir, mut vfs) = project();
        vfs.write_file("a.txt", "beta");

        assert_eq!(vfs.read_to_string("a.txt").unwrap(), "beta");
        assert_eq!(fs::read_to_string(dir.path().join("a.txt")).unwrap(), "alpha");
        assert!(vfs.is_dirty());
    }

    #[test]
    fn test_latest_operation_wins() {
        let (_dir, mut vfs) = project();
        vfs.remove_file("a.txt").unwrap();
        assert!(!vfs.exists("a.txt"));

        vfs.write_file("a.txt", "again");
        assert!(vfs.exists("a.txt"));
        assert_eq!(vfs.read_to_string("a.txt").unwrap(), "again");
    }

    #[test]
    fn test_remove_missing_file_fails() {
        let (_dir, mut vfs) = project();
        assert!(matches!(
            vfs.remove_file("ghost.txt"),
            Err(Error::FileNotFound { .. })
        ));
        assert!(!vfs.is_dirty());
    }

    #[test]
    fn test_rename_moves_content() {
        let (_dir, mut vfs) = project();
        vfs.rename("a.txt", "b.txt").unwrap();

        assert!(!vfs.exists("a.txt"));
        assert!(vfs.exists("b.txt"));
        assert_eq!(vfs.read_to_string("b.txt").unwrap(), "alpha");
    }

    #[test]
    fn test_paths_are_normalized() {
        let (_dir, mut vfs) = project();
        vfs.write_file("./src/../c.txt", "gamma");
        assert!(vfs.exists("c.txt"));
        assert_eq!(vfs.relative("src/./index.js"), Some(PathBuf::from("src/index.js")));
    }

    #[test]
    fn test_list_files_merges_overlay() {
        let (_dir, mut vfs) = project();
        vfs.write_file("new/file.md", "# hi");
        vfs.remove_file("a.txt").unwrap();

        let files: Vec<_> = vfs.list_files().into_iter().collect();
        assert_eq!(
            files,
            vec![PathBuf::from("new/file.md"), PathBuf::from("src/index.js")]
        );
    }

    #[test]
    fn test_pending_changes_keep_staging_order() {
        let (_dir, mut vfs) = project();
        vfs.write_file("z.txt", "1");
        vfs.write_file("a.txt", "2");
        vfs.write_file("z.txt", "3");

        let order: Vec<_> = vfs
            .pending_changes()
            .into_iter()
            .map(|change| vfs.relative(change.path).unwrap())
            .collect();
        assert_eq!(order, vec![PathBuf::from("a.txt"), PathBuf::from("z.txt")]);
    }

    #[test]
    fn test_commit_applies_and_cleans() {
        let (dir, mut vfs) = project();
        vfs.write_file("nested/deep/out.txt", "out");
        vfs.rename("a.txt", "b.txt").unwrap();

        let summary = vfs.commit().unwrap();
        assert_eq!(summary, CommitSummary { written: 2, deleted: 1 });
        assert!(!dir.path().join("a.txt").exists());
        assert_eq!(fs::read_to_string(dir.path().join("b.txt")).unwrap(), "alpha");
        assert_eq!(
            fs::read_to_string(dir.path().join("nested/deep/out.txt")).unwrap(),
            "out"
        );
        assert!(!vfs.is_dirty());

        let second = vfs.commit().unwrap();
        assert!(second.is_empty());
    }

    #[test]
    fn test_commit_delete_of_unwritten_file_is_noop() {
        let (dir, mut vfs) = project();
        vfs.write_file("tmp.txt", "x");
        vfs.remove_file("tmp.txt").unwrap();

        let summary = vfs.commit().unwrap();
        assert!(summary.is_empty());
        assert!(!dir.path().join("tmp.txt").exists());
    }

    #[test]
    fn test_invalid_utf8_is_encoding_error() {
        let (dir, vfs) = project();
        fs::write(dir.path().join("blob.bin"), [0xffu8, 0xfe, 0x00]).unwrap();
        assert!(matches!(
            vfs.read_to_string("blob.bin"),
            Err(Error::Encoding { .. })
        ));
        assert_eq!(vfs.read("blob.bin").unwrap(), vec![0xff, 0xfe, 0x00]);
    }

    #[test]
    fn test_rename_keeps_binary_content() {
        let (dir, mut vfs) = project();
        let bytes: [u8; 4] = [0x89, 0x50, 0xff, 0xfe];
        fs::write(dir.path().join("logo.png"), bytes).unwrap();

        vfs.rename("logo.png", "assets/logo.png").unwrap();
        vfs.commit().unwrap();

        assert_eq!(fs::read(dir.path().join("assets/logo.png")).unwrap(), bytes);
    }

    #[test]
    fn test_directories_are_not_files() {
        let (_dir, mut vfs) = project();
        assert!(vfs.is_dir("src"));
        assert!(!vfs.exists("src"));
        assert!(!vfs.is_dir("a.txt"));

        vfs.write_file("src", "shadow");
        assert!(!vfs.is_dir("src"));
    }

    #[test]
    fn test_list_files_prunes_directories() {
        let (dir, mut vfs) = project();
        fs::create_dir_all(dir.path().join("node_modules/dep")).unwrap();
        fs::write(dir.path().join("node_modules/dep/index.js"), "dep").unwrap();
        vfs.write_file("node_modules/staged.js", "staged");

        let mut visited = Vec::new();
        let files: Vec<_> = vfs
            .list_files_pruned(|relative| {
                visited.push(to_slash(relative));
                relative == Path::new("node_modules")
            })
            .into_iter()
            .collect();

        assert!(!visited.contains(&"node_modules/dep".to_string()));
        assert_eq!(
            files,
            vec![
                PathBuf::from("a.txt"),
                PathBuf::from("node_modules/staged.js"),
                PathBuf::from("src/index.js"),
            ]
        );
    }

    #[test]
    fn test_commit_error_keeps_remaining_changes() {
        let (dir, mut vfs) = project();
        vfs.write_file("a.txt/nested.txt", "cannot live under a file");

        let result = vfs.commit();

        assert!(matches!(result, Err(Error::Io { .. })));
        assert!(vfs.is_dirty());
        assert_eq!(fs::read_to_string(dir.path().join("a.txt")).unwrap(), "alpha");
    }
}
