//! File entity read through the overlay

use crate::overlay::VirtualFileSystem;
use codemigrate_types::{Error, Result};
use serde::{Serialize, Serializer};
use std::path::{Path, PathBuf};

/// Snapshot of one file as seen through a [`VirtualFileSystem`].
///
/// A `File` is a value object: it is never mutated after construction.
/// Changing content or location produces a new `File`.
///
/// Content is kept as raw bytes. It is decoded as UTF-8 only when
/// [`source`](Self::source) is called, so binary files can still be matched,
/// renamed and removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct File {
    file_name: PathBuf,
    path: PathBuf,
    exists: bool,
    #[serde(rename = "source", serialize_with = "serialize_source")]
    contents: Vec<u8>,
}

impl File {
    /// Reads the file at `file_name` (relative to the overlay's working
    /// directory). A missing file yields `exists == false` and no content.
    pub fn open<P: AsRef<Path>>(fs: &VirtualFileSystem, file_name: P) -> Result<Self> {
        let (file_name, path) = Self::locate(fs, file_name.as_ref());
        let exists = fs.exists(&path);
        let contents = if exists { fs.read(&path)? } else { Vec::new() };

        Ok(Self {
            file_name,
            path,
            exists,
            contents,
        })
    }

    /// Builds a file at `file_name` carrying the supplied content instead of
    /// the stored one. `exists` still reflects the overlay.
    pub fn with_source<P: AsRef<Path>, C: Into<Vec<u8>>>(
        fs: &VirtualFileSystem,
        file_name: P,
        contents: C,
    ) -> Self {
        let (file_name, path) = Self::locate(fs, file_name.as_ref());
        let exists = fs.exists(&path);

        Self {
            file_name,
            path,
            exists,
            contents: contents.into(),
        }
    }

    fn locate(fs: &VirtualFileSystem, file_name: &Path) -> (PathBuf, PathBuf) {
        let path = fs.resolve(file_name);
        let file_name = fs
            .relative(&path)
            .unwrap_or_else(|| path.clone());
        (file_name, path)
    }

    /// Path relative to the working directory
    pub fn file_name(&self) -> &Path {
        &self.file_name
    }

    /// Absolute path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the file existed in the overlay when this snapshot was taken
    pub fn exists(&self) -> bool {
        self.exists
    }

    /// Raw content
    pub fn contents(&self) -> &[u8] {
        &self.contents
    }

    /// Content as text.
    ///
    /// Fails with [`Error::Encoding`] when the content is not valid UTF-8.
    pub fn source(&self) -> Result<&str> {
        std::str::from_utf8(&self.contents).map_err(|_| Error::Encoding {
            path: self.path.clone(),
        })
    }

    /// Returns a new snapshot of the same path with different content
    pub fn replace_source<C: Into<Vec<u8>>>(&self, contents: C) -> Self {
        Self {
            file_name: self.file_name.clone(),
            path: self.path.clone(),
            exists: self.exists,
            contents: contents.into(),
        }
    }
}

/// Text content serializes as a string, anything else as `null`
fn serialize_source<S>(contents: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match std::str::from_utf8(contents) {
        Ok(source) => serializer.serialize_some(source),
        Err(_) => serializer.serialize_none(),
    }
}
