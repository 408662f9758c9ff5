//! Error types and handling for codemigrate
//!
//! A single error enum covers every failure that can leave the engine.
//! Per-file callback failures never surface here: they are reported through
//! fail events and the task carries on with the next match.

use std::path::{Path, PathBuf};

/// Main error type for codemigrate operations
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error on '{path}': {message}")]
    Io {
        /// Path involved in the failed operation
        path: PathBuf,
        /// Error message from the I/O operation
        message: String,
    },

    /// File not found in the overlay or on disk
    #[error("File not found: {path}")]
    FileNotFound {
        /// Path to the file that was not found
        path: PathBuf,
    },

    /// File content is not valid UTF-8
    #[error("File is not valid UTF-8: {path}")]
    Encoding {
        /// Path to the offending file
        path: PathBuf,
    },

    /// Pattern could not be compiled
    #[error("Invalid pattern '{pattern}': {message}")]
    Pattern {
        /// The pattern as supplied
        pattern: String,
        /// Reason the pattern was rejected
        message: String,
    },

    /// Configuration error, including malformed callback results
    #[error("Configuration error: {message}")]
    Config {
        /// Error message describing the configuration issue
        message: String,
    },

    /// Rename target already exists and the collision policy forbids overwriting
    #[error("Cannot rename '{from}' to '{to}': target already exists")]
    RenameCollision {
        /// Path being renamed
        from: PathBuf,
        /// Existing target path
        to: PathBuf,
    },

    /// A post-write hook failed
    #[error("After hook #{index} failed: {message}")]
    Hook {
        /// Registration index of the hook
        index: usize,
        /// Error message returned by the hook
        message: String,
    },

    /// Generic error with custom message
    #[error("{message}")]
    Other {
        /// Custom error message
        message: String,
    },
}

/// Error kind for categorizing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// I/O related errors
    Io,
    /// Pattern errors
    Pattern,
    /// Configuration errors
    Config,
    /// Rename collisions
    Collision,
    /// Post-write hook errors
    Hook,
    /// Other errors
    Other,
}

impl Error {
    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io { .. } | Self::FileNotFound { .. } | Self::Encoding { .. } => ErrorKind::Io,
            Self::Pattern { .. } => ErrorKind::Pattern,
            Self::Config { .. } => ErrorKind::Config,
            Self::RenameCollision { .. } => ErrorKind::Collision,
            Self::Hook { .. } => ErrorKind::Hook,
            Self::Other { .. } => ErrorKind::Other,
        }
    }

    /// Create a new I/O error for `path`
    pub fn io<P: AsRef<Path>>(path: P, error: &std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            message: error.to_string(),
        }
    }

    /// Create a new pattern error
    pub fn pattern<P: Into<String>, S: Into<String>>(pattern: P, message: S) -> Self {
        Self::Pattern {
            pattern: pattern.into(),
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new generic error
    pub fn other<S: Into<String>>(message: S) -> Self {
        Self::Other {
            message: message.into(),
        }
    }
}
