//! Shared fixtures for codemigrate integration tests

use codemigrate_engine::{EventRecorder, Migration, MigrationOptions};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Temporary project directory populated with text files
pub struct TestProject {
    dir: TempDir,
}

impl TestProject {
    /// Create an empty project
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    /// Create a project containing `files` (relative name, content)
    pub fn with_files(files: &[(&str, &str)]) -> Self {
        let project = Self::new();
        for (name, content) in files {
            project.write(name, content);
        }
        project
    }

    /// Root of the project
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Absolute path of `name` inside the project
    pub fn join(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Write a file on disk, creating parent directories
    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&path, content).expect("Failed to write test file");
        path
    }

    /// Write raw bytes on disk, creating parent directories
    pub fn write_bytes(&self, name: &str, content: &[u8]) -> PathBuf {
        let path = self.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&path, content).expect("Failed to write test file");
        path
    }

    /// Read a file from disk
    pub fn read(&self, name: &str) -> String {
        fs::read_to_string(self.join(name)).expect("Failed to read test file")
    }

    /// Whether `name` exists on disk
    pub fn exists(&self, name: &str) -> bool {
        self.join(name).exists()
    }

    /// Default options rooted at the project
    pub fn options(&self) -> MigrationOptions {
        MigrationOptions::new(self.path())
    }

    /// A bare migration over the project with a recorder subscribed
    pub fn migration(&self) -> (Migration, EventRecorder) {
        self.migration_with(self.options())
    }

    /// A bare migration with custom options and a recorder subscribed
    pub fn migration_with(&self, options: MigrationOptions) -> (Migration, EventRecorder) {
        let mut migration = Migration::new(options).expect("Failed to create migration");
        let recorder = EventRecorder::new();
        migration.subscribe(recorder.clone());
        (migration, recorder)
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

/// Small JavaScript project used by scenario tests
pub fn sample_js_project() -> TestProject {
    TestProject::with_files(&[
        ("package.json", "{\"name\":\"sample\"}"),
        ("src/index.js", "var app = require('./app');\n"),
        ("src/app.js", "var name = 'app';\nmodule.exports = name;\n"),
        ("src/util/math.js", "var add = (a, b) => a + b;\n"),
        ("node_modules/dep/index.js", "var dep = 1;\n"),
        ("build/out.tmp", "junk"),
        ("build/cache.tmp", "junk"),
    ])
}
