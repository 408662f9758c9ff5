//! Glob pattern resolution against the overlay

use crate::file::File;
use crate::overlay::VirtualFileSystem;
use crate::path::to_slash;
use codemigrate_types::{Error, Result};
use globset::{Glob, GlobBuilder, GlobMatcher, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Compiled glob that selects files relative to a working directory.
///
/// `*` and `?` never cross a `/`; `**` does. Brace alternation
/// (`*.{js,jsx}`) and character classes are supported.
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    pattern: String,
    matcher: GlobMatcher,
    ignore: GlobSet,
}

impl PatternMatcher {
    /// Compiles `pattern`. An empty pattern is rejected.
    pub fn new(pattern: &str) -> Result<Self> {
        let trimmed = pattern.trim();
        if trimmed.is_empty() {
            return Err(Error::pattern(pattern, "pattern must not be empty"));
        }
        let normalized = trimmed.strip_prefix("./").unwrap_or(trimmed);

        let matcher = GlobBuilder::new(normalized)
            .literal_separator(true)
            .build()
            .map_err(|e| Error::pattern(pattern, e.to_string()))?
            .compile_matcher();

        Ok(Self {
            pattern: pattern.to_string(),
            matcher,
            ignore: GlobSet::empty(),
        })
    }

    /// Excludes every path matching one of `globs`
    pub fn with_ignore<I, S>(mut self, globs: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = GlobSetBuilder::new();
        for glob in globs {
            let glob = glob.as_ref();
            builder.add(Glob::new(glob).map_err(|e| Error::pattern(glob, e.to_string()))?);
        }
        self.ignore = builder
            .build()
            .map_err(|e| Error::pattern(&self.pattern, e.to_string()))?;
        Ok(self)
    }

    /// The pattern as supplied
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Whether a working-directory-relative path is selected
    pub fn is_match<P: AsRef<Path>>(&self, relative: P) -> bool {
        let candidate = to_slash(relative);
        self.matcher.is_match(&candidate) && !self.ignore.is_match(&candidate)
    }

    /// Whether the walk may skip `relative_dir` entirely.
    ///
    /// A directory is skipped when its path followed by `/` matches an ignore
    /// glob, which is how `dir/**` and `**/dir/**` globs exclude it.
    pub fn ignores_dir<P: AsRef<Path>>(&self, relative_dir: P) -> bool {
        let candidate = format!("{}/", to_slash(relative_dir));
        self.ignore.is_match(candidate)
    }

    /// Resolves the pattern to working-directory-relative paths, sorted.
    ///
    /// Ignored directories are pruned from the walk instead of being
    /// filtered afterwards.
    pub fn resolve(&self, fs: &VirtualFileSystem) -> Vec<PathBuf> {
        let matched: Vec<PathBuf> = fs
            .list_files_pruned(|dir| self.ignores_dir(dir))
            .into_iter()
            .filter(|relative| self.is_match(relative))
            .collect();

        debug!("Pattern '{}' matched {} file(s)", self.pattern, matched.len());
        matched
    }
}

/// Resolves `pattern` into [`File`] snapshots, in path order.
///
/// No match is an empty vector, not an error. Binary files are returned
/// like any other; only [`File::source`] cares about encoding.
pub fn get_files(fs: &VirtualFileSystem, pattern: &str, ignore: &[String]) -> Result<Vec<File>> {
    let matcher = PatternMatcher::new(pattern)?.with_ignore(ignore)?;
    matcher
        .resolve(fs)
        .into_iter()
        .map(|relative| File::open(fs, relative))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::fs;
    use tempfile::TempDir;

    fn project() -> (TempDir, VirtualFileSystem) {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        for (name, content) in [
            ("README.md", "# readme"),
            ("b.txt", "b"),
            ("a.txt", "a"),
            ("src/index.js", "index"),
            ("src/App.jsx", "app"),
            ("src/util/math.js", "math"),
            ("node_modules/dep/index.js", "dep"),
        ] {
            let path = root.join(name);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }
        let vfs = VirtualFileSystem::new(root).unwrap();
        (temp_dir, vfs)
    }

    fn ignore_node_modules() -> Vec<String> {
        vec!["**/node_modules/**".to_string()]
    }

    fn names(files: &[File]) -> Vec<String> {
        files.iter().map(|file| to_slash(file.file_name())).collect()
    }

    #[rstest]
    #[case("*.txt", vec!["a.txt", "b.txt"])]
    #[case("./*.txt", vec!["a.txt", "b.txt"])]
    #[case("src/*.js", vec!["src/index.js"])]
    #[case("src/**/*.js", vec!["src/index.js", "src/util/math.js"])]
    #[case("src/*.{js,jsx}", vec!["src/App.jsx", "src/index.js"])]
    #[case("*.rs", vec![])]
    fn test_resolve(#[case] pattern: &str, #[case] expected: Vec<&str>) {
        let (_dir, vfs) = project();
        let files = get_files(&vfs, pattern, &ignore_node_modules()).unwrap();
        assert_eq!(names(&files), expected);
    }

    #[test]
    fn test_ignore_globs_hide_matches() {
        let (_dir, vfs) = project();
        let without_ignore = get_files(&vfs, "**/index.js", &[]).unwrap();
        let with_ignore = get_files(&vfs, "**/index.js", &ignore_node_modules()).unwrap();

        assert_eq!(names(&without_ignore), vec!["node_modules/dep/index.js", "src/index.js"]);
        assert_eq!(names(&with_ignore), vec!["src/index.js"]);
    }

    #[test]
    fn test_resolve_sees_overlay() {
        let (_dir, mut vfs) = project();
        vfs.write_file("c.txt", "staged");
        vfs.remove_file("a.txt").unwrap();

        let files = get_files(&vfs, "*.txt", &[]).unwrap();
        assert_eq!(names(&files), vec!["b.txt", "c.txt"]);
        assert_eq!(files[1].source().unwrap(), "staged");
    }

    #[rstest]
    #[case("node_modules", true)]
    #[case("packages/app/node_modules", true)]
    #[case("dist", true)]
    #[case("src", false)]
    #[case("src/node_modules_helpers", false)]
    fn test_ignores_dir(#[case] dir: &str, #[case] ignored: bool) {
        let matcher = PatternMatcher::new("**/*.js")
            .unwrap()
            .with_ignore(["**/node_modules/**", "dist/**"])
            .unwrap();
        assert_eq!(matcher.ignores_dir(dir), ignored);
    }

    #[test]
    fn test_binary_files_are_matched() {
        let (dir, vfs) = project();
        fs::write(dir.path().join("logo.png"), [0x89u8, 0x50, 0xff, 0xfe]).unwrap();

        let files = get_files(&vfs, "*.png", &[]).unwrap();
        assert_eq!(names(&files), vec!["logo.png"]);
        assert!(files[0].source().is_err());
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let (_dir, vfs) = project();
        let matcher = PatternMatcher::new("**/*").unwrap();
        assert_eq!(matcher.resolve(&vfs), matcher.resolve(&vfs));
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("src/{a,b")]
    fn test_invalid_patterns(#[case] pattern: &str) {
        assert!(matches!(
            PatternMatcher::new(pattern),
            Err(Error::Pattern { .. })
        ));
    }
}
