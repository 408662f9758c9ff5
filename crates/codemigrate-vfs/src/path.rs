//! Lexical path helpers

use std::path::{Component, Path, PathBuf};

/// Normalizes a path without touching the filesystem.
///
/// `.` components are dropped and `..` removes the previous normal component.
/// A `..` that would climb above the root (or above the start of a relative
/// path) is kept for relative paths and dropped for absolute ones.
pub fn normalize<P: AsRef<Path>>(path: P) -> PathBuf {
    let mut normalized = PathBuf::new();

    for component in path.as_ref().components() {
        match component {
            Component::Prefix(prefix) => normalized.push(prefix.as_os_str()),
            Component::RootDir => normalized.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                let last_is_normal = matches!(
                    normalized.components().next_back(),
                    Some(Component::Normal(_))
                );
                if last_is_normal {
                    normalized.pop();
                } else if !normalized.has_root() {
                    normalized.push("..");
                }
            }
            Component::Normal(name) => normalized.push(name),
        }
    }

    normalized
}

/// Renders a relative path with `/` separators, the form globs match against.
pub fn to_slash<P: AsRef<Path>>(path: P) -> String {
    path.as_ref()
        .components()
        .filter_map(|component| match component {
            Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
            Component::ParentDir => Some("..".to_string()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case("/a/b/../c", "/a/c")]
    #[case("/a/./b/", "/a/b")]
    #[case("/../a", "/a")]
    #[case("a/../../b", "../b")]
    #[case("./src/index.ts", "src/index.ts")]
    fn test_normalize(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize(input), PathBuf::from(expected));
    }

    #[test]
    fn test_to_slash() {
        let path: PathBuf = ["src", "components", "App.tsx"].iter().collect();
        assert_eq!(to_slash(path), "src/components/App.tsx");
    }

    proptest! {
        #[test]
        fn test_normalize_is_idempotent(parts in proptest::collection::vec("[a-z]{1,3}|\\.|\\.\\.", 0..8)) {
            let path = format!("/{}", parts.join("/"));
            let once = normalize(&path);
            prop_assert_eq!(normalize(&once), once.clone());
            prop_assert!(once
                .components()
                .all(|c| !matches!(c, Component::CurDir | Component::ParentDir)));
        }
    }
}
