//! Input path resolution
//!
//! Turns the strings given on the command line into absolute paths and
//! classifies them with a single metadata probe.

use crate::errors::{F2ReadError, Result};
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

/// What a probed path turned out to be
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    File,
    Directory,
    NotFound,
}

/// Base directory an input string is interpreted against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// Bare names (no separator) live under the source root
    SourceRoot,
    /// Anything with a separator is taken relative to the working directory
    WorkingDir,
}

/// Result of probing one input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    pub absolute_path: PathBuf,
    pub kind: PathKind,
}

/// Decide which base directory an input is relative to.
///
/// Absolute inputs contain a separator and therefore anchor at the working
/// directory, where `join` leaves them untouched.
pub fn anchor_for(input: &str) -> Anchor {
    if has_separator(input) {
        Anchor::WorkingDir
    } else {
        Anchor::SourceRoot
    }
}

fn has_separator(input: &str) -> bool {
    input.contains('/') || input.contains(MAIN_SEPARATOR)
}

/// Inputs written with a trailing separator can only name a folder
fn is_directory_only(input: &str) -> bool {
    input.ends_with('/') || input.ends_with(MAIN_SEPARATOR)
}

/// Resolves inputs against a fixed source root and working directory
#[derive(Debug, Clone)]
pub struct PathResolver {
    source_root: PathBuf,
    working_dir: PathBuf,
}

impl PathResolver {
    pub fn new(source_root: impl Into<PathBuf>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_root: source_root.into(),
            working_dir: working_dir.into(),
        }
    }

    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    /// Absolute path for an input, without touching the filesystem
    pub fn absolute_path(&self, input: &str) -> PathBuf {
        match anchor_for(input) {
            Anchor::SourceRoot => self.source_root.join(input),
            Anchor::WorkingDir => self.working_dir.join(input),
        }
    }

    /// Classify an input with one metadata call; an empty input names nothing
    pub async fn probe(&self, input: &str) -> ResolvedPath {
        let absolute_path = self.absolute_path(input);
        if input.is_empty() {
            return ResolvedPath {
                absolute_path,
                kind: PathKind::NotFound,
            };
        }

        let kind = match tokio::fs::metadata(&absolute_path).await {
            Ok(meta) if meta.is_dir() => PathKind::Directory,
            Ok(_) => PathKind::File,
            Err(e) => {
                tracing::debug!(path = %absolute_path.display(), error = %e, "Probe failed");
                PathKind::NotFound
            }
        };

        ResolvedPath { absolute_path, kind }
    }

    /// Probe an input and fail if it does not exist
    pub async fn resolve(&self, input: &str) -> Result<ResolvedPath> {
        let resolved = self.probe(input).await;

        match resolved.kind {
            PathKind::NotFound => {
                let path = resolved.absolute_path.display().to_string();
                tracing::debug!(input, path = %path, "Input path not found");
                Err(not_found(input, path))
            }
            PathKind::File if is_directory_only(input) => {
                let path = resolved.absolute_path.display().to_string();
                tracing::debug!(input, path = %path, "Expected a folder but found a file");
                Err(F2ReadError::folder_not_found(path))
            }
            _ => Ok(resolved),
        }
    }
}

pub(crate) fn not_found(input: &str, path: String) -> F2ReadError {
    if is_directory_only(input) {
        F2ReadError::folder_not_found(path)
    } else {
        F2ReadError::file_not_found(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;
    use tempfile::TempDir;

    fn setup() -> (TempDir, PathResolver) {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("src");
        std::fs::create_dir_all(root.join("lib")).unwrap();
        std::fs::write(root.join("sample.py"), "print(\"Hello, World!\")\n").unwrap();
        let resolver = PathResolver::new(root, temp_dir.path());
        (temp_dir, resolver)
    }

    #[test]
    fn test_anchor_rule() {
        assert_eq!(anchor_for("sample.py"), Anchor::SourceRoot);
        assert_eq!(anchor_for("lib"), Anchor::SourceRoot);
        assert_eq!(anchor_for("src/sample.py"), Anchor::WorkingDir);
        assert_eq!(anchor_for("./sample.py"), Anchor::WorkingDir);
        assert_eq!(anchor_for("/etc/hosts"), Anchor::WorkingDir);
    }

    #[test]
    fn test_absolute_path_keeps_absolute_inputs() {
        let resolver = PathResolver::new("/work/src", "/work");
        assert_eq!(resolver.absolute_path("/etc/hosts"), PathBuf::from("/etc/hosts"));
        assert_eq!(resolver.absolute_path("a.rs"), PathBuf::from("/work/src/a.rs"));
        assert_eq!(resolver.absolute_path("docs/a.md"), PathBuf::from("/work/docs/a.md"));
    }

    #[tokio::test]
    async fn test_resolve_bare_file_under_source_root() {
        let (temp_dir, resolver) = setup();
        let resolved = resolver.resolve("sample.py").await.unwrap();
        assert_eq!(resolved.kind, PathKind::File);
        assert_eq!(resolved.absolute_path, temp_dir.path().join("src").join("sample.py"));
    }

    #[tokio::test]
    async fn test_resolve_directory() {
        let (_temp_dir, resolver) = setup();
        assert_eq!(resolver.resolve("lib").await.unwrap().kind, PathKind::Directory);
        assert_eq!(resolver.resolve("src/lib/").await.unwrap().kind, PathKind::Directory);
    }

    #[tokio::test]
    async fn test_resolve_missing_file_names_absolute_path() {
        let (temp_dir, resolver) = setup();
        let err = resolver.resolve("missing.py").await.unwrap_err();
        let expected = temp_dir.path().join("src").join("missing.py");
        assert_eq!(
            err.to_string(),
            format!("File not found: {}", expected.display())
        );
    }

    #[tokio::test]
    async fn test_resolve_missing_folder() {
        let (_temp_dir, resolver) = setup();
        let err = resolver.resolve("src/nothing/").await.unwrap_err();
        assert!(err.to_string().starts_with("Folder not found: "));
    }

    #[tokio::test]
    async fn test_trailing_separator_on_file_is_folder_not_found() {
        let (_temp_dir, resolver) = setup();
        let err = resolver.resolve("src/sample.py/").await.unwrap_err();
        assert!(err.to_string().starts_with("Folder not found: "));
    }

    #[tokio::test]
    async fn test_probe_reports_not_found_without_error() {
        let (_temp_dir, resolver) = setup();
        let resolved = resolver.probe("ghost.rs").await;
        assert_eq!(resolved.kind, PathKind::NotFound);
    }

    #[tokio::test]
    async fn test_resolution_is_idempotent() {
        let (_temp_dir, resolver) = setup();
        for input in ["sample.py", "lib", "src/sample.py", "missing.py"] {
            let first = resolver.probe(input).await;
            let second = resolver.probe(input).await;
            assert_eq!(first, second, "probe of {input} changed between calls");
        }
    }

    #[tokio::test]
    async fn test_empty_input_is_not_the_source_root() {
        let (_temp_dir, resolver) = setup();
        let err = resolver.resolve("").await.unwrap_err();
        assert!(err.to_string().starts_with("File not found: "));
    }

    #[quickcheck]
    fn prop_bare_names_stay_under_source_root(input: String) -> bool {
        let resolver = PathResolver::new("/work/src", "/work");
        let path = resolver.absolute_path(&input);
        match anchor_for(&input) {
            Anchor::SourceRoot => path.starts_with("/work/src") && path == resolver.absolute_path(&input),
            Anchor::WorkingDir => has_separator(&input),
        }
    }
}
