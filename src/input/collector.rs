//! Content collection
//!
//! Reads the text behind a resolved input. Files are labeled with the string
//! the user typed; directory children are labeled with their bare file name.

use crate::errors::{F2ReadError, Result};
use crate::input::resolver::{not_found, PathKind, ResolvedPath};
use std::path::{Path, PathBuf};

/// One labeled section of the prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledContent {
    pub label: String,
    pub text: String,
}

impl LabeledContent {
    pub fn new(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            text: text.into(),
        }
    }
}

/// Collect the labeled content for one resolved input.
///
/// Directories are expanded one level only and their files are visited in
/// lexicographic order of file name.
pub async fn collect(input: &str, resolved: &ResolvedPath) -> Result<Vec<LabeledContent>> {
    match resolved.kind {
        PathKind::File => {
            let text = read_text(&resolved.absolute_path).await?;
            Ok(vec![LabeledContent::new(input, text)])
        }
        PathKind::Directory => collect_directory(input, &resolved.absolute_path).await,
        PathKind::NotFound => Err(not_found(
            input,
            resolved.absolute_path.display().to_string(),
        )),
    }
}

async fn collect_directory(input: &str, dir: &Path) -> Result<Vec<LabeledContent>> {
    tracing::info!(folder = input, "Opening folder");

    let mut files = list_files(dir).await?;
    files.sort();

    let mut contents = Vec::with_capacity(files.len());
    for (name, path) in files {
        let text = read_text(&path).await?;
        contents.push(LabeledContent::new(name, text));
    }

    tracing::info!(folder = input, files = contents.len(), "Done searching folder");
    Ok(contents)
}

/// Immediate child files of `dir` as (file name, path) pairs
async fn list_files(dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    let read_failed = |source| F2ReadError::ReadFailed {
        path: dir.display().to_string(),
        source,
    };

    let mut entries = tokio::fs::read_dir(dir).await.map_err(read_failed)?;
    let mut files = Vec::new();

    while let Some(entry) = entries.next_entry().await.map_err(read_failed)? {
        let path = entry.path();
        // follows symlinks, so a link to a file is read like a file
        let is_dir = tokio::fs::metadata(&path)
            .await
            .map(|meta| meta.is_dir())
            .unwrap_or(false);

        if is_dir {
            tracing::debug!(path = %path.display(), "Skipping subdirectory");
            continue;
        }

        let name = entry.file_name().to_string_lossy().to_string();
        files.push((name, path));
    }

    Ok(files)
}

async fn read_text(path: &Path) -> Result<String> {
    tracing::info!(path = %path.display(), "Reading file");

    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| F2ReadError::ReadFailed {
            path: path.display().to_string(),
            source,
        })
}
