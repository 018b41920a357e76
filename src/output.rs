//! Output file writing

use crate::errors::{F2ReadError, Result};
use std::path::{Path, PathBuf};

/// Target path for an output name; absolute names are kept as given
pub fn output_path(output_name: &str, source_root: &Path) -> PathBuf {
    source_root.join(output_name)
}

/// Overwrite the output file with `content`.
///
/// Empty content writes nothing and returns `None`.
pub async fn write_output(
    content: &str,
    output_name: &str,
    source_root: &Path,
) -> Result<Option<PathBuf>> {
    if content.is_empty() {
        tracing::warn!(output = output_name, "Model returned no content; nothing written");
        return Ok(None);
    }

    let path = output_path(output_name, source_root);
    tracing::info!(path = %path.display(), "Writing file");

    tokio::fs::write(&path, content)
        .await
        .map_err(|source| F2ReadError::WriteFailed {
            path: path.display().to_string(),
            source,
        })?;

    tracing::info!(path = %path.display(), bytes = content.len(), "File written");
    Ok(Some(path))
}
