//! Writing of published artifacts.

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::{PipelineError, Result};

/// Write a document as pretty-printed JSON with a trailing newline,
/// replacing any previous file.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let mut body = serde_json::to_string_pretty(value)?;
    body.push('\n');

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| PipelineError::WriteOutput {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, body).map_err(|source| PipelineError::WriteOutput {
        path: path.to_path_buf(),
        source,
    })?;

    info!(path = %path.display(), "Wrote artifact");
    Ok(())
}

/// Outcome of one pass-through copy.
#[derive(Debug, Clone, PartialEq)]
pub enum CopyStatus {
    Copied { bytes: u64 },
    SourceMissing,
}

/// Copy an artifact unchanged into the output directory.
///
/// A missing source is logged and reported, not an error: any copy left
/// by an earlier run is removed so the validator flags the absent output.
pub fn copy_pass_through(source: &Path, destination: &Path) -> Result<CopyStatus> {
    if !source.is_file() {
        warn!(
            source = %source.display(),
            "Pass-through artifact not found, not published"
        );
        if destination.is_file() {
            fs::remove_file(destination).map_err(|err| PipelineError::WriteOutput {
                path: destination.to_path_buf(),
                source: err,
            })?;
            info!(destination = %destination.display(), "Removed stale pass-through artifact");
        }
        return Ok(CopyStatus::SourceMissing);
    }

    if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| PipelineError::WriteOutput {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let bytes = fs::copy(source, destination).map_err(|err| PipelineError::WriteOutput {
        path: destination.to_path_buf(),
        source: err,
    })?;

    info!(
        source = %source.display(),
        destination = %destination.display(),
        bytes,
        "Published pass-through artifact"
    );
    Ok(CopyStatus::Copied { bytes })
}

/// A source file to republish and where it goes.
#[derive(Debug, Clone, PartialEq)]
pub struct PassThrough {
    pub source: PathBuf,
    pub destination: PathBuf,
}

/// Copy every pass-through artifact, returning how many were published.
pub fn publish_all(artifacts: &[PassThrough]) -> Result<usize> {
    let mut published = 0;
    for artifact in artifacts {
        if let CopyStatus::Copied { .. } = copy_pass_through(&artifact.source, &artifact.destination)? {
            published += 1;
        }
    }
    Ok(published)
}
