//! Small filesystem helpers shared by the renderer and the patchers.

use crate::error::{Error, Result};
use log::debug;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Replaces the contents of `path` atomically.
///
/// The data is written to a temporary file in the same directory which is
/// then renamed over `path`, so a failure never leaves a half-written file.
pub fn write_atomic<P: AsRef<Path>>(path: P, content: &[u8]) -> Result<()> {
    let path = path.as_ref();
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let mut temp = NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;
    if let Ok(metadata) = fs::metadata(path) {
        temp.as_file().set_permissions(metadata.permissions())?;
    }
    temp.persist(path).map_err(|e| Error::IoError(e.error))?;

    debug!("Wrote '{}'", path.display());
    Ok(())
}

/// Fails with `cause` if `path` exists.
pub fn ensure_file_absence<P: AsRef<Path>>(path: P, cause: impl Into<String>) -> Result<()> {
    if path.as_ref().exists() {
        return Err(Error::CommandError(cause.into()));
    }
    Ok(())
}

/// Reads a file that a patcher is about to edit.
pub fn read_file<P: AsRef<Path>>(path: P) -> Result<String> {
    Ok(fs::read_to_string(path)?)
}
