//! Copy-verbatim patterns for kiln templates.
//! A template may list glob patterns in a `.verbatim` file; matching entries
//! (and a built-in set of binary files) are copied byte-for-byte instead of
//! having their placeholders substituted.

use crate::constants::{DEFAULT_VERBATIM_PATTERNS, VERBATIM_FILE};
use crate::error::{Error, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use log::debug;
use std::{fs::read_to_string, path::Path};

/// Reads the `.verbatim` file of `template_root` into a set of glob patterns.
///
/// # Notes
/// - If the file doesn't exist only the default patterns are used
/// - Each non-empty line that does not start with `#` is a glob pattern
/// - Invalid patterns result in a ConfigError
///
/// # Example
/// ```ignore
/// # Contents of .verbatim:
/// gradle/**
/// **/*.bat
/// ```
pub fn parse_verbatim_file<P: AsRef<Path>>(template_root: P) -> Result<GlobSet> {
    let verbatim_path = template_root.as_ref().join(VERBATIM_FILE);
    let mut builder = GlobSetBuilder::new();

    for pattern in DEFAULT_VERBATIM_PATTERNS {
        builder.add(glob(pattern)?);
    }

    if let Ok(contents) = read_to_string(&verbatim_path) {
        for line in contents.lines().map(str::trim) {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            builder.add(glob(line)?);
        }
    } else {
        debug!("{} does not exist", verbatim_path.display());
    }

    builder
        .build()
        .map_err(|e| Error::ConfigError(format!("{VERBATIM_FILE} loading failed: {e}")))
}

fn glob(pattern: &str) -> Result<Glob> {
    Glob::new(pattern)
        .map_err(|e| Error::ConfigError(format!("{VERBATIM_FILE} loading failed: {e}")))
}
