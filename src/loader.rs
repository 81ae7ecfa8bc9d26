//! Template location for kiln.
//! Commands ask for templates by name; the loader turns the name into the
//! directory holding the template tree.
use crate::error::{Error, Result};
use log::debug;
use std::path::PathBuf;

/// Trait for resolving template names to template directories.
pub trait TemplateLoader {
    /// Returns the root directory of the template called `name`.
    fn load(&self, name: &str) -> Result<PathBuf>;
}

/// Loader for templates stored under a local base directory.
pub struct LocalLoader<P: AsRef<std::path::Path>> {
    base: P,
}

impl<P: AsRef<std::path::Path>> LocalLoader<P> {
    /// Creates a new LocalLoader instance.
    pub fn new(base: P) -> Self {
        Self { base }
    }
}

impl<P: AsRef<std::path::Path>> TemplateLoader for LocalLoader<P> {
    /// Loads a template from the local filesystem.
    ///
    /// # Errors
    /// * `Error::TemplateError` if the template directory doesn't exist
    fn load(&self, name: &str) -> Result<PathBuf> {
        let path = self.base.as_ref().join(name);
        if !path.is_dir() {
            return Err(Error::TemplateError(format!(
                "template '{}' not found in '{}'",
                name,
                self.base.as_ref().display()
            )));
        }

        debug!("Using template '{}' from '{}'", name, path.display());
        Ok(path)
    }
}
