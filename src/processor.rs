//! Template tree processing: mirrors a template directory into a target
//! directory, substituting bindings in paths and contents.

use globset::GlobSet;
use log::debug;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::{
    constants::{TEMPLATE_EXTENSION, VERBATIM_FILE},
    error::{Error, Result},
    model::Bindings,
    renderer::{substitute_placeholders, TemplateRenderer},
    verbatim::parse_verbatim_file,
};

/// Which part of a template tree to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderMode {
    WholeTree,
    SingleFile(PathBuf),
    NamedSubset(Vec<PathBuf>),
}

/// Returns true for `name.ext.j2` style file names.
pub fn is_jinja_template(filename: &str) -> bool {
    let parts: Vec<&str> = filename.split('.').collect();
    parts.len() > 2 && parts.last() == Some(&TEMPLATE_EXTENSION)
}

/// Joins `rendered_path` to `target_dir`, dropping a template extension.
///
/// Returns the target path and whether the content goes through the
/// template engine.
pub fn resolve_target_path<P: AsRef<Path>>(rendered_path: &str, target_dir: P) -> (PathBuf, bool) {
    let target_dir = target_dir.as_ref();
    let path = Path::new(rendered_path);

    match path.file_name().and_then(|n| n.to_str()) {
        Some(filename) if is_jinja_template(filename) => {
            let stripped = &filename[..filename.len() - TEMPLATE_EXTENSION.len() - 1];
            (target_dir.join(path.with_file_name(stripped)), true)
        }
        _ => (target_dir.join(path), false),
    }
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content).map_err(Error::IoError)
}

fn copy_file(source: &Path, dest: &Path) -> Result<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(source, dest).map(|_| ()).map_err(Error::IoError)
}

/// Renders template entries into a target directory.
pub struct TemplateProcessor<'a> {
    renderer: &'a dyn TemplateRenderer,
    template_root: PathBuf,
    target_root: PathBuf,
    context: serde_json::Value,
    verbatim: GlobSet,
    overwrite: bool,
    written: Vec<PathBuf>,
}

impl<'a> TemplateProcessor<'a> {
    pub fn new<P: Into<PathBuf>, Q: Into<PathBuf>>(
        renderer: &'a dyn TemplateRenderer,
        template_root: P,
        target_root: Q,
        bindings: &Bindings,
    ) -> Result<Self> {
        let template_root = template_root.into();
        let verbatim = parse_verbatim_file(&template_root)?;
        Ok(Self {
            renderer,
            template_root,
            target_root: target_root.into(),
            context: bindings.to_context(),
            verbatim,
            overwrite: false,
            written: Vec::new(),
        })
    }

    /// Allows existing target files to be replaced.
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn target_root(&self) -> &Path {
        &self.target_root
    }

    /// Renders every entry of the template.
    pub fn transform_whole(&mut self) -> Result<()> {
        self.process(Path::new(""), false)
    }

    /// Renders one file or directory of the template, relative to its root.
    pub fn transform<P: AsRef<Path>>(&mut self, entry: P) -> Result<()> {
        self.process(entry.as_ref(), false)
    }

    /// Copies one file or directory without any substitution.
    pub fn copy<P: AsRef<Path>>(&mut self, entry: P) -> Result<()> {
        self.process(entry.as_ref(), true)
    }

    /// Files written so far, in order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    pub fn into_written(self) -> Vec<PathBuf> {
        self.written
    }

    fn process(&mut self, entry: &Path, verbatim: bool) -> Result<()> {
        let source_root = self.template_root.join(entry);
        if !source_root.exists() {
            return Err(Error::TemplateError(format!(
                "'{}' not found in template '{}'",
                entry.display(),
                self.template_root.display()
            )));
        }

        for dir_entry in WalkDir::new(&source_root).sort_by_file_name() {
            let dir_entry = dir_entry.map_err(|e| Error::TemplateError(e.to_string()))?;
            let source = dir_entry.path();
            let relative = source
                .strip_prefix(&self.template_root)
                .map_err(|e| Error::TemplateError(e.to_string()))?;
            let relative = relative
                .to_str()
                .ok_or_else(|| Error::TemplateError("Invalid path".to_string()))?;

            if relative.is_empty() || relative == VERBATIM_FILE {
                continue;
            }

            debug!("Processing source file: {}", relative);

            let rendered = substitute_placeholders(relative, &self.context);
            let copy_only = verbatim || self.verbatim.is_match(relative);
            let (target, is_template) = if copy_only {
                (self.target_root.join(&rendered), false)
            } else {
                resolve_target_path(&rendered, &self.target_root)
            };

            if dir_entry.file_type().is_dir() {
                fs::create_dir_all(&target)?;
                continue;
            }

            if target.exists() && !self.overwrite {
                return Err(Error::FileExistsError { path: target });
            }

            if copy_only {
                debug!("Copying file: {}", target.display());
                copy_file(source, &target)?;
            } else if is_template {
                debug!("Rendering file: {}", target.display());
                let content = fs::read_to_string(source)?;
                write_file(&target, &self.renderer.render(&content, &self.context)?)?;
            } else {
                match fs::read_to_string(source) {
                    Ok(content) => {
                        debug!("Writing file: {}", target.display());
                        write_file(&target, &substitute_placeholders(&content, &self.context))?;
                    }
                    Err(e) if e.kind() == ErrorKind::InvalidData => {
                        debug!("Copying binary file: {}", target.display());
                        copy_file(source, &target)?;
                    }
                    Err(e) => return Err(Error::IoError(e)),
                }
            }

            self.written.push(target);
        }

        Ok(())
    }
}

/// Renders `template_root` into `target_root` according to `mode`.
///
/// # Returns
/// * `Result<Vec<PathBuf>>` - Files written, in order
///
/// # Errors
/// * `Error::FileExistsError` if a target exists and `overwrite` is false
/// * `Error::IoError` on filesystem failures
pub fn render<P: AsRef<Path>, Q: AsRef<Path>>(
    renderer: &dyn TemplateRenderer,
    template_root: P,
    target_root: Q,
    bindings: &Bindings,
    mode: RenderMode,
    overwrite: bool,
) -> Result<Vec<PathBuf>> {
    let mut processor = TemplateProcessor::new(
        renderer,
        template_root.as_ref(),
        target_root.as_ref(),
        bindings,
    )?
    .overwrite(overwrite);

    match mode {
        RenderMode::WholeTree => processor.transform_whole()?,
        RenderMode::SingleFile(entry) => processor.transform(entry)?,
        RenderMode::NamedSubset(entries) => {
            for entry in entries {
                processor.transform(entry)?;
            }
        }
    }

    Ok(processor.into_written())
}
