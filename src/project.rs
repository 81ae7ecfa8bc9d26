//! The project descriptor written by `init` and the file layout derived
//! from it.

use crate::constants::PROJECT_FILE;
use crate::error::{Error, Result};
use crate::files::write_atomic;
use crate::model::{Bindings, Model};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Project-wide settings, stored in `kiln.yaml` at the project root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectModel {
    pub project_name: String,
    pub namespace: String,
    pub root_package: String,
    pub platform_version: String,
    pub repo: String,
    /// Database alias, e.g. `hsql` or `postgres`.
    pub database: String,
}

impl Model for ProjectModel {
    const NAME: &'static str = "project";

    fn bindings(&self) -> Bindings {
        Bindings::new()
            .with("projectName", self.project_name.as_str())
            .with("namespace", self.namespace.as_str())
            .with("rootPackage", self.root_package.as_str())
            .with("rootPackageDir", package_to_dir(&self.root_package))
            .with("platformVersion", self.platform_version.as_str())
            .with("repo", self.repo.as_str())
            .with("database", self.database.as_str())
    }
}

impl ProjectModel {
    /// Reads the descriptor from `project_dir`, if there is one.
    pub fn load<P: AsRef<Path>>(project_dir: P) -> Result<Option<Self>> {
        let path = project_dir.as_ref().join(PROJECT_FILE);
        if !path.is_file() {
            return Ok(None);
        }

        debug!("Loading project descriptor from {}", path.display());
        let content = fs::read_to_string(&path)?;
        serde_yaml::from_str(&content)
            .map(Some)
            .map_err(|e| Error::ConfigError(format!("invalid {}: {}", path.display(), e)))
    }

    /// Writes the descriptor into `project_dir` and returns its path.
    pub fn save<P: AsRef<Path>>(&self, project_dir: P) -> Result<PathBuf> {
        let path = project_dir.as_ref().join(PROJECT_FILE);
        let content = serde_yaml::to_string(self).map_err(|e| Error::ConfigError(e.to_string()))?;
        write_atomic(&path, content.as_bytes())?;
        Ok(path)
    }
}

/// `com.company.sales` -> `com/company/sales`
pub fn package_to_dir(package: &str) -> String {
    package.replace('.', "/")
}

/// Modules of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Module {
    Global,
    Core,
    Web,
}

impl Module {
    fn dir_name(self) -> &'static str {
        match self {
            Module::Global => "global",
            Module::Core => "core",
            Module::Web => "web",
        }
    }
}

/// Concrete paths of the files commands read and patch.
#[derive(Debug, Clone)]
pub struct ProjectLayout {
    root: PathBuf,
    root_package_dir: String,
}

impl ProjectLayout {
    pub fn new<P: Into<PathBuf>>(root: P, project: &ProjectModel) -> Self {
        Self { root: root.into(), root_package_dir: package_to_dir(&project.root_package) }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Source root of `module`.
    pub fn src(&self, module: Module) -> PathBuf {
        self.root.join("modules").join(module.dir_name()).join("src")
    }

    /// Directory of `package` inside `module`.
    pub fn package_dir(&self, module: Module, package: &str) -> PathBuf {
        self.src(module).join(package_to_dir(package))
    }

    fn root_package_dir(&self, module: Module) -> PathBuf {
        self.src(module).join(&self.root_package_dir)
    }

    pub fn persistence_xml(&self) -> PathBuf {
        self.root_package_dir(Module::Global).join("persistence.xml")
    }

    pub fn metadata_xml(&self) -> PathBuf {
        self.root_package_dir(Module::Global).join("metadata.xml")
    }

    pub fn screens_xml(&self) -> PathBuf {
        self.root_package_dir(Module::Web).join("web-screens.xml")
    }

    pub fn menu_xml(&self) -> PathBuf {
        self.root_package_dir(Module::Web).join("web-menu.xml")
    }

    /// Main message bundle of the web module.
    pub fn web_messages(&self) -> PathBuf {
        self.root_package_dir(Module::Web).join("web").join("messages.properties")
    }

    /// Message bundle of `package` inside `module`.
    pub fn messages(&self, module: Module, package: &str) -> PathBuf {
        self.package_dir(module, package).join("messages.properties")
    }

    /// Source file of the fully qualified class `class_name`.
    pub fn class_source(&self, module: Module, class_name: &str) -> PathBuf {
        let (package, name) = class_name.rsplit_once('.').unwrap_or(("", class_name));
        self.package_dir(module, package).join(format!("{name}.java"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> ProjectModel {
        ProjectModel {
            project_name: "sales".to_string(),
            namespace: "sales".to_string(),
            root_package: "com.company.sales".to_string(),
            platform_version: "7.2.1".to_string(),
            repo: "https://repo.example.org/main".to_string(),
            database: "hsql".to_string(),
        }
    }

    #[test]
    fn test_descriptor_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        assert_eq!(ProjectModel::load(temp_dir.path()).unwrap(), None);

        sample().save(temp_dir.path()).unwrap();
        let content = fs::read_to_string(temp_dir.path().join(PROJECT_FILE)).unwrap();
        assert!(content.contains("rootPackage: com.company.sales"));
        assert_eq!(ProjectModel::load(temp_dir.path()).unwrap(), Some(sample()));
    }

    #[test]
    fn test_invalid_descriptor() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(PROJECT_FILE), "projectName: [").unwrap();
        assert!(matches!(ProjectModel::load(temp_dir.path()), Err(Error::ConfigError(_))));
    }

    #[test]
    fn test_layout_paths() {
        let layout = ProjectLayout::new("/p", &sample());
        assert_eq!(
            layout.persistence_xml(),
            PathBuf::from("/p/modules/global/src/com/company/sales/persistence.xml")
        );
        assert_eq!(
            layout.web_messages(),
            PathBuf::from("/p/modules/web/src/com/company/sales/web/messages.properties")
        );
        assert_eq!(
            layout.class_source(Module::Global, "com.company.sales.entity.Invoice"),
            PathBuf::from("/p/modules/global/src/com/company/sales/entity/Invoice.java")
        );
    }
}
