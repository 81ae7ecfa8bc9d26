//! `kiln init`: creates a new project in a subdirectory of the working
//! directory.

use super::{command_error, GeneratorCommand, Generator};
use crate::answers::{Answer, Answers};
use crate::constants::VERSIONS_TIMEOUT_SECS;
use crate::error::{Error, Result};
use crate::model::{Bindings, Context, Model};
use crate::project::ProjectModel;
use crate::question::Question;
use crate::validators;
use crate::versions::{is_version, VersionsLoader};
use log::debug;
use rand::seq::SliceRandom;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

const PROJECT_TEMPLATE: &str = "project";
const CUSTOM_VERSION: &str = "another version";

const REPOS: [&str; 2] =
    ["https://dl.bintray.com/cuba-platform/main", "https://repo.cuba-platform.com/content/groups/work"];

const ANIMALS: [&str; 15] = [
    "phoenix", "centaur", "mermaid", "leviathan", "dragon", "pegasus", "siren", "hydra", "sphinx",
    "unicorn", "wyvern", "behemoth", "griffon", "dodo", "mammoth",
];

const ADJECTIVES: [&str; 20] = [
    "great", "cool", "ambitious", "generous", "cute", "dear", "nice", "reliable", "solid", "trusty",
    "simple", "pure", "brave", "manly", "fearless", "artful", "vivid", "utopic", "lucid", "radiant",
];

/// Entries rendered with substitution.
const RENDERED_ENTRIES: [&str; 3] = ["modules", "build.gradle", "settings.gradle"];
/// Entries copied as they are.
const COPIED_ENTRIES: [&str; 3] = ["gradle", "gradlew", "gradlew.bat"];

/// A database a project can be set up for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Database {
    pub name: &'static str,
    pub alias: &'static str,
    pub driver: &'static str,
    pub url_prefix: &'static str,
}

pub const DATABASES: [Database; 6] = [
    Database { name: "HSQLDB", alias: "hsql", driver: "org.hsqldb.jdbc.JDBCDriver", url_prefix: "jdbc:hsqldb:hsql://" },
    Database { name: "PostgreSQL", alias: "postgres", driver: "org.postgresql.Driver", url_prefix: "jdbc:postgresql://" },
    Database { name: "Microsoft SQL Server", alias: "mssql", driver: "com.microsoft.sqlserver.jdbc.SQLServerDriver", url_prefix: "jdbc:sqlserver://" },
    Database { name: "Microsoft SQL Server 2005", alias: "mssql-2005", driver: "net.sourceforge.jtds.jdbc.Driver", url_prefix: "jdbc:jtds:sqlserver://" },
    Database { name: "MySQL", alias: "mysql", driver: "com.mysql.jdbc.Driver", url_prefix: "jdbc:mysql://" },
    Database { name: "Oracle", alias: "oracle", driver: "oracle.jdbc.OracleDriver", url_prefix: "jdbc:oracle:thin:@//" },
];

const ORACLE_TIP: &str = "Oracle JDBC driver is not distributed with the project. \
    Download ojdbc6.jar and put it into the lib directory of your application server.";

/// Looks a database up by display name or alias.
pub fn find_database(value: &str) -> Option<&'static Database> {
    DATABASES.iter().find(|db| db.name == value || db.alias == value)
}

/// Project name made of a random adjective and animal, e.g. `brave-hydra`.
pub fn random_project_name() -> String {
    let mut rng = rand::thread_rng();
    let adjective = ADJECTIVES.choose(&mut rng).copied().unwrap_or("new");
    let animal = ANIMALS.choose(&mut rng).copied().unwrap_or("project");
    format!("{adjective}-{animal}")
}

/// Default namespace for a project name: alphanumerics only, no leading
/// digits, lower case.
pub fn namespace_from(project_name: &str) -> String {
    static NON_ALPHANUMERIC: OnceLock<Regex> = OnceLock::new();
    let re = NON_ALPHANUMERIC.get_or_init(|| Regex::new("[^a-zA-Z0-9]").unwrap_or_else(|e| panic!("{e}")));
    re.replace_all(project_name, "")
        .trim_start_matches(|c: char| c.is_ascii_digit())
        .to_lowercase()
}

pub struct InitCommand {
    versions_loader: Option<VersionsLoader>,
    timeout: Duration,
    versions: Vec<String>,
}

impl InitCommand {
    /// `versions_loader` supplies the predefined platform versions; without
    /// one only a custom version can be entered.
    pub fn new(versions_loader: Option<VersionsLoader>) -> Self {
        Self {
            versions_loader,
            timeout: Duration::from_secs(VERSIONS_TIMEOUT_SECS),
            versions: Vec::new(),
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn version_questions(&self, interactive: bool) -> Vec<Question> {
        let custom_version = Question::text("platformVersion", "Platform version").validate(
            move |value, _| {
                let version = value.as_str().unwrap_or_default().trim();
                if version.is_empty() && interactive {
                    Err("Type platform version".to_string())
                } else if !is_version(version) {
                    Err(format!("Unable to parse \"{version}\" as platform version"))
                } else {
                    Ok(())
                }
            },
        );

        if !interactive {
            return vec![custom_version];
        }

        let mut options = self.versions.clone();
        options.push(CUSTOM_VERSION.to_string());
        vec![
            Question::select("predefinedPlatformVersion", "Platform version", options).default_index(0),
            custom_version.ask_if(|answers| answers.str("predefinedPlatformVersion") == Some(CUSTOM_VERSION)),
        ]
    }

    fn generate_files(&self, cwd: &Path, bindings: &Bindings, generator: &mut Generator<'_>) -> Result<()> {
        let mut processor = generator.processor(PROJECT_TEMPLATE, cwd, bindings)?;
        for entry in RENDERED_ENTRIES {
            processor.transform(entry)?;
        }
        processor.copy("gitignore")?;
        for entry in COPIED_ENTRIES {
            processor.copy(entry)?;
        }
        generator.finish_processor(processor);

        let gitignore = cwd.join("gitignore");
        let dotfile = cwd.join(".gitignore");
        fs::rename(&gitignore, &dotfile)?;
        for change in generator.report().changes.iter_mut().filter(|change| change.path == gitignore) {
            change.path = dotfile.clone();
        }

        make_executable(&cwd.join("gradlew"));
        Ok(())
    }
}

#[cfg(unix)]
fn make_executable(path: &Path) {
    use std::os::unix::fs::PermissionsExt;

    if let Err(e) = fs::set_permissions(path, fs::Permissions::from_mode(0o755)) {
        log::warn!("Unable to make '{}' executable: {}", path.display(), e);
    }
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) {}

impl GeneratorCommand for InitCommand {
    type Model = ProjectModel;

    fn check_preconditions(&mut self, ctx: &Context) -> Result<()> {
        if ctx.has_model(ProjectModel::NAME) {
            return Err(command_error("There is an existing project found in current directory."));
        }

        if let Some(loader) = self.versions_loader.take() {
            self.versions = loader.join(self.timeout);
        }
        debug!("{} platform versions available", self.versions.len());
        Ok(())
    }

    fn questions(&self, ctx: &Context, interactive: bool) -> Result<Vec<Question>> {
        let working_dir: PathBuf = ctx.working_dir().to_path_buf();

        let mut project_name = Question::text("projectName", "Project Name")
            .validate(validators::matches(
                r"[\w\-]*",
                "Project name should contain only Latin letters, digits, dashes and underscores.",
            ))
            .validate(validators::not_blank("Empty names not allowed"))
            .validate(move |value, _| {
                let name = value.as_str().unwrap_or_default();
                if working_dir.join(name).is_dir() {
                    Err(format!("Directory with such name {name} already exists"))
                } else {
                    Ok(())
                }
            });
        if interactive {
            project_name = project_name.default(random_project_name());
        }

        let mut questions = vec![
            Question::select("repo", "Repository to be used in project.", REPOS).default_index(0),
            project_name,
            Question::text("namespace", "Project Namespace")
                .default_with(|answers| answers.str("projectName").map(|name| Answer::Text(namespace_from(name))))
                .validate(validators::matches(
                    "[a-z][a-z0-9]*",
                    "Project namespace can contain only lowercase alphanumeric characters and start with a letter.",
                )),
            Question::text("rootPackage", "Root package")
                .default_template("com.company.{{ namespace | lower }}")
                .validate(validators::is_package())
                .validate(|value, _| {
                    let package = value.as_str().unwrap_or_default();
                    if package.to_lowercase() == package {
                        Ok(())
                    } else {
                        Err("Root package is allowed in lower case".to_string())
                    }
                }),
        ];
        questions.extend(self.version_questions(interactive));

        let databases: Vec<&str> = if interactive {
            DATABASES.iter().map(|db| db.name).collect()
        } else {
            DATABASES.iter().map(|db| db.alias).collect()
        };
        questions.push(Question::select("database", "Choose database", databases).default_index(0));

        Ok(questions)
    }

    fn build_model(&self, answers: &Answers, _ctx: &Context) -> Result<ProjectModel> {
        let platform_version = match answers.optional_text("platformVersion")? {
            Some(version) => version,
            None => answers.text("predefinedPlatformVersion")?,
        };
        let database = answers.text("database")?;
        let database = find_database(database)
            .ok_or_else(|| Error::validation("database", format!("unknown database '{database}'")))?;

        Ok(ProjectModel {
            project_name: answers.text("projectName")?.to_string(),
            namespace: answers.text("namespace")?.to_string(),
            root_package: answers.text("rootPackage")?.to_string(),
            platform_version: platform_version.trim().to_string(),
            repo: answers.text("repo")?.to_string(),
            database: database.alias.to_string(),
        })
    }

    fn before_generation(&self, model: &ProjectModel, bindings: &mut Bindings) {
        if let Some(database) = find_database(&model.database) {
            bindings.insert("databaseName", database.name);
            bindings.insert("dbDriver", database.driver);
            bindings.insert("dbUrlPrefix", database.url_prefix);
        }
    }

    fn generate(
        &self,
        ctx: &mut Context,
        model: &ProjectModel,
        bindings: &Bindings,
        generator: &mut Generator<'_>,
    ) -> Result<()> {
        let cwd = ctx.working_dir().join(&model.project_name);
        fs::create_dir_all(&cwd)?;
        ctx.set_working_dir(&cwd);
        debug!("Working directory moved to {}", cwd.display());

        self.generate_files(&cwd, bindings, generator)?;

        let descriptor = model.save(&cwd)?;
        generator.report().created(descriptor);

        generator.report().tip(format!("Project created in '{}'", cwd.display()));
        if model.database == "oracle" {
            generator.report().tip(ORACLE_TIP);
        }
        Ok(())
    }
}
