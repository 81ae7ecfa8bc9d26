//! Commands built on top of the question engine, the template processor and
//! the patchers.
//!
//! Every command goes through the same pipeline in [`execute`]:
//! preconditions, questions, model, bindings, generation.

pub mod entity;
pub mod init;
pub mod listener;
pub mod screen;

use crate::answers::Answers;
use crate::engine::QuestionEngine;
use crate::error::{Error, Result};
use crate::loader::TemplateLoader;
use crate::model::{Bindings, Context, Model};
use crate::patch::SourcePatcher;
use crate::processor::{self, RenderMode, TemplateProcessor};
use crate::project::{ProjectLayout, ProjectModel};
use crate::question::Question;
use crate::renderer::TemplateRenderer;
use log::debug;
use std::fmt;
use std::path::{Path, PathBuf};

pub use entity::EntityCommand;
pub use init::InitCommand;
pub use listener::ListenerCommand;
pub use screen::ScreenCommand;

/// What happened to a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileAction {
    Created,
    Altered,
}

impl fmt::Display for FileAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileAction::Created => write!(f, "created"),
            FileAction::Altered => write!(f, "altered"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    pub action: FileAction,
    pub path: PathBuf,
}

/// Outcome of a command: changed files in order, plus tips for the user.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Report {
    pub changes: Vec<FileChange>,
    pub tips: Vec<String>,
}

impl Report {
    pub fn created<P: Into<PathBuf>>(&mut self, path: P) {
        self.changes.push(FileChange { action: FileAction::Created, path: path.into() });
    }

    pub fn altered<P: Into<PathBuf>>(&mut self, path: P) {
        let path = path.into();
        let seen = self.changes.iter().any(|change| change.path == path);
        if !seen {
            self.changes.push(FileChange { action: FileAction::Altered, path });
        }
    }

    pub fn tip(&mut self, tip: impl Into<String>) {
        self.tips.push(tip.into());
    }
}

/// Services available to a command while it generates files, and the
/// report of what it did.
pub struct Generator<'a> {
    renderer: &'a dyn TemplateRenderer,
    loader: &'a dyn TemplateLoader,
    source_patcher: &'a dyn SourcePatcher,
    report: Report,
}

impl<'a> Generator<'a> {
    pub fn new(
        renderer: &'a dyn TemplateRenderer,
        loader: &'a dyn TemplateLoader,
        source_patcher: &'a dyn SourcePatcher,
    ) -> Self {
        Self { renderer, loader, source_patcher, report: Report::default() }
    }

    /// Renders the template called `template` into `target` and records
    /// the written files.
    pub fn render(
        &mut self,
        template: &str,
        target: &Path,
        bindings: &Bindings,
        mode: RenderMode,
    ) -> Result<()> {
        let template_root = self.loader.load(template)?;
        let written = processor::render(self.renderer, template_root, target, bindings, mode, false)?;
        for path in written {
            self.report.created(path);
        }
        Ok(())
    }

    /// Opens the template called `template` for entry-by-entry processing.
    /// Written files are recorded by [`Generator::finish_processor`].
    pub fn processor(
        &self,
        template: &str,
        target: &Path,
        bindings: &Bindings,
    ) -> Result<TemplateProcessor<'a>> {
        let template_root = self.loader.load(template)?;
        TemplateProcessor::new(self.renderer, template_root, target, bindings)
    }

    pub fn finish_processor(&mut self, processor: TemplateProcessor<'_>) {
        for path in processor.into_written() {
            self.report.created(path);
        }
    }

    pub fn source_patcher(&self) -> &'a dyn SourcePatcher {
        self.source_patcher
    }

    pub fn report(&mut self) -> &mut Report {
        &mut self.report
    }

    pub fn into_report(self) -> Report {
        self.report
    }
}

/// A command that asks questions, builds a model and generates files.
pub trait GeneratorCommand {
    type Model: Model + Clone;

    /// Fails fast, before any question is asked.
    fn check_preconditions(&mut self, _ctx: &Context) -> Result<()> {
        Ok(())
    }

    /// The questions to ask, in order.
    fn questions(&self, ctx: &Context, interactive: bool) -> Result<Vec<Question>>;

    fn build_model(&self, answers: &Answers, ctx: &Context) -> Result<Self::Model>;

    /// Adds command-specific bindings on top of the model's own.
    fn before_generation(&self, _model: &Self::Model, _bindings: &mut Bindings) {}

    fn generate(
        &self,
        ctx: &mut Context,
        model: &Self::Model,
        bindings: &Bindings,
        generator: &mut Generator<'_>,
    ) -> Result<()>;
}

/// Runs `command` to completion and returns the report of changed files.
///
/// # Errors
/// * Whatever the command's preconditions, the question engine or the
///   generation step fail with. Files written before a failure stay on disk.
pub fn execute<C: GeneratorCommand>(
    command: &mut C,
    ctx: &mut Context,
    engine: &QuestionEngine<'_>,
    mut generator: Generator<'_>,
) -> Result<Report> {
    command.check_preconditions(ctx)?;

    let questions = command.questions(ctx, engine.is_interactive())?;
    let answers = engine.ask(&questions)?;
    debug!("Collected {} answers", answers.len());

    let model = command.build_model(&answers, ctx)?;
    ctx.register(model.clone());

    let mut bindings = model.bindings();
    if let Some(project) = ctx.model::<ProjectModel>() {
        bindings.merge_missing(project.bindings());
    }
    command.before_generation(&model, &mut bindings);

    command.generate(ctx, &model, &bindings, &mut generator)?;
    Ok(generator.into_report())
}

/// Returns the project model, failing when not run inside a project.
pub fn only_in_project(ctx: &Context) -> Result<&ProjectModel> {
    ctx.require::<ProjectModel>("Command should be started in project directory")
}

/// The layout of the project the command runs in.
pub fn project_layout(ctx: &Context) -> Result<ProjectLayout> {
    let project = only_in_project(ctx)?;
    Ok(ProjectLayout::new(ctx.working_dir(), project))
}

/// `"java.lang.String"` -> `("java.lang", "String")`
pub(crate) fn split_class_name(class_name: &str) -> (&str, &str) {
    class_name.rsplit_once('.').unwrap_or(("", class_name))
}

pub(crate) fn command_error(message: impl Into<String>) -> Error {
    Error::CommandError(message.into())
}
