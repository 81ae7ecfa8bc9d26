//! kiln's main application entry point and orchestration logic.
//! Handles command-line argument parsing, builds the components a command
//! needs and prints the resulting report.

use std::path::PathBuf;

use kiln::{
    cli::{get_args, parse_answers, Args, Command},
    commands::{
        execute, EntityCommand, Generator, GeneratorCommand, InitCommand, ListenerCommand, Report,
        ScreenCommand,
    },
    engine::{AskMode, QuestionEngine},
    error::{default_error_handler, Result},
    loader::LocalLoader,
    logger::init_logger,
    model::Context,
    patch::RegexSourcePatcher,
    project::ProjectModel,
    prompt::DialoguerPrompter,
    renderer::MiniJinjaRenderer,
    versions,
};

/// Main application entry point.
fn main() {
    let args = get_args();
    init_logger(args.verbose);

    if let Err(err) = run(args) {
        default_error_handler(err);
    }
}

fn working_dir(args: &Args) -> Result<PathBuf> {
    match &args.project_dir {
        Some(dir) => Ok(dir.clone()),
        None => Ok(std::env::current_dir()?),
    }
}

fn print_report(report: &Report) {
    for change in &report.changes {
        println!("{}: '{}'", change.action, change.path.display());
    }
    for tip in &report.tips {
        println!("{tip}");
    }
}

/// Main application logic execution.
///
/// # Flow
/// 1. Starts loading platform versions when initialising a project
/// 2. Registers the project found in the working directory, if any
/// 3. Runs the command: questions, model, templates, patches
/// 4. Prints created and altered files
fn run(args: Args) -> Result<()> {
    // Started before anything else so the fetch overlaps with start-up.
    let versions_loader = match args.command {
        Command::Init => versions::spawn_loader(args.versions_url.as_deref())?,
        _ => None,
    };

    let renderer = MiniJinjaRenderer::new();
    let prompt = DialoguerPrompter::new();
    let loader = LocalLoader::new(args.templates.clone());
    let source_patcher = RegexSourcePatcher::new();

    let mut ctx = Context::new(working_dir(&args)?);
    if let Some(project) = ProjectModel::load(ctx.working_dir())? {
        log::debug!("Found project '{}'", project.project_name);
        ctx.register(project);
    }

    let mode = if args.non_interactive { AskMode::NonInteractive } else { AskMode::Interactive };
    let engine = QuestionEngine::new(&prompt, &renderer, mode, parse_answers(&args.answers)?);
    let generator = Generator::new(&renderer, &loader, &source_patcher);

    let report = match args.command {
        Command::Init => dispatch(InitCommand::new(versions_loader), &mut ctx, &engine, generator)?,
        Command::Entity => dispatch(EntityCommand, &mut ctx, &engine, generator)?,
        Command::Screen => dispatch(ScreenCommand, &mut ctx, &engine, generator)?,
        Command::Listener => dispatch(ListenerCommand::new(), &mut ctx, &engine, generator)?,
    };

    print_report(&report);
    Ok(())
}

fn dispatch<C: GeneratorCommand>(
    mut command: C,
    ctx: &mut Context,
    engine: &QuestionEngine<'_>,
    generator: Generator<'_>,
) -> Result<Report> {
    execute(&mut command, ctx, engine, generator)
}
