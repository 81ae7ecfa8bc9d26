//! Command-line interface implementation for kiln.
//! Provides argument parsing and help text formatting using clap.

use crate::error::{Error, Result};
use clap::{error::ErrorKind, CommandFactory, Parser, Subcommand};
use indexmap::IndexMap;
use std::path::PathBuf;

/// Command-line arguments structure for kiln.
#[derive(Parser, Debug)]
#[command(author, version, about = "kiln: question-driven scaffolding and project patching tool", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Never prompt: take answers from --answer flags and defaults.
    /// Fails when a required answer is missing or invalid.
    #[arg(short, long, global = true)]
    pub non_interactive: bool,

    /// Preloaded answer in KEY=VALUE form, may be repeated
    #[arg(short, long = "answer", value_name = "KEY=VALUE", global = true)]
    pub answers: Vec<String>,

    /// Directory holding the templates
    ///
    /// Defaults to the `templates` directory of the source tree kiln was
    /// built from. Installed binaries need KILN_TEMPLATES or this flag.
    #[arg(
        long,
        env = "KILN_TEMPLATES",
        value_name = "DIR",
        default_value = concat!(env!("CARGO_MANIFEST_DIR"), "/templates"),
        global = true
    )]
    pub templates: PathBuf,

    /// Project directory, defaults to the current directory
    #[arg(short = 'C', long, value_name = "DIR", global = true)]
    pub project_dir: Option<PathBuf>,

    /// Endpoint returning a JSON list of platform versions offered by `init`.
    /// Without it only a custom version can be entered
    #[arg(long, env = "KILN_VERSIONS_URL", value_name = "URL", global = true)]
    pub versions_url: Option<String>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Create a new project
    Init,
    /// Create a new entity
    Entity,
    /// Create a new screen
    Screen,
    /// Create a new entity listener
    Listener,
}

/// Parses command line arguments and returns the Args structure.
///
/// # Exits
/// * With status code 1 if the subcommand is missing
/// * With clap's default error handling for other argument errors
pub fn get_args() -> Args {
    match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            if matches!(
                e.kind(),
                ErrorKind::MissingSubcommand
                    | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                    | ErrorKind::MissingRequiredArgument
            ) {
                let _ = Args::command()
                    .help_template(
                        r#"{about-section}
{usage-heading} {usage}

{all-args}
{after-help}
"#,
                    )
                    .print_help();
                std::process::exit(1);
            } else {
                e.exit();
            }
        }
    }
}

/// Splits `KEY=VALUE` pairs into preloaded answers. Later pairs win.
///
/// # Errors
/// * `Error::ConfigError` if a pair has no `=` or an empty key
pub fn parse_answers(pairs: &[String]) -> Result<IndexMap<String, String>> {
    pairs
        .iter()
        .map(|pair| match pair.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => {
                Ok((key.trim().to_string(), value.to_string()))
            }
            _ => Err(Error::ConfigError(format!("answer '{pair}' should look like KEY=VALUE"))),
        })
        .collect()
}
