//! Error handling for the kiln application.
//! Defines the error type shared by the question engine, the template
//! renderer, the structural patchers and the commands built on top of them.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Custom error types for kiln operations.
///
/// Every core operation fails fast with one of these variants and the error
/// is propagated unchanged up to `main`, which decides how to present it.
#[derive(Error, Debug)]
pub enum Error {
    /// Represents errors that occur during file system operations
    #[error("IO error: {0}.")]
    IoError(#[from] io::Error),

    /// A user-correctable answer failed one of the question validators.
    #[error("Invalid value for '{key}': {message}.")]
    ValidationError { key: String, message: String },

    /// A model builder required an answer that was never recorded.
    #[error("Answer '{key}' is missing.")]
    MissingKeyError { key: String },

    /// A model builder read an answer as a kind it was not recorded as.
    #[error("Answer '{key}' is {found}, expected {expected}.")]
    AnswerKindError { key: String, expected: &'static str, found: &'static str },

    /// A target file does not have the structure a patcher expects.
    #[error("Failed to parse '{}': {message}.", path.display())]
    ParseError { path: PathBuf, message: String },

    /// The source patcher could not find where to put an annotation.
    #[error("No class declaration found in '{}'.", path.display())]
    NoClassDeclarationError { path: PathBuf },

    /// A render target already exists and overwriting was not requested.
    #[error("File '{}' already exists.", path.display())]
    FileExistsError { path: PathBuf },

    /// Represents errors that occur during template processing
    #[error("Template error: {0}.")]
    TemplateError(String),

    /// Represents errors raised by the template engine
    #[error("Template engine error: {0}.")]
    MinijinjaError(#[from] minijinja::Error),

    /// Represents errors that occur during user interaction
    #[error("Prompt error: {0}.")]
    PromptError(String),

    /// Represents errors that occur during configuration parsing or processing
    #[error("Configuration error: {0}.")]
    ConfigError(String),

    /// Represents failures while fetching remote resources
    #[error("Remote resource error: {0}.")]
    RemoteError(String),

    /// A command refused to continue, the message is shown to the user.
    #[error("{0}")]
    CommandError(String),

    /// The user stopped the command; nothing is reported.
    #[error("Aborted")]
    Aborted,
}

/// Convenience type alias for Results with kiln's Error as the error type.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Shorthand for a validation failure on `key`.
    pub fn validation(key: impl Into<String>, message: impl Into<String>) -> Self {
        Error::ValidationError { key: key.into(), message: message.into() }
    }

    /// Whether the error should terminate the command without a message.
    pub fn is_silent(&self) -> bool {
        matches!(self, Error::Aborted)
    }
}

impl From<dialoguer::Error> for Error {
    fn from(err: dialoguer::Error) -> Self {
        match err {
            dialoguer::Error::IO(e) if e.kind() == io::ErrorKind::Interrupted => Error::Aborted,
            e => Error::PromptError(e.to_string()),
        }
    }
}

/// Default error handler that prints the error and exits the program.
///
/// Silent errors (user cancellation) exit without printing anything.
pub fn default_error_handler(err: Error) {
    if !err.is_silent() {
        eprintln!("{err}");
    }
    std::process::exit(1);
}
