//! User input and interaction handling.
//! The question engine talks to the terminal only through [`Prompter`], so it
//! can be driven by scripted input in tests.

use crate::error::Result;
use dialoguer::{Confirm, Input, MultiSelect, Select};

/// Terminal prompt primitives used by the question engine.
pub trait Prompter {
    /// Asks for free text, offering `default` when present.
    fn text(&self, prompt: &str, default: Option<&str>) -> Result<String>;

    /// Asks a yes/no question.
    fn confirm(&self, prompt: &str, default: bool) -> Result<bool>;

    /// Asks to pick one of `options`, returning its index.
    fn select(&self, prompt: &str, options: &[String], default: usize) -> Result<usize>;

    /// Asks to pick any number of `options`, returning their indices.
    fn multi_select(&self, prompt: &str, options: &[String], defaults: &[bool])
        -> Result<Vec<usize>>;

    /// Reports a validation failure before the question is asked again.
    fn error(&self, message: &str);
}

/// [`Prompter`] backed by dialoguer.
#[derive(Debug, Default)]
pub struct DialoguerPrompter;

impl DialoguerPrompter {
    pub fn new() -> Self {
        Self
    }
}

impl Prompter for DialoguerPrompter {
    fn text(&self, prompt: &str, default: Option<&str>) -> Result<String> {
        let mut input = Input::<String>::new().with_prompt(prompt).allow_empty(true);
        if let Some(default) = default {
            input = input.default(default.to_string());
        }
        Ok(input.interact_text()?)
    }

    fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        Ok(Confirm::new().with_prompt(prompt).default(default).interact()?)
    }

    fn select(&self, prompt: &str, options: &[String], default: usize) -> Result<usize> {
        Ok(Select::new().with_prompt(prompt).default(default).items(options).interact()?)
    }

    fn multi_select(
        &self,
        prompt: &str,
        options: &[String],
        defaults: &[bool],
    ) -> Result<Vec<usize>> {
        Ok(MultiSelect::new()
            .with_prompt(prompt)
            .items(options)
            .defaults(defaults)
            .interact()?)
    }

    fn error(&self, message: &str) {
        eprintln!("{message}");
    }
}
