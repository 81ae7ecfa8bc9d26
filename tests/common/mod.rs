#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use kiln::error::{Error, Result};
use kiln::project::ProjectModel;
use kiln::prompt::Prompter;

/// One scripted reply, consumed in order by [`ScriptedPrompter`].
#[derive(Debug, Clone)]
pub enum Reply {
    Text(&'static str),
    /// Accepts the offered default.
    Default,
    Confirm(bool),
    Select(usize),
    MultiSelect(Vec<usize>),
}

/// Prompter double answering from a script and recording what was asked.
#[derive(Default)]
pub struct ScriptedPrompter {
    replies: RefCell<VecDeque<Reply>>,
    pub prompts: RefCell<Vec<String>>,
    pub errors: RefCell<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn new(replies: Vec<Reply>) -> Self {
        Self { replies: RefCell::new(replies.into()), ..Default::default() }
    }

    fn next(&self, prompt: &str) -> Result<Reply> {
        self.prompts.borrow_mut().push(prompt.to_string());
        self.replies
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| Error::PromptError(format!("no scripted reply for '{prompt}'")))
    }

    pub fn remaining(&self) -> usize {
        self.replies.borrow().len()
    }
}

impl Prompter for ScriptedPrompter {
    fn text(&self, prompt: &str, default: Option<&str>) -> Result<String> {
        match self.next(prompt)? {
            Reply::Text(text) => Ok(text.to_string()),
            Reply::Default => Ok(default.unwrap_or_default().to_string()),
            other => Err(Error::PromptError(format!("expected text reply, got {other:?}"))),
        }
    }

    fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        match self.next(prompt)? {
            Reply::Confirm(value) => Ok(value),
            Reply::Default => Ok(default),
            other => Err(Error::PromptError(format!("expected confirmation, got {other:?}"))),
        }
    }

    fn select(&self, prompt: &str, _options: &[String], default: usize) -> Result<usize> {
        match self.next(prompt)? {
            Reply::Select(index) => Ok(index),
            Reply::Default => Ok(default),
            other => Err(Error::PromptError(format!("expected selection, got {other:?}"))),
        }
    }

    fn multi_select(&self, prompt: &str, _options: &[String], defaults: &[bool]) -> Result<Vec<usize>> {
        match self.next(prompt)? {
            Reply::MultiSelect(indices) => Ok(indices),
            Reply::Default => {
                Ok(defaults.iter().enumerate().filter(|(_, on)| **on).map(|(i, _)| i).collect())
            }
            other => Err(Error::PromptError(format!("expected multi selection, got {other:?}"))),
        }
    }

    fn error(&self, message: &str) {
        self.errors.borrow_mut().push(message.to_string());
    }
}

pub fn preloaded(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

pub fn templates_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("templates")
}

pub fn sample_project() -> ProjectModel {
    ProjectModel {
        project_name: "sales".to_string(),
        namespace: "sales".to_string(),
        root_package: "com.company.sales".to_string(),
        platform_version: "7.2.1".to_string(),
        repo: "https://dl.bintray.com/cuba-platform/main".to_string(),
        database: "hsql".to_string(),
    }
}

pub fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

pub fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| panic!("{}: {e}", path.display()))
}
