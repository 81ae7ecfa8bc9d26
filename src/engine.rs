//! The question engine: evaluates question specifications in order and
//! collects validated answers.

use crate::answers::{Answer, Answers};
use crate::error::{Error, Result};
use crate::prompt::Prompter;
use crate::question::{DefaultValue, GroupValidator, Question, QuestionKind};
use crate::renderer::TemplateRenderer;
use indexmap::IndexMap;
use log::debug;
use std::collections::HashSet;

/// How missing answers are obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AskMode {
    /// Prompt the user and re-prompt on validation failures.
    Interactive,
    /// Never prompt: use supplied answers or defaults, fail otherwise.
    NonInteractive,
}

pub struct QuestionEngine<'a> {
    prompt: &'a dyn Prompter,
    renderer: &'a dyn TemplateRenderer,
    mode: AskMode,
    preloaded: IndexMap<String, String>,
}

impl<'a> QuestionEngine<'a> {
    pub fn new(
        prompt: &'a dyn Prompter,
        renderer: &'a dyn TemplateRenderer,
        mode: AskMode,
        preloaded: IndexMap<String, String>,
    ) -> Self {
        Self { prompt, renderer, mode, preloaded }
    }

    pub fn mode(&self) -> AskMode {
        self.mode
    }

    pub fn is_interactive(&self) -> bool {
        self.mode == AskMode::Interactive
    }

    /// Asks all `questions` in order and returns the completed answer store.
    ///
    /// # Errors
    /// * `Error::ConfigError` if a key is declared twice
    /// * `Error::ValidationError` if a supplied or non-interactive answer is invalid
    /// * `Error::MinijinjaError` if a prompt or a template default does not render
    /// * `Error::PromptError` / `Error::Aborted` from the prompter
    pub fn ask(&self, questions: &[Question]) -> Result<Answers> {
        check_unique_keys(questions)?;

        let mut answers = Answers::new();
        self.ask_into(questions, &mut answers, true)?;
        Ok(answers)
    }

    fn ask_into(
        &self,
        questions: &[Question],
        answers: &mut Answers,
        use_preloaded: bool,
    ) -> Result<()> {
        for question in questions {
            if !question.is_active(answers) {
                debug!("Skipping question '{}'", question.key);
                continue;
            }

            match &question.kind {
                QuestionKind::Group { questions: nested, validators } => {
                    let group_answers = self.ask_group(nested, answers, use_preloaded)?;
                    match check_group(validators, &group_answers) {
                        Ok(()) => answers.extend(group_answers),
                        Err(message) if self.is_interactive() => {
                            self.prompt.error(&message);
                            // Supplied answers are what failed, so ask for real input.
                            self.reask_group(nested, validators, answers)?;
                        }
                        Err(message) => return Err(Error::validation(&question.key, message)),
                    }
                }
                _ => {
                    let value = self.ask_one(question, answers, use_preloaded)?;
                    debug!("Answer '{}' = {:?}", question.key, value);
                    answers.insert(question.key.clone(), value);
                }
            }
        }

        Ok(())
    }

    /// Answers `nested` on top of `answers` and returns only the new answers.
    fn ask_group(
        &self,
        nested: &[Question],
        answers: &Answers,
        use_preloaded: bool,
    ) -> Result<Answers> {
        let mut scratch = answers.clone();
        self.ask_into(nested, &mut scratch, use_preloaded)?;
        Ok(scratch.split_off(answers.len()))
    }

    fn reask_group(
        &self,
        nested: &[Question],
        validators: &[GroupValidator],
        answers: &mut Answers,
    ) -> Result<()> {
        loop {
            let group_answers = self.ask_group(nested, answers, false)?;
            match check_group(validators, &group_answers) {
                Ok(()) => {
                    answers.extend(group_answers);
                    return Ok(());
                }
                Err(message) => self.prompt.error(&message),
            }
        }
    }

    fn ask_one(&self, question: &Question, answers: &Answers, use_preloaded: bool) -> Result<Answer> {
        let key = &question.key;

        if let Some(raw) = self.preloaded.get(key).filter(|_| use_preloaded) {
            let value = question.parse(raw).map_err(|message| Error::validation(key, message))?;
            question.check(&value, answers).map_err(|message| Error::validation(key, message))?;
            return Ok(value);
        }

        let default = self.default_value(question, answers)?;

        if self.mode == AskMode::NonInteractive {
            let value = default
                .or_else(|| implicit_default(&question.kind))
                .ok_or_else(|| Error::validation(key, "a value is required"))?;
            question.check(&value, answers).map_err(|message| Error::validation(key, message))?;
            return Ok(value);
        }

        // Prompt text may mention earlier answers.
        let context = answers.to_json();
        let prompt = self.renderer.render(&question.prompt, &context)?;

        loop {
            let value = self.prompt_for(question, &prompt, default.as_ref())?;
            match question.check(&value, answers) {
                Ok(()) => return Ok(value),
                Err(message) => self.prompt.error(&message),
            }
        }
    }

    /// # Errors
    /// * `Error::MinijinjaError` if a template default does not render
    fn default_value(&self, question: &Question, answers: &Answers) -> Result<Option<Answer>> {
        let value = match &question.default {
            DefaultValue::None => None,
            DefaultValue::Value(value) => Some(value.clone()),
            DefaultValue::Template(template) => {
                Some(Answer::Text(self.renderer.render(template, &answers.to_json())?))
            }
            DefaultValue::Computed(f) => f(answers),
        };
        let Some(value) = value else {
            return Ok(None);
        };

        // Choice questions accept an index or an option value as default.
        Ok(match &question.kind {
            QuestionKind::Select { options, store_index } => {
                option_index(options, &value).map(|index| {
                    if *store_index {
                        Answer::Index(index)
                    } else {
                        Answer::Choice(options[index].clone())
                    }
                })
            }
            _ => Some(value),
        })
    }

    fn prompt_for(&self, question: &Question, prompt: &str, default: Option<&Answer>) -> Result<Answer> {
        match &question.kind {
            QuestionKind::Text => {
                let default = default.and_then(Answer::as_str);
                self.prompt.text(prompt, default).map(Answer::Text)
            }
            QuestionKind::Confirm => {
                let default = default.and_then(Answer::as_bool).unwrap_or(false);
                self.prompt.confirm(prompt, default).map(Answer::Bool)
            }
            QuestionKind::Select { options, store_index } => {
                let default = default.and_then(|value| option_index(options, value)).unwrap_or(0);
                let index = self.prompt.select(prompt, options, default)?;
                let value = options.get(index).ok_or_else(|| {
                    Error::PromptError(format!("selection {index} is out of range"))
                })?;
                Ok(if *store_index { Answer::Index(index) } else { Answer::Choice(value.clone()) })
            }
            QuestionKind::MultiSelect { options } => {
                let defaults: Vec<bool> = match default {
                    Some(Answer::List(selected)) => {
                        options.iter().map(|option| selected.contains(option)).collect()
                    }
                    _ => vec![false; options.len()],
                };
                let indices = self.prompt.multi_select(prompt, options, &defaults)?;
                Ok(Answer::List(
                    indices.into_iter().filter_map(|i| options.get(i).cloned()).collect(),
                ))
            }
            QuestionKind::Group { .. } => {
                Err(Error::ConfigError(format!("group '{}' cannot be prompted", question.key)))
            }
        }
    }
}

/// Defaults used when a question declares none: no confirmation, first option.
fn implicit_default(kind: &QuestionKind) -> Option<Answer> {
    match kind {
        QuestionKind::Confirm => Some(Answer::Bool(false)),
        QuestionKind::Select { options, store_index } => options.first().map(|first| {
            if *store_index {
                Answer::Index(0)
            } else {
                Answer::Choice(first.clone())
            }
        }),
        QuestionKind::MultiSelect { .. } => Some(Answer::List(Vec::new())),
        _ => None,
    }
}

fn check_group(validators: &[GroupValidator], answers: &Answers) -> std::result::Result<(), String> {
    validators.iter().try_for_each(|validator| validator(answers))
}

fn option_index(options: &[String], value: &Answer) -> Option<usize> {
    match value {
        Answer::Index(index) if *index < options.len() => Some(*index),
        Answer::Text(s) | Answer::Choice(s) => options.iter().position(|option| option == s),
        _ => None,
    }
}

fn check_unique_keys(questions: &[Question]) -> Result<()> {
    fn collect<'q>(questions: &'q [Question], seen: &mut HashSet<&'q str>) -> Result<()> {
        for question in questions {
            if !seen.insert(question.key.as_str()) {
                return Err(Error::ConfigError(format!(
                    "question '{}' is declared more than once",
                    question.key
                )));
            }
            if let QuestionKind::Group { questions: nested, .. } = &question.kind {
                collect(nested, seen)?;
            }
        }
        Ok(())
    }

    collect(questions, &mut HashSet::new())
}
