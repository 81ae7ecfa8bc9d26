//! Declarative question specifications.
//!
//! Questions are built with small builder methods and evaluated in order by
//! the [`QuestionEngine`](crate::engine::QuestionEngine).

use crate::answers::{Answer, Answers};

/// Validates a single answer, possibly against earlier answers.
pub type Validator = Box<dyn Fn(&Answer, &Answers) -> std::result::Result<(), String>>;

/// Validates the combined answers of a question group.
pub type GroupValidator = Box<dyn Fn(&Answers) -> std::result::Result<(), String>>;

/// Decides whether a question is asked at all.
pub type Condition = Box<dyn Fn(&Answers) -> bool>;

/// Default value of a question.
pub enum DefaultValue {
    None,
    Value(Answer),
    /// Rendered by the template engine against the answers so far.
    Template(String),
    Computed(Box<dyn Fn(&Answers) -> Option<Answer>>),
}

/// The kind of a question and its kind-specific data.
pub enum QuestionKind {
    Text,
    Confirm,
    Select { options: Vec<String>, store_index: bool },
    MultiSelect { options: Vec<String> },
    Group { questions: Vec<Question>, validators: Vec<GroupValidator> },
}

impl QuestionKind {
    pub fn name(&self) -> &'static str {
        match self {
            QuestionKind::Text => "text",
            QuestionKind::Confirm => "confirmation",
            QuestionKind::Select { .. } => "single-choice",
            QuestionKind::MultiSelect { .. } => "multi-choice",
            QuestionKind::Group { .. } => "sub-list",
        }
    }
}

pub struct Question {
    pub key: String,
    pub prompt: String,
    pub kind: QuestionKind,
    pub default: DefaultValue,
    pub validators: Vec<Validator>,
    pub condition: Option<Condition>,
}

impl Question {
    fn new(key: impl Into<String>, prompt: impl Into<String>, kind: QuestionKind) -> Self {
        Self {
            key: key.into(),
            prompt: prompt.into(),
            kind,
            default: DefaultValue::None,
            validators: Vec::new(),
            condition: None,
        }
    }

    /// Free-text question.
    pub fn text(key: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self::new(key, prompt, QuestionKind::Text)
    }

    /// Yes/no question.
    pub fn confirm(key: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self::new(key, prompt, QuestionKind::Confirm)
    }

    /// Single-choice question storing the selected option's value.
    pub fn select<S: Into<String>>(
        key: impl Into<String>,
        prompt: impl Into<String>,
        options: impl IntoIterator<Item = S>,
    ) -> Self {
        let options = options.into_iter().map(Into::into).collect();
        Self::new(key, prompt, QuestionKind::Select { options, store_index: false })
    }

    /// Multi-choice question storing the list of selected options.
    pub fn multi_select<S: Into<String>>(
        key: impl Into<String>,
        prompt: impl Into<String>,
        options: impl IntoIterator<Item = S>,
    ) -> Self {
        let options = options.into_iter().map(Into::into).collect();
        Self::new(key, prompt, QuestionKind::MultiSelect { options })
    }

    /// Group of questions answered as a unit and validated together.
    pub fn group(key: impl Into<String>, questions: Vec<Question>) -> Self {
        Self::new(key, "", QuestionKind::Group { questions, validators: Vec::new() })
    }

    /// Stores the index of the selected option instead of its value.
    pub fn store_index(mut self) -> Self {
        if let QuestionKind::Select { store_index, .. } = &mut self.kind {
            *store_index = true;
        }
        self
    }

    pub fn default(mut self, value: impl Into<Answer>) -> Self {
        self.default = DefaultValue::Value(value.into());
        self
    }

    /// Preselects the option at `index` of a choice question.
    pub fn default_index(mut self, index: usize) -> Self {
        self.default = DefaultValue::Value(Answer::Index(index));
        self
    }

    pub fn default_template(mut self, template: impl Into<String>) -> Self {
        self.default = DefaultValue::Template(template.into());
        self
    }

    pub fn default_with<F>(mut self, f: F) -> Self
    where
        F: Fn(&Answers) -> Option<Answer> + 'static,
    {
        self.default = DefaultValue::Computed(Box::new(f));
        self
    }

    pub fn validate<F>(mut self, f: F) -> Self
    where
        F: Fn(&Answer, &Answers) -> std::result::Result<(), String> + 'static,
    {
        self.validators.push(Box::new(f));
        self
    }

    /// Adds a validator over the combined answers of a group question.
    pub fn validate_group<F>(mut self, f: F) -> Self
    where
        F: Fn(&Answers) -> std::result::Result<(), String> + 'static,
    {
        if let QuestionKind::Group { validators, .. } = &mut self.kind {
            validators.push(Box::new(f));
        }
        self
    }

    /// Only asks the question when `f` holds for the answers so far.
    pub fn ask_if<F>(mut self, f: F) -> Self
    where
        F: Fn(&Answers) -> bool + 'static,
    {
        self.condition = Some(Box::new(f));
        self
    }

    pub fn is_active(&self, answers: &Answers) -> bool {
        self.condition.as_ref().is_none_or(|condition| condition(answers))
    }

    /// Runs the validators in declared order, stopping at the first failure.
    pub fn check(&self, value: &Answer, answers: &Answers) -> std::result::Result<(), String> {
        self.validators.iter().try_for_each(|validator| validator(value, answers))
    }

    /// Converts a non-interactive string answer to this question's kind.
    pub fn parse(&self, raw: &str) -> std::result::Result<Answer, String> {
        match &self.kind {
            QuestionKind::Text => Ok(Answer::Text(raw.to_string())),
            QuestionKind::Confirm => parse_yes_no(raw)
                .map(Answer::Bool)
                .ok_or_else(|| format!("expected yes or no, got '{raw}'")),
            QuestionKind::Select { options, store_index } => {
                match options.iter().position(|option| option == raw) {
                    Some(index) if *store_index => Ok(Answer::Index(index)),
                    Some(_) => Ok(Answer::Choice(raw.to_string())),
                    None => Err(format!("should be one of {}", options.join(", "))),
                }
            }
            QuestionKind::MultiSelect { options } => {
                let items: Vec<String> = raw
                    .split(',')
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(str::to_string)
                    .collect();
                match items.iter().find(|item| !options.contains(item)) {
                    Some(unknown) => {
                        Err(format!("'{unknown}' should be one of {}", options.join(", ")))
                    }
                    None => Ok(Answer::List(items)),
                }
            }
            QuestionKind::Group { .. } => Err("a question group takes no value".to_string()),
        }
    }
}

/// Parses yes/no style input, returning `None` for anything else.
pub fn parse_yes_no(input: &str) -> Option<bool> {
    match input.trim().to_lowercase().as_str() {
        "y" | "yes" | "true" => Some(true),
        "n" | "no" | "false" => Some(false),
        _ => None,
    }
}
