//! The answer store: validated answers keyed by question key, kept in the
//! order the questions were evaluated.

use crate::error::{Error, Result};
use indexmap::IndexMap;
use serde::Serialize;

/// A single recorded answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Answer {
    /// Free text input.
    Text(String),
    /// Yes/no confirmation.
    Bool(bool),
    /// The literal value of the selected option.
    Choice(String),
    /// The position of the selected option, when the question asks for it.
    Index(usize),
    /// Selected options of a multi-choice question.
    List(Vec<String>),
}

impl Answer {
    /// Human readable name of the value kind, used in contract errors.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Answer::Text(_) => "text",
            Answer::Bool(_) => "boolean",
            Answer::Choice(_) => "choice",
            Answer::Index(_) => "index",
            Answer::List(_) => "list",
        }
    }

    /// Returns the string form of textual answers (text or selected option).
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Answer::Text(s) | Answer::Choice(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Answer::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<&str> for Answer {
    fn from(value: &str) -> Self {
        Answer::Text(value.to_string())
    }
}

impl From<String> for Answer {
    fn from(value: String) -> Self {
        Answer::Text(value)
    }
}

impl From<bool> for Answer {
    fn from(value: bool) -> Self {
        Answer::Bool(value)
    }
}

/// Ordered mapping from question key to answer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Answers {
    values: IndexMap<String, Answer>,
}

impl Answers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the answer for `key`.
    ///
    /// Keys are unique within a question list, so a key is only ever written
    /// once per invocation.
    pub fn insert<K: Into<String>>(&mut self, key: K, value: Answer) {
        self.values.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Answer> {
        self.values.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Answer)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns the string form of the answer if it is textual, `None` when the
    /// key is absent or not textual.
    pub fn str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Answer::as_str)
    }

    /// Removes and returns every answer recorded after the first `len` ones.
    pub fn split_off(&mut self, len: usize) -> Answers {
        Answers { values: self.values.split_off(len) }
    }

    /// Appends all answers of `other`, keeping their order.
    pub fn extend(&mut self, other: Answers) {
        self.values.extend(other.values);
    }

    /// Reads a required text or choice answer.
    pub fn text(&self, key: &str) -> Result<&str> {
        match self.require(key)? {
            Answer::Text(s) | Answer::Choice(s) => Ok(s),
            other => Err(kind_error(key, "text", other)),
        }
    }

    /// Reads a required confirmation answer.
    pub fn flag(&self, key: &str) -> Result<bool> {
        match self.require(key)? {
            Answer::Bool(b) => Ok(*b),
            other => Err(kind_error(key, "boolean", other)),
        }
    }

    /// Reads a required single-choice answer stored as an index.
    pub fn index(&self, key: &str) -> Result<usize> {
        match self.require(key)? {
            Answer::Index(i) => Ok(*i),
            other => Err(kind_error(key, "index", other)),
        }
    }

    /// Reads a required multi-choice answer.
    pub fn list(&self, key: &str) -> Result<&[String]> {
        match self.require(key)? {
            Answer::List(items) => Ok(items),
            other => Err(kind_error(key, "list", other)),
        }
    }

    /// Reads an optional text answer; absent keys are `None`, a present key
    /// of another kind is still a contract violation.
    pub fn optional_text(&self, key: &str) -> Result<Option<&str>> {
        if self.contains(key) {
            self.text(key).map(Some)
        } else {
            Ok(None)
        }
    }

    /// JSON object view used as template and prompt context.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.values).unwrap_or(serde_json::Value::Null)
    }

    fn require(&self, key: &str) -> Result<&Answer> {
        self.get(key).ok_or_else(|| Error::MissingKeyError { key: key.to_string() })
    }
}

fn kind_error(key: &str, expected: &'static str, found: &Answer) -> Error {
    Error::AnswerKindError { key: key.to_string(), expected, found: found.kind_name() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_by_kind() {
        let mut answers = Answers::new();
        answers.insert("name", Answer::Text("Invoice".to_string()));
        answers.insert("persistent", Answer::Bool(true));
        answers.insert("module", Answer::Choice("web".to_string()));

        assert_eq!(answers.text("name").unwrap(), "Invoice");
        assert_eq!(answers.text("module").unwrap(), "web");
        assert!(answers.flag("persistent").unwrap());
        assert_eq!(answers.keys().collect::<Vec<_>>(), vec!["name", "persistent", "module"]);
    }

    #[test]
    fn test_missing_and_mismatched_keys() {
        let mut answers = Answers::new();
        answers.insert("persistent", Answer::Bool(true));

        assert!(matches!(answers.text("name"), Err(Error::MissingKeyError { key }) if key == "name"));
        assert!(matches!(
            answers.text("persistent"),
            Err(Error::AnswerKindError { expected: "text", found: "boolean", .. })
        ));
        assert_eq!(answers.optional_text("name").unwrap(), None);
    }

    #[test]
    fn test_to_json() {
        let mut answers = Answers::new();
        answers.insert("name", Answer::Text("Invoice".to_string()));
        answers.insert("index", Answer::Index(2));
        answers.insert("tags", Answer::List(vec!["a".to_string()]));

        assert_eq!(
            answers.to_json(),
            serde_json::json!({"name": "Invoice", "index": 2, "tags": ["a"]})
        );
    }
}
