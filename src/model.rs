//! Domain models built from answers, the template bindings derived from
//! them, and the per-invocation context that keeps both.

use crate::error::{Error, Result};
use indexmap::IndexMap;
use std::any::Any;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// An immutable domain model produced once per command.
pub trait Model: Any {
    /// Name under which the model is registered in the [`Context`].
    const NAME: &'static str;

    /// Template variables describing the model.
    fn bindings(&self) -> Bindings;
}

/// Variables available to templates, in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bindings {
    values: IndexMap<String, serde_json::Value>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<serde_json::Value>,
    {
        self.values.insert(key.into(), value.into());
    }

    /// Builder-style [`Bindings::insert`].
    pub fn with<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<serde_json::Value>,
    {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.values.get(key)
    }

    /// Adds the entries of `other` that are not bound yet.
    pub fn merge_missing(&mut self, other: Bindings) {
        for (key, value) in other.values {
            self.values.entry(key).or_insert(value);
        }
    }

    /// JSON object used as the render context.
    pub fn to_context(&self) -> serde_json::Value {
        serde_json::Value::Object(self.values.clone().into_iter().collect())
    }
}

/// State of one command invocation: the built models and the working
/// directory every relative path is resolved against.
pub struct Context {
    working_dir: PathBuf,
    models: HashMap<&'static str, Box<dyn Any>>,
}

impl Context {
    pub fn new<P: Into<PathBuf>>(working_dir: P) -> Self {
        Self { working_dir: working_dir.into(), models: HashMap::new() }
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Moves the working directory, e.g. into a freshly created project.
    pub fn set_working_dir<P: Into<PathBuf>>(&mut self, working_dir: P) {
        self.working_dir = working_dir.into();
    }

    /// Registers `model`, replacing an earlier model of the same name.
    pub fn register<M: Model>(&mut self, model: M) {
        self.models.insert(M::NAME, Box::new(model));
    }

    pub fn has_model(&self, name: &str) -> bool {
        self.models.contains_key(name)
    }

    pub fn model<M: Model>(&self) -> Option<&M> {
        self.models.get(M::NAME).and_then(|model| model.downcast_ref::<M>())
    }

    /// Returns the registered model or fails with `message`.
    pub fn require<M: Model>(&self, message: &str) -> Result<&M> {
        self.model::<M>().ok_or_else(|| Error::CommandError(message.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Sample {
        name: String,
    }

    impl Model for Sample {
        const NAME: &'static str = "sample";

        fn bindings(&self) -> Bindings {
            Bindings::new().with("name", self.name.clone())
        }
    }

    #[test]
    fn test_registry_round_trip() {
        let mut context = Context::new("/tmp");
        assert!(!context.has_model("sample"));
        assert!(context.require::<Sample>("No sample").is_err());

        context.register(Sample { name: "one".to_string() });
        context.register(Sample { name: "two".to_string() });

        assert!(context.has_model("sample"));
        assert_eq!(context.model::<Sample>().unwrap().name, "two");
    }

    #[test]
    fn test_bindings_merge_missing() {
        let mut bindings = Bindings::new().with("name", "Invoice");
        bindings.merge_missing(Bindings::new().with("name", "Other").with("namespace", "sales"));

        assert_eq!(
            bindings.to_context(),
            serde_json::json!({"name": "Invoice", "namespace": "sales"})
        );
    }
}
