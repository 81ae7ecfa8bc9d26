//! `kiln listener`: creates an entity listener and attaches it to its entity.

use super::{command_error, only_in_project, project_layout, split_class_name, GeneratorCommand, Generator};
use crate::answers::{Answer, Answers};
use crate::error::Result;
use crate::files::ensure_file_absence;
use crate::model::{Bindings, Context, Model};
use crate::patch::xml;
use crate::processor::RenderMode;
use crate::project::{package_to_dir, Module, ProjectLayout};
use crate::question::Question;
use crate::validators;
use cruet::Inflector;
use log::debug;

const LISTENER_TEMPLATE: &str = "listener";
const LISTENERS_IMPORT: &str = "import com.haulmont.cuba.core.entity.annotation.Listeners;";
const LISTENERS_ANNOTATION: &str = "Listeners";

/// Listener interfaces, in the order they are offered.
pub const INTERFACES: [&str; 8] = [
    "beforeInsert",
    "beforeUpdate",
    "beforeDelete",
    "afterInsert",
    "afterUpdate",
    "afterDelete",
    "beforeAttach",
    "beforeDetach",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerModel {
    pub class_name: String,
    pub package_name: String,
    pub bean_name: String,
    /// Fully qualified entity class.
    pub entity_class: String,
    /// Selected interfaces, a subset of [`INTERFACES`].
    pub interfaces: Vec<&'static str>,
}

impl ListenerModel {
    pub fn entity_name(&self) -> &str {
        split_class_name(&self.entity_class).1
    }

    pub fn entity_package(&self) -> &str {
        split_class_name(&self.entity_class).0
    }

    pub fn implements(&self, interface: &str) -> bool {
        self.interfaces.iter().any(|implemented| *implemented == interface)
    }
}

impl Model for ListenerModel {
    const NAME: &'static str = "listener";

    fn bindings(&self) -> Bindings {
        let mut bindings = Bindings::new()
            .with("className", self.class_name.as_str())
            .with("packageName", self.package_name.as_str())
            .with("packageDir", package_to_dir(&self.package_name))
            .with("beanName", self.bean_name.as_str())
            .with("entityClass", self.entity_class.as_str())
            .with("entityName", self.entity_name())
            .with("entityPackage", self.entity_package());
        for interface in INTERFACES {
            bindings.insert(interface, self.implements(interface));
        }
        let implemented: Vec<String> = self
            .interfaces
            .iter()
            .map(|interface| format!("{}EntityListener", interface.to_pascal_case()))
            .collect();
        bindings.insert("listenerInterfaces", implemented);
        bindings
    }
}

#[derive(Debug, Default)]
pub struct ListenerCommand {
    entities: Vec<String>,
}

impl ListenerCommand {
    pub fn new() -> Self {
        Self::default()
    }

    fn load_entities(layout: &ProjectLayout) -> Result<Vec<String>> {
        let persistence_xml = layout.persistence_xml();
        if !persistence_xml.exists() {
            return Ok(Vec::new());
        }
        xml::child_texts(persistence_xml, &["persistence-unit"], "class")
    }
}

impl GeneratorCommand for ListenerCommand {
    type Model = ListenerModel;

    fn check_preconditions(&mut self, ctx: &Context) -> Result<()> {
        let layout = project_layout(ctx)?;
        self.entities = Self::load_entities(&layout)?;
        debug!("Found {} entities", self.entities.len());

        if self.entities.is_empty() {
            return Err(command_error("Project does not have any entities."));
        }
        Ok(())
    }

    fn questions(&self, ctx: &Context, _interactive: bool) -> Result<Vec<Question>> {
        let project = only_in_project(ctx)?;
        let namespace = project.namespace.clone();

        let confirmations = INTERFACES
            .iter()
            .map(|interface| {
                Question::confirm(
                    *interface,
                    format!("Implement {}EntityListener?", interface.to_pascal_case()),
                )
                .default(true)
            })
            .collect();

        Ok(vec![
            Question::text("name", "Listener name").validate(validators::is_class()),
            Question::select("entityType", "Select entity", self.entities.clone()),
            Question::text("packageName", "Listener package")
                .default(format!("{}.listener", project.root_package))
                .validate(validators::is_package()),
            Question::text("beanName", "Bean name")
                .default_with(move |answers| {
                    answers.str("name").map(|name| Answer::Text(format!("{namespace}_{name}")))
                })
                .validate(validators::not_blank("Bean name is required")),
            Question::group("interfaces", confirmations).validate_group(|answers| {
                if INTERFACES.iter().any(|interface| answers.flag(interface).unwrap_or(false)) {
                    Ok(())
                } else {
                    Err("Listener must implement at least one of the interfaces".to_string())
                }
            }),
        ])
    }

    fn build_model(&self, answers: &Answers, _ctx: &Context) -> Result<ListenerModel> {
        let mut interfaces = Vec::new();
        for interface in INTERFACES {
            if answers.flag(interface)? {
                interfaces.push(interface);
            }
        }

        Ok(ListenerModel {
            class_name: answers.text("name")?.to_string(),
            package_name: answers.text("packageName")?.to_string(),
            bean_name: answers.text("beanName")?.to_string(),
            entity_class: answers.text("entityType")?.to_string(),
            interfaces,
        })
    }

    fn generate(
        &self,
        ctx: &mut Context,
        model: &ListenerModel,
        bindings: &Bindings,
        generator: &mut Generator<'_>,
    ) -> Result<()> {
        let layout = project_layout(ctx)?;
        let listener_class = format!("{}.{}", model.package_name, model.class_name);
        ensure_file_absence(
            layout.class_source(Module::Core, &listener_class),
            format!("Listener {listener_class} already exists"),
        )?;

        let entity_source = layout.class_source(Module::Global, &model.entity_class);
        if !entity_source.exists() {
            return Err(command_error(format!(
                "Source of entity {} not found at '{}'",
                model.entity_class,
                entity_source.display()
            )));
        }

        generator.render(LISTENER_TEMPLATE, layout.root(), bindings, RenderMode::WholeTree)?;

        generator.source_patcher().patch_annotation_listing(
            &entity_source,
            LISTENERS_IMPORT,
            LISTENERS_ANNOTATION,
            &model.bean_name,
        )?;
        generator.report().altered(entity_source);

        Ok(())
    }
}
