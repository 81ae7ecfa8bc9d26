//! `kiln entity`: creates an entity class and registers it in the project.

use super::{only_in_project, project_layout, GeneratorCommand, Generator};
use crate::answers::Answers;
use crate::error::{Error, Result};
use crate::files::ensure_file_absence;
use crate::model::{Bindings, Context, Model};
use crate::patch::{properties, xml, XmlElement};
use crate::processor::RenderMode;
use crate::project::{package_to_dir, Module};
use crate::question::Question;
use crate::validators;
use cruet::Inflector;

const ENTITY_TEMPLATE: &str = "entity";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityType {
    Persistent,
    PersistentEmbedded,
    NotPersistent,
}

impl EntityType {
    pub const ALL: [EntityType; 3] =
        [EntityType::Persistent, EntityType::PersistentEmbedded, EntityType::NotPersistent];

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.label() == label)
    }

    pub fn label(self) -> &'static str {
        match self {
            EntityType::Persistent => "Persistent",
            EntityType::PersistentEmbedded => "Persistent embedded",
            EntityType::NotPersistent => "Not persistent",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityModel {
    pub name: String,
    pub package_name: String,
    pub entity_type: EntityType,
    pub table_name: String,
}

impl EntityModel {
    pub fn class_name(&self) -> String {
        format!("{}.{}", self.package_name, self.name)
    }
}

impl Model for EntityModel {
    const NAME: &'static str = "entity";

    fn bindings(&self) -> Bindings {
        Bindings::new()
            .with("entityName", self.name.as_str())
            .with("packageName", self.package_name.as_str())
            .with("packageDir", package_to_dir(&self.package_name))
            .with("entityType", self.entity_type.label())
            .with("tableName", self.table_name.as_str())
            .with("persistent", self.entity_type == EntityType::Persistent)
            .with("embedded", self.entity_type == EntityType::PersistentEmbedded)
    }
}

/// `InvoiceLine` -> `INVOICE_LINE`
pub fn entity_name_to_table_name(entity_name: &str) -> String {
    entity_name.to_snake_case().to_uppercase()
}

/// `InvoiceLine` -> `Invoice Line`
pub fn printable_name(entity_name: &str) -> String {
    entity_name.to_title_case()
}

#[derive(Debug, Default)]
pub struct EntityCommand;

impl GeneratorCommand for EntityCommand {
    type Model = EntityModel;

    fn check_preconditions(&mut self, ctx: &Context) -> Result<()> {
        only_in_project(ctx).map(|_| ())
    }

    fn questions(&self, ctx: &Context, _interactive: bool) -> Result<Vec<Question>> {
        let project = only_in_project(ctx)?;
        let types = EntityType::ALL.map(EntityType::label);

        Ok(vec![
            Question::text("entityName", "Entity Name")
                .validate(validators::matches(r"[A-Z][A-Za-z0-9_$]*", "Invalid entity name")),
            Question::text("packageName", "Package Name")
                .default(format!("{}.entity", project.root_package))
                .validate(validators::is_package()),
            Question::select("entityType", "Entity type", types).default_index(0),
        ])
    }

    fn build_model(&self, answers: &Answers, ctx: &Context) -> Result<EntityModel> {
        let project = only_in_project(ctx)?;
        let name = answers.text("entityName")?.to_string();
        let type_label = answers.text("entityType")?;
        let entity_type = EntityType::from_label(type_label)
            .ok_or_else(|| Error::validation("entityType", format!("unknown entity type '{type_label}'")))?;

        Ok(EntityModel {
            table_name: format!(
                "{}_{}",
                project.namespace.to_uppercase(),
                entity_name_to_table_name(&name)
            ),
            name,
            package_name: answers.text("packageName")?.to_string(),
            entity_type,
        })
    }

    fn generate(
        &self,
        ctx: &mut Context,
        model: &EntityModel,
        bindings: &Bindings,
        generator: &mut Generator<'_>,
    ) -> Result<()> {
        let layout = project_layout(ctx)?;
        let class_name = model.class_name();

        ensure_file_absence(
            layout.class_source(Module::Global, &class_name),
            format!("Entity {class_name} already exists"),
        )?;

        generator.render(ENTITY_TEMPLATE, layout.root(), bindings, RenderMode::WholeTree)?;

        let (config, parent) = match model.entity_type {
            EntityType::NotPersistent => (layout.metadata_xml(), "metadata-model"),
            _ => (layout.persistence_xml(), "persistence-unit"),
        };
        if !xml::child_texts(&config, &[parent], "class")?.contains(&class_name) {
            xml::upsert_element(&config, &[parent], &XmlElement::new("class").text(&class_name))?;
            generator.report().altered(&config);
        }

        let messages = layout.messages(Module::Global, &model.package_name);
        properties::upsert(&messages, &model.name, &printable_name(&model.name))?;
        generator.report().altered(messages);

        Ok(())
    }
}
