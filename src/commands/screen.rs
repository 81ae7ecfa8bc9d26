//! `kiln screen`: creates a screen descriptor and controller, registers the
//! screen and optionally adds it to the main menu.

use super::{command_error, only_in_project, project_layout, GeneratorCommand, Generator};
use crate::answers::{Answer, Answers};
use crate::error::Result;
use crate::files::ensure_file_absence;
use crate::model::{Bindings, Context, Model};
use crate::patch::{properties, xml, XmlElement};
use crate::processor::RenderMode;
use crate::project::{package_to_dir, Module, ProjectLayout};
use crate::question::Question;
use crate::validators;
use cruet::Inflector;

const SCREEN_TEMPLATE: &str = "screen";
const SCREEN_NAME_PATTERN: &str = r"([a-zA-Z]*[a-zA-Z0-9]+)(-[a-zA-Z]*[a-zA-Z0-9]+)*";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenModel {
    pub screen_name: String,
    pub controller_name: String,
    pub package_name: String,
    pub package_dir: String,
    /// Caption of the menu item, `None` when the screen is not added to the menu.
    pub menu_caption: Option<String>,
}

impl ScreenModel {
    pub fn screen_id(&self) -> &str {
        &self.screen_name
    }

    /// Descriptor path as registered in `web-screens.xml`.
    pub fn descriptor_template(&self) -> String {
        format!("{}/{}.xml", self.package_dir, self.screen_name)
    }
}

impl Model for ScreenModel {
    const NAME: &'static str = "screen";

    fn bindings(&self) -> Bindings {
        Bindings::new()
            .with("screenName", self.screen_name.as_str())
            .with("screenId", self.screen_id())
            .with("controllerName", self.controller_name.as_str())
            .with("packageName", self.package_name.as_str())
            .with("packageDir", self.package_dir.as_str())
    }
}

/// `invoice-browse` -> `InvoiceBrowse`
pub fn controller_name(screen_name: &str) -> String {
    screen_name.to_pascal_case()
}

#[derive(Debug, Default)]
pub struct ScreenCommand;

impl ScreenCommand {
    fn check_existence(&self, layout: &ProjectLayout, model: &ScreenModel) -> Result<()> {
        let package_dir = layout.package_dir(Module::Web, &model.package_name);
        ensure_file_absence(
            package_dir.join(format!("{}.xml", model.screen_name)),
            format!("Screen descriptor {}.{}.xml already exists", model.package_name, model.screen_name),
        )?;
        ensure_file_absence(
            package_dir.join(format!("{}.java", model.controller_name)),
            format!("Screen controller {}.{} already exists", model.package_name, model.controller_name),
        )?;

        let screens_xml = layout.screens_xml();
        if screens_xml.exists() && xml::find_by_attribute(&screens_xml, "screen", "id", model.screen_id())? {
            return Err(command_error(format!("Screen with id \"{}\" already exists", model.screen_id())));
        }
        Ok(())
    }

    fn add_to_menu(
        &self,
        layout: &ProjectLayout,
        model: &ScreenModel,
        caption: &str,
        generator: &mut Generator<'_>,
    ) -> Result<()> {
        let menu_xml = layout.menu_xml();
        let item = XmlElement::new("item").attr("id", model.screen_id()).attr("screen", model.screen_id());
        xml::upsert_element(&menu_xml, &["menu"], &item)?;
        generator.report().altered(menu_xml);

        let messages = layout.web_messages();
        properties::upsert(&messages, &format!("menu-config.{}", model.screen_id()), caption)?;
        generator.report().altered(messages);
        Ok(())
    }
}

impl GeneratorCommand for ScreenCommand {
    type Model = ScreenModel;

    fn check_preconditions(&mut self, ctx: &Context) -> Result<()> {
        only_in_project(ctx).map(|_| ())
    }

    fn questions(&self, ctx: &Context, _interactive: bool) -> Result<Vec<Question>> {
        let project = only_in_project(ctx)?;

        Ok(vec![
            Question::text("screenName", "Screen name")
                .default("screen")
                .validate(validators::matches(SCREEN_NAME_PATTERN, "Invalid screen name")),
            Question::text("packageName", "Package name")
                .default(format!("{}.web.screens", project.root_package))
                .validate(validators::is_package()),
            Question::confirm("addToMenu", "Add screen to the main menu?").default(true),
            Question::text("menuCaption", "Menu caption")
                .ask_if(|answers| answers.get("addToMenu") == Some(&Answer::Bool(true)))
                .default_with(|answers| {
                    answers.str("screenName").map(|name| Answer::Text(name.to_title_case()))
                })
                .validate(validators::not_blank("Menu caption is required")),
        ])
    }

    fn build_model(&self, answers: &Answers, _ctx: &Context) -> Result<ScreenModel> {
        let screen_name = answers.text("screenName")?.to_string();
        let package_name = answers.text("packageName")?.to_string();
        let menu_caption = if answers.flag("addToMenu")? {
            Some(answers.text("menuCaption")?.to_string())
        } else {
            None
        };

        Ok(ScreenModel {
            controller_name: controller_name(&screen_name),
            package_dir: package_to_dir(&package_name),
            screen_name,
            package_name,
            menu_caption,
        })
    }

    fn generate(
        &self,
        ctx: &mut Context,
        model: &ScreenModel,
        bindings: &Bindings,
        generator: &mut Generator<'_>,
    ) -> Result<()> {
        let layout = project_layout(ctx)?;
        self.check_existence(&layout, model)?;

        generator.render(SCREEN_TEMPLATE, layout.root(), bindings, RenderMode::WholeTree)?;

        let screens_xml = layout.screens_xml();
        let screen = XmlElement::new("screen")
            .attr("id", model.screen_id())
            .attr("template", model.descriptor_template());
        xml::upsert_element(&screens_xml, &[], &screen)?;
        generator.report().altered(screens_xml);

        if let Some(caption) = &model.menu_caption {
            self.add_to_menu(&layout, model, caption, generator)?;
        }

        Ok(())
    }
}
