use std::collections::HashSet;
use thiserror::Error;

use super::field::{Field, FieldOption, Step};
use super::intents::{builtin_intents, Intent};
use super::templates::{builtin_templates, TemplateConfig, TemplateId};
use crate::domain::prompt::ReferenceIntent;
use crate::domain::wizard::values::keys;

/// Position of the template selection step
pub const TEMPLATE_SELECTION_STEP: u32 = 1;
/// Position of the "Product Basics" step shared by every template
pub const PRODUCT_BASICS_STEP: u32 = 2;

/// Errors raised by catalog lookups
///
/// Both variants point at a bug in the static tables or in the caller, never
/// at user input that should be silently tolerated.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("catalog integrity violation: {0}")]
    Integrity(String),
}

impl CatalogError {
    pub fn template_not_found(id: impl Into<String>) -> Self {
        CatalogError::NotFound {
            kind: "template",
            id: id.into(),
        }
    }

    pub fn intent_not_found(id: impl Into<String>) -> Self {
        CatalogError::NotFound {
            kind: "intent",
            id: id.into(),
        }
    }
}

/// Immutable registry of templates and intents
///
/// Built once at start-up and shared behind an `Arc`; nothing mutates it
/// afterwards. Lookups hand out references, step lists are owned copies.
#[derive(Debug, Clone)]
pub struct TemplateCatalog {
    templates: Vec<TemplateConfig>,
    intents: Vec<Intent>,
    selection_step: Step,
    basics_step: Step,
    final_fields: Vec<Field>,
}

impl TemplateCatalog {
    /// Catalog with the built-in templates and intents
    pub fn builtin() -> Self {
        let templates = builtin_templates();
        let selection_step = Step::new(
            TEMPLATE_SELECTION_STEP,
            "Choose a Template",
            vec![Field::radio(
                keys::TEMPLATE,
                "Template",
                templates
                    .iter()
                    .map(|t| FieldOption::new(t.name, t.id.as_str()).described(t.description))
                    .collect(),
            )],
        );

        Self {
            templates,
            intents: builtin_intents(),
            selection_step,
            basics_step: product_basics_step(),
            final_fields: vec![Field::textarea(
                keys::EXTRA_INSTRUCTIONS,
                "Extra Instructions",
                4,
            )
            .placeholder("Anything else the image should include or avoid")
            .optional()],
        }
    }

    /// Assembles a catalog from explicit parts
    pub fn from_parts(
        templates: Vec<TemplateConfig>,
        intents: Vec<Intent>,
        selection_step: Step,
        basics_step: Step,
        final_fields: Vec<Field>,
    ) -> Self {
        Self {
            templates,
            intents,
            selection_step,
            basics_step,
            final_fields,
        }
    }

    pub fn get_template(&self, id: TemplateId) -> Result<&TemplateConfig, CatalogError> {
        self.templates
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| CatalogError::template_not_found(id.as_str()))
    }

    /// Looks a template up by its wire name
    pub fn template_by_name(&self, name: &str) -> Result<&TemplateConfig, CatalogError> {
        let id: TemplateId = name.parse().map_err(CatalogError::template_not_found)?;
        self.get_template(id)
    }

    pub fn templates(&self) -> &[TemplateConfig] {
        &self.templates
    }

    pub fn intents(&self) -> &[Intent] {
        &self.intents
    }

    pub fn find_intent(&self, id: &str) -> Result<&Intent, CatalogError> {
        self.intents
            .iter()
            .find(|i| i.id == id)
            .ok_or_else(|| CatalogError::intent_not_found(id))
    }

    /// Full ordered step list of a template
    ///
    /// Starts with template selection and "Product Basics", followed by the
    /// template's own steps, sorted by position. The final fields are
    /// appended to whichever step ends up last, so every template closes
    /// with room for free-form instructions.
    pub fn get_steps_for_template(&self, id: TemplateId) -> Result<Vec<Step>, CatalogError> {
        let template = self.get_template(id)?;

        let mut steps = Vec::with_capacity(template.steps.len() + 2);
        steps.push(self.selection_step.clone());
        steps.push(self.basics_step.clone());
        steps.extend(template.steps.iter().cloned());
        steps.sort_by_key(|s| s.step);

        if let Some(last) = steps.last_mut() {
            last.fields.extend(self.final_fields.iter().cloned());
        }

        Ok(steps)
    }

    /// Steps the user walks through after a template is chosen
    pub fn content_steps(&self, id: TemplateId) -> Result<Vec<Step>, CatalogError> {
        Ok(self
            .get_steps_for_template(id)?
            .into_iter()
            .filter(|s| s.step > TEMPLATE_SELECTION_STEP)
            .collect())
    }

    /// Checks the static tables for configuration bugs
    pub fn verify(&self) -> Result<(), CatalogError> {
        let mut seen_templates = HashSet::new();
        for template in &self.templates {
            if !seen_templates.insert(template.id) {
                return Err(CatalogError::Integrity(format!(
                    "template {} registered twice",
                    template.id
                )));
            }

            let mut previous = PRODUCT_BASICS_STEP;
            for step in &template.steps {
                if step.step <= previous {
                    return Err(CatalogError::Integrity(format!(
                        "template {} step {} must come after step {}",
                        template.id, step.step, previous
                    )));
                }
                previous = step.step;
            }
        }

        let global = [&self.selection_step, &self.basics_step];
        for step in global
            .into_iter()
            .chain(self.templates.iter().flat_map(|t| t.steps.iter()))
        {
            verify_step_fields(step)?;
        }

        for intent in &self.intents {
            if intent.templates.is_empty() {
                return Err(CatalogError::Integrity(format!(
                    "intent {} offers no templates",
                    intent.id
                )));
            }
            for template in &intent.templates {
                self.get_template(*template).map_err(|_| {
                    CatalogError::Integrity(format!(
                        "intent {} references unregistered template {}",
                        intent.id, template
                    ))
                })?;
            }
        }

        Ok(())
    }
}

impl Default for TemplateCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn verify_step_fields(step: &Step) -> Result<(), CatalogError> {
    let mut names = HashSet::new();
    for field in &step.fields {
        if !names.insert(field.name.as_str()) {
            return Err(CatalogError::Integrity(format!(
                "field {} appears twice in step {}",
                field.name, step.step
            )));
        }
        let option_count = field.kind.options().map(<[_]>::len).unwrap_or(0);
        if field.kind.requires_options() && option_count == 0 {
            return Err(CatalogError::Integrity(format!(
                "{} field {} in step {} has no options",
                field.kind.widget(),
                field.name,
                step.step
            )));
        }
    }
    Ok(())
}

fn product_basics_step() -> Step {
    Step::new(
        PRODUCT_BASICS_STEP,
        "Product Basics",
        vec![
            Field::text(keys::PRODUCT_NAME, "Product name").placeholder("e.g. Aurora Ceramic Mug"),
            Field::textarea(keys::PRODUCT_DESCRIPTION, "Describe your product", 3)
                .placeholder("Material, color, size, what makes it special"),
            Field::radio(
                keys::ORIENTATION,
                "Orientation",
                vec![
                    FieldOption::new("Portrait", "portrait"),
                    FieldOption::new("Landscape", "landscape"),
                    FieldOption::new("Square", "square"),
                ],
            ),
            Field::dropdown(
                keys::REFERENCE_INTENT,
                "How should we use your uploaded images?",
                ReferenceIntent::ALL
                    .iter()
                    .map(|r| FieldOption::new(r.label(), r.as_str()))
                    .collect(),
            )
            .tooltip("Only matters when you upload scenes or inspiration images"),
        ],
    )
    .described("Tell us about the product you're advertising.")
}
