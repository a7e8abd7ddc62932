// Template catalog module
// Static registry of templates, their field steps and the intents that group them

#![allow(clippy::module_inception)]

pub mod catalog;
pub mod field;
pub mod intents;
pub mod templates;

pub use catalog::{CatalogError, TemplateCatalog, PRODUCT_BASICS_STEP, TEMPLATE_SELECTION_STEP};
pub use field::{Field, FieldKind, FieldOption, ShowIf, Step};
pub use intents::Intent;
pub use templates::{TemplateConfig, TemplateId};
