use serde::Serialize;

use super::templates::TemplateId;

/// High-level creative goal that narrows the applicable templates
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Intent {
    pub id: &'static str,
    pub label: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub templates: Vec<TemplateId>,
}

impl Intent {
    /// The only template offered, if the intent offers exactly one
    ///
    /// Such intents skip template selection entirely.
    pub fn single_template(&self) -> Option<TemplateId> {
        match self.templates.as_slice() {
            [only] => Some(*only),
            _ => None,
        }
    }

    pub fn offers(&self, template: TemplateId) -> bool {
        self.templates.contains(&template)
    }
}

pub(crate) fn builtin_intents() -> Vec<Intent> {
    vec![
        Intent {
            id: "showcase-product",
            label: "Showcase a Product",
            description: "Put your product front and center in a scene or a studio.",
            icon: "package",
            templates: vec![TemplateId::ProductInEnvironment, TemplateId::StyledProduct],
        },
        Intent {
            id: "styled-shot",
            label: "Create a Styled Product Shot",
            description: "A polished studio image ready for a product page.",
            icon: "sparkles",
            templates: vec![TemplateId::StyledProduct],
        },
        Intent {
            id: "product-in-use",
            label: "Show Your Product in Use",
            description: "Real people enjoying what you sell.",
            icon: "users",
            templates: vec![TemplateId::ProductWithPerson],
        },
        Intent {
            id: "social-post",
            label: "Create a Social Media Post",
            description: "Scroll-stopping visuals for your feed.",
            icon: "share",
            templates: vec![TemplateId::ProductWithPerson, TemplateId::FlatLay],
        },
        Intent {
            id: "flat-lay",
            label: "Design a Flat Lay",
            description: "A curated top-down arrangement.",
            icon: "layout-grid",
            templates: vec![TemplateId::FlatLay],
        },
    ]
}
