use serde::{Deserialize, Serialize};

use crate::domain::wizard::values::ValueBag;

/// One selectable choice of a dropdown, radio or creatable-select field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOption {
    pub label: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl FieldOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            description: None,
        }
    }

    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Input kind of a field
///
/// Choice kinds carry their options inline, so a free-text field can never
/// be given options and a choice field can never lose them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum FieldKind {
    Text,
    Textarea { rows: u8 },
    Dropdown { options: Vec<FieldOption> },
    Radio { options: Vec<FieldOption> },
    CreatableSelect { options: Vec<FieldOption> },
}

impl FieldKind {
    /// Options offered by choice kinds, `None` for free-text kinds
    pub fn options(&self) -> Option<&[FieldOption]> {
        match self {
            FieldKind::Text | FieldKind::Textarea { .. } => None,
            FieldKind::Dropdown { options }
            | FieldKind::Radio { options }
            | FieldKind::CreatableSelect { options } => Some(options),
        }
    }

    /// Name of the widget a client should render for this kind
    pub fn widget(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Textarea { .. } => "textarea",
            FieldKind::Dropdown { .. } => "dropdown",
            FieldKind::Radio { .. } => "radio",
            FieldKind::CreatableSelect { .. } => "creatable-select",
        }
    }

    /// Whether the kind must offer at least one option
    pub fn requires_options(&self) -> bool {
        match self {
            FieldKind::Dropdown { .. }
            | FieldKind::Radio { .. }
            | FieldKind::CreatableSelect { .. } => true,
            FieldKind::Text | FieldKind::Textarea { .. } => false,
        }
    }
}

/// Visibility predicate evaluated against the current answers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum ShowIf {
    Equals { field: String, value: String },
    NotEquals { field: String, value: String },
    AnyOf { field: String, values: Vec<String> },
}

impl ShowIf {
    pub fn equals(field: impl Into<String>, value: impl Into<String>) -> Self {
        ShowIf::Equals {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn not_equals(field: impl Into<String>, value: impl Into<String>) -> Self {
        ShowIf::NotEquals {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Name of the field this predicate reads
    pub fn field(&self) -> &str {
        match self {
            ShowIf::Equals { field, .. }
            | ShowIf::NotEquals { field, .. }
            | ShowIf::AnyOf { field, .. } => field,
        }
    }

    pub fn evaluate(&self, values: &ValueBag) -> bool {
        match self {
            ShowIf::Equals { field, value } => values.get(field) == Some(value.as_str()),
            ShowIf::NotEquals { field, value } => values.get(field) != Some(value.as_str()),
            ShowIf::AnyOf { field, values: allowed } => values
                .get(field)
                .map(|current| allowed.iter().any(|v| v == current))
                .unwrap_or(false),
        }
    }
}

/// Describes one input of a wizard step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub name: String,
    pub label: String,
    #[serde(flatten)]
    pub kind: FieldKind,
    #[serde(default)]
    pub optional: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_if: Option<ShowIf>,
}

impl Field {
    fn with_kind(name: &str, label: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            kind,
            optional: false,
            placeholder: None,
            tooltip: None,
            show_if: None,
        }
    }

    pub fn text(name: &str, label: &str) -> Self {
        Self::with_kind(name, label, FieldKind::Text)
    }

    pub fn textarea(name: &str, label: &str, rows: u8) -> Self {
        Self::with_kind(name, label, FieldKind::Textarea { rows })
    }

    pub fn dropdown(name: &str, label: &str, options: Vec<FieldOption>) -> Self {
        Self::with_kind(name, label, FieldKind::Dropdown { options })
    }

    pub fn radio(name: &str, label: &str, options: Vec<FieldOption>) -> Self {
        Self::with_kind(name, label, FieldKind::Radio { options })
    }

    pub fn creatable(name: &str, label: &str, options: Vec<FieldOption>) -> Self {
        Self::with_kind(name, label, FieldKind::CreatableSelect { options })
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn placeholder(mut self, placeholder: &str) -> Self {
        self.placeholder = Some(placeholder.to_string());
        self
    }

    pub fn tooltip(mut self, tooltip: &str) -> Self {
        self.tooltip = Some(tooltip.to_string());
        self
    }

    pub fn show_if(mut self, predicate: ShowIf) -> Self {
        self.show_if = Some(predicate);
        self
    }

    /// Hidden fields are neither shown nor validated
    pub fn is_visible(&self, values: &ValueBag) -> bool {
        self.show_if
            .as_ref()
            .map(|predicate| predicate.evaluate(values))
            .unwrap_or(true)
    }

    /// Human-readable form of a stored value
    ///
    /// Choice kinds map an option value back to its label. Creatable selects
    /// fall back to the raw value when the user typed a custom entry.
    pub fn display_value<'a>(&'a self, raw: &'a str) -> &'a str {
        match &self.kind {
            FieldKind::Text | FieldKind::Textarea { .. } => raw,
            FieldKind::Dropdown { options }
            | FieldKind::Radio { options }
            | FieldKind::CreatableSelect { options } => options
                .iter()
                .find(|o| o.value == raw)
                .map(|o| o.label.as_str())
                .unwrap_or(raw),
        }
    }
}

/// One screen's worth of related fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub step: u32,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub fields: Vec<Field>,
}

impl Step {
    pub fn new(step: u32, title: &str, fields: Vec<Field>) -> Self {
        Self {
            step,
            title: title.to_string(),
            description: None,
            fields,
        }
    }

    pub fn described(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn environment_options() -> Vec<FieldOption> {
        vec![
            FieldOption::new("Kitchen", "a sunlit kitchen counter"),
            FieldOption::new("Custom", "custom"),
        ]
    }

    #[test]
    fn show_if_equals_hides_until_value_matches() {
        let field = Field::text("customEnvironment", "Describe it")
            .show_if(ShowIf::equals("environment", "custom"));
        let mut values = ValueBag::default();

        assert!(!field.is_visible(&values));
        values.set("environment", "custom");
        assert!(field.is_visible(&values));
        values.set("environment", "a sunlit kitchen counter");
        assert!(!field.is_visible(&values));
    }

    #[test]
    fn show_if_not_equals_visible_when_unset() {
        let predicate = ShowIf::not_equals("referenceIntent", "none");
        let mut values = ValueBag::default();
        values.remove("referenceIntent");
        assert!(predicate.evaluate(&values));
    }

    #[test]
    fn show_if_any_of() {
        let predicate = ShowIf::AnyOf {
            field: "orientation".to_string(),
            values: vec!["portrait".to_string(), "square".to_string()],
        };
        let mut values = ValueBag::with_defaults();
        assert!(predicate.evaluate(&values));
        values.set("orientation", "landscape");
        assert!(!predicate.evaluate(&values));
    }

    #[test]
    fn display_value_maps_option_labels() {
        let field = Field::dropdown("environment", "Environment", environment_options());
        assert_eq!(field.display_value("a sunlit kitchen counter"), "Kitchen");
        assert_eq!(field.display_value("somewhere else"), "somewhere else");

        let text = Field::text("productName", "Product");
        assert_eq!(text.display_value("Mug"), "Mug");
    }

    #[test]
    fn only_choice_kinds_have_options() {
        assert!(FieldKind::Text.options().is_none());
        assert!(FieldKind::Textarea { rows: 3 }.options().is_none());
        let radio = FieldKind::Radio {
            options: environment_options(),
        };
        assert_eq!(radio.options().map(|o| o.len()), Some(2));
        assert!(radio.requires_options());
        assert!(FieldKind::CreatableSelect { options: vec![] }.requires_options());
        assert!(!FieldKind::Textarea { rows: 3 }.requires_options());
    }

    #[test]
    fn field_serializes_kind_as_type_tag() {
        let field = Field::textarea("extraInstructions", "Extra Instructions", 4).optional();
        let json = serde_json::to_value(&field).unwrap();
        assert_eq!(json["type"], "textarea");
        assert_eq!(json["rows"], 4);
        assert_eq!(json["optional"], true);
        assert!(json.get("showIf").is_none());
    }
}
