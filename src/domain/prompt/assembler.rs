use crate::domain::catalog::TemplateConfig;
use crate::domain::wizard::values::{keys, ValueBag};

use super::reference::ReferenceIntent;

pub const REFERENCE_LABEL: &str = "Reference Image Instructions:";
pub const EXTRA_INSTRUCTIONS_LABEL: &str = "Extra instructions:";

/// Builds the final prompt for `template` from the answers
///
/// Order is fixed: template paragraph, reference image clause, then the
/// user's extra instructions. The downstream model treats trailing free text
/// as the strongest override, so it must stay last.
pub fn assemble(template: &TemplateConfig, values: &ValueBag) -> String {
    let base = template.generate_prompt(values);
    augment(base, values)
}

/// Applies the reference and extra-instruction passes to a base prompt
pub fn augment(mut prompt: String, values: &ValueBag) -> String {
    if let Some(clause) = reference_clause(values) {
        prompt.push_str(&clause);
    }

    if let Some(extra) = values.get(keys::EXTRA_INSTRUCTIONS) {
        if !extra.trim().is_empty() {
            prompt.push_str("\n\n");
            prompt.push_str(EXTRA_INSTRUCTIONS_LABEL);
            prompt.push('\n');
            prompt.push_str(extra);
        }
    }

    prompt
}

/// Clause for the bag's reference intent, if one applies
pub fn reference_clause(values: &ValueBag) -> Option<String> {
    let raw = values.get(keys::REFERENCE_INTENT)?;
    let intent = match raw.parse::<ReferenceIntent>() {
        Ok(intent) => intent,
        Err(e) => {
            tracing::warn!(reference_intent = raw, "ignoring reference intent: {}", e);
            return None;
        }
    };
    intent
        .clause()
        .map(|clause| format!("\n\n{} {}", REFERENCE_LABEL, clause))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::{TemplateCatalog, TemplateId};

    fn styled_values() -> ValueBag {
        let mut v = ValueBag::with_defaults();
        v.set(keys::PRODUCT_NAME, "Aurora Mug");
        v.set(keys::PRODUCT_DESCRIPTION, "a speckled ceramic mug");
        v.set("backdrop", "a soft pastel gradient");
        v.set("lighting", "natural window light");
        v.set("colorPalette", "monochrome");
        v
    }

    fn styled(catalog: &TemplateCatalog) -> &TemplateConfig {
        catalog.get_template(TemplateId::StyledProduct).unwrap()
    }

    #[test]
    fn defaults_leave_base_prompt_untouched() {
        let catalog = TemplateCatalog::builtin();
        let values = styled_values();
        let template = styled(&catalog);

        assert_eq!(assemble(template, &values), template.generate_prompt(&values));
    }

    #[test]
    fn reference_then_extra_instructions_in_fixed_order() {
        let catalog = TemplateCatalog::builtin();
        let template = styled(&catalog);
        let mut values = styled_values();
        values.set(keys::REFERENCE_INTENT, "style-inspiration");
        values.set(keys::EXTRA_INSTRUCTIONS, "No text in the image.");

        let base = template.generate_prompt(&values);
        let clause = reference_clause(&values).unwrap();
        let expected = format!("{}{}\n\nExtra instructions:\nNo text in the image.", base, clause);

        let prompt = assemble(template, &values);
        assert_eq!(prompt, expected);
        assert!(prompt.ends_with("No text in the image."));
        assert!(clause.starts_with("\n\nReference Image Instructions: Use the uploaded images"));
    }

    #[test]
    fn each_reference_intent_has_its_own_clause() {
        let mut seen = Vec::new();
        for intent in ReferenceIntent::ALL {
            let mut values = ValueBag::default();
            values.set(keys::REFERENCE_INTENT, intent.as_str());
            let clause = reference_clause(&values);
            assert_eq!(clause.is_none(), intent == ReferenceIntent::None);
            if let Some(clause) = clause {
                assert!(!seen.contains(&clause));
                seen.push(clause);
            }
        }
    }

    #[test]
    fn unknown_reference_intent_is_ignored() {
        let mut values = ValueBag::default();
        values.set(keys::REFERENCE_INTENT, "make-it-pop");
        assert_eq!(reference_clause(&values), None);
    }

    #[test]
    fn blank_extra_instructions_are_skipped() {
        let mut values = ValueBag::default();
        values.set(keys::EXTRA_INSTRUCTIONS, "   ");
        assert_eq!(augment("Base.".to_string(), &values), "Base.");
    }

    #[test]
    fn extra_instructions_are_inserted_verbatim() {
        let mut values = ValueBag::default();
        values.set(keys::EXTRA_INSTRUCTIONS, "  keep <b>logo</b> visible\n");
        assert_eq!(
            augment("Base.".to_string(), &values),
            "Base.\n\nExtra instructions:\n  keep <b>logo</b> visible\n"
        );
    }
}
