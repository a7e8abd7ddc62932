use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a wizard session currently is
///
/// # Transitions
/// ```text
/// ImageUpload <-> IntentSelection <-> TemplateSelection
///                        |                   |
///                        +---> ContentStep(1) <-> ... <-> ContentStep(N) <-> Review -> Submitted
/// ```
/// Content steps are numbered from 1. Intents offering a single template
/// jump from IntentSelection straight to ContentStep(1), and Back from
/// ContentStep(1) returns to whichever selection screen preceded it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "index", rename_all = "snake_case")]
pub enum WizardPosition {
    ImageUpload,
    IntentSelection,
    TemplateSelection,
    ContentStep(usize),
    Review,
    /// Terminal: the ad was handed to the generation service
    Submitted,
}

impl WizardPosition {
    /// Checks a single navigation move, ignoring restarts
    ///
    /// # Example
    /// ```
    /// use admuse_api::domain::wizard::WizardPosition;
    ///
    /// assert!(WizardPosition::IntentSelection.can_transition_to(WizardPosition::ContentStep(1)));
    /// assert!(!WizardPosition::ImageUpload.can_transition_to(WizardPosition::Review));
    /// ```
    pub fn can_transition_to(&self, next: WizardPosition) -> bool {
        use WizardPosition::*;
        match (*self, next) {
            (ImageUpload, IntentSelection)
            | (IntentSelection, ImageUpload)
            | (IntentSelection, TemplateSelection)
            | (IntentSelection, ContentStep(1))
            | (TemplateSelection, IntentSelection)
            | (TemplateSelection, ContentStep(1))
            | (ContentStep(1), IntentSelection)
            | (ContentStep(1), TemplateSelection)
            | (ContentStep(_), Review)
            | (Review, ContentStep(_))
            | (Review, Submitted) => true,
            (ContentStep(from), ContentStep(to)) => from >= 1 && (to == from + 1 || to + 1 == from),
            _ => false,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, WizardPosition::Submitted)
    }
}

impl fmt::Display for WizardPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WizardPosition::ImageUpload => write!(f, "image upload"),
            WizardPosition::IntentSelection => write!(f, "intent selection"),
            WizardPosition::TemplateSelection => write!(f, "template selection"),
            WizardPosition::ContentStep(index) => write!(f, "content step {}", index),
            WizardPosition::Review => write!(f, "review"),
            WizardPosition::Submitted => write!(f, "submitted"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use WizardPosition::*;

    #[test]
    fn forward_path() {
        assert!(ImageUpload.can_transition_to(IntentSelection));
        assert!(IntentSelection.can_transition_to(TemplateSelection));
        assert!(TemplateSelection.can_transition_to(ContentStep(1)));
        assert!(ContentStep(1).can_transition_to(ContentStep(2)));
        assert!(ContentStep(3).can_transition_to(Review));
        assert!(Review.can_transition_to(Submitted));
    }

    #[test]
    fn backward_path() {
        assert!(Review.can_transition_to(ContentStep(3)));
        assert!(ContentStep(2).can_transition_to(ContentStep(1)));
        assert!(ContentStep(1).can_transition_to(TemplateSelection));
        assert!(ContentStep(1).can_transition_to(IntentSelection));
        assert!(IntentSelection.can_transition_to(ImageUpload));
    }

    #[test]
    fn single_template_intent_skips_selection() {
        assert!(IntentSelection.can_transition_to(ContentStep(1)));
        assert!(!IntentSelection.can_transition_to(ContentStep(2)));
    }

    #[test]
    fn content_steps_cannot_jump() {
        assert!(!ContentStep(1).can_transition_to(ContentStep(3)));
        assert!(!ContentStep(2).can_transition_to(TemplateSelection));
        assert!(!ContentStep(0).can_transition_to(ContentStep(1)));
    }

    #[test]
    fn submitted_is_terminal() {
        assert!(Submitted.is_terminal());
        assert!(!Submitted.can_transition_to(Review));
        assert!(!Submitted.can_transition_to(ImageUpload));
    }

    #[test]
    fn position_serializes_with_index() {
        let json = serde_json::to_value(ContentStep(2)).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "content_step", "index": 2}));
        let json = serde_json::to_value(Review).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "review"}));
    }

    #[test]
    fn position_display() {
        assert_eq!(ContentStep(2).to_string(), "content step 2");
        assert_eq!(ImageUpload.to_string(), "image upload");
    }
}
