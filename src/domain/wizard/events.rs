use serde::Serialize;
use uuid::Uuid;

use super::position::WizardPosition;
use crate::domain::catalog::TemplateId;

/// Things that happen to a wizard session
///
/// Every successful transition yields one event; callers log them and hand
/// them back to clients so the front end can react without re-reading the
/// whole session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WizardEvent {
    Started {
        session_id: Uuid,
    },
    /// Opened on an existing ad, directly at Review
    Hydrated {
        session_id: Uuid,
        ad_id: Uuid,
    },
    ImageAdded {
        session_id: Uuid,
        handle: String,
    },
    ImageRemoved {
        session_id: Uuid,
        handle: String,
    },
    IntentSelected {
        session_id: Uuid,
        intent: String,
        templates: Vec<TemplateId>,
        /// Set when the intent offers a single template
        auto_selected: Option<TemplateId>,
    },
    TemplateSelected {
        session_id: Uuid,
        template: TemplateId,
        content_steps: usize,
    },
    Moved {
        session_id: Uuid,
        from: WizardPosition,
        to: WizardPosition,
    },
    PromptAssembled {
        session_id: Uuid,
        template: TemplateId,
        prompt_chars: usize,
    },
    ConfirmationRequested {
        session_id: Uuid,
        num_samples: u32,
        total_cost: u32,
    },
    Submitted {
        session_id: Uuid,
        images: usize,
        credits_used: u32,
    },
    Reset {
        session_id: Uuid,
    },
}

impl WizardEvent {
    /// Returns the session this event belongs to
    pub fn session_id(&self) -> Uuid {
        match self {
            WizardEvent::Started { session_id }
            | WizardEvent::Hydrated { session_id, .. }
            | WizardEvent::ImageAdded { session_id, .. }
            | WizardEvent::ImageRemoved { session_id, .. }
            | WizardEvent::IntentSelected { session_id, .. }
            | WizardEvent::TemplateSelected { session_id, .. }
            | WizardEvent::Moved { session_id, .. }
            | WizardEvent::PromptAssembled { session_id, .. }
            | WizardEvent::ConfirmationRequested { session_id, .. }
            | WizardEvent::Submitted { session_id, .. }
            | WizardEvent::Reset { session_id } => *session_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_id_of_every_variant() {
        let id = Uuid::new_v4();
        let events = vec![
            WizardEvent::Started { session_id: id },
            WizardEvent::Reset { session_id: id },
            WizardEvent::Moved {
                session_id: id,
                from: WizardPosition::ImageUpload,
                to: WizardPosition::IntentSelection,
            },
            WizardEvent::Submitted {
                session_id: id,
                images: 2,
                credits_used: 4,
            },
        ];

        assert!(events.iter().all(|e| e.session_id() == id));
    }

    #[test]
    fn event_serializes_with_type_tag() {
        let event = WizardEvent::TemplateSelected {
            session_id: Uuid::nil(),
            template: TemplateId::FlatLay,
            content_steps: 2,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "template_selected");
        assert_eq!(json["template"], "flat-lay");
    }
}
