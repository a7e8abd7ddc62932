// Wizard module
// Session state machine, answers, validation gates and their events

pub mod events;
pub mod images;
pub mod position;
pub mod session;
pub mod validator;
pub mod values;

use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::domain::catalog::{CatalogError, TemplateId};

pub use events::WizardEvent;
pub use images::{ImageBlob, MAX_IMAGES};
pub use position::WizardPosition;
pub use session::{ReviewLine, SessionMode, WizardSession};
pub use values::ValueBag;

/// Errors raised by wizard operations
///
/// Incomplete answers are not errors; they surface as [`Advance::Blocked`].
#[derive(Debug, Error)]
pub enum WizardError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("cannot {action} at {position}")]
    InvalidTransition {
        position: WizardPosition,
        action: &'static str,
    },

    #[error("template {template} is not offered by intent {intent}")]
    TemplateNotOffered { template: TemplateId, intent: String },

    #[error("at most {max} images can be uploaded")]
    TooManyImages { max: usize },

    #[error("invalid image: {0}")]
    InvalidImage(String),

    #[error("image not found: {0}")]
    UnknownImage(String),

    #[error("generation failed: {0}")]
    SubmissionFailed(String),
}

pub type WizardResult<T> = Result<T, WizardError>;

/// Why an action was suppressed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum BlockReason {
    NoImages,
    IncompleteStep { missing: Vec<String> },
    MissingAdName,
    EmptyPrompt,
    InsufficientCredits { available: u32, cost_per_sample: u32 },
    NotConfirmed,
    NotAcknowledged,
    UnknownAdType,
    /// Edit sessions open at Review and have nothing to go back to
    NoEarlierSteps,
}

impl fmt::Display for BlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockReason::NoImages => write!(f, "upload at least one image"),
            BlockReason::IncompleteStep { missing } => {
                write!(f, "missing required fields: {}", missing.join(", "))
            }
            BlockReason::MissingAdName => write!(f, "give the ad a name"),
            BlockReason::EmptyPrompt => write!(f, "the prompt is empty"),
            BlockReason::InsufficientCredits {
                available,
                cost_per_sample,
            } => write!(
                f,
                "{} credits available, one image costs {}",
                available, cost_per_sample
            ),
            BlockReason::NotConfirmed => write!(f, "request a confirmation first"),
            BlockReason::NotAcknowledged => write!(f, "the credit cost was not acknowledged"),
            BlockReason::UnknownAdType => write!(f, "the ad has no template"),
            BlockReason::NoEarlierSteps => write!(f, "no earlier steps in edit mode"),
        }
    }
}

/// Result of a navigation or gated action
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Advance {
    Moved { event: WizardEvent },
    Blocked { reason: BlockReason },
}

impl Advance {
    pub fn is_blocked(&self) -> bool {
        matches!(self, Advance::Blocked { .. })
    }

    pub fn event(&self) -> Option<&WizardEvent> {
        match self {
            Advance::Moved { event } => Some(event),
            Advance::Blocked { .. } => None,
        }
    }
}

impl From<WizardEvent> for Advance {
    fn from(event: WizardEvent) -> Self {
        Advance::Moved { event }
    }
}

impl From<BlockReason> for Advance {
    fn from(reason: BlockReason) -> Self {
        Advance::Blocked { reason }
    }
}
