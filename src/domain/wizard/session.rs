use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use super::events::WizardEvent;
use super::images::{ImageBlob, MAX_IMAGES};
use super::position::WizardPosition;
use super::validator::{check_content_step, StepContext};
use super::values::{keys, ValueBag};
use super::{Advance, BlockReason, WizardError, WizardResult};
use crate::domain::ad::{AdSubmission, ExistingAd, GenerationOutcome, Orientation, Quality};
use crate::domain::catalog::{Step, TemplateCatalog, TemplateId};
use crate::domain::credits::{Confirmation, CreditPolicy};
use crate::domain::prompt;
use crate::domain::repositories::GenerationService;
use crate::domain::user::UserContext;

/// One answered, visible field as shown on the Review screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewLine {
    pub step: String,
    pub label: String,
    pub value: String,
}

/// How a session was opened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SessionMode {
    Fresh,
    /// Reopened on an existing ad; starts at Review with no earlier steps
    Edit { ad_id: Uuid },
}

/// One user's walk through the ad wizard
///
/// Owns the answers, the resolved steps and the current position. The
/// catalog is shared and read-only.
///
/// # Invariants
/// - `steps` is non-empty exactly when a template has been chosen in this session
/// - `ContentStep(i)` always satisfies `1 <= i <= steps.len()`
/// - A confirmation is only pending at Review
/// - Once `Submitted`, only `reset` changes the session
///
/// # Example
/// ```
/// use admuse_api::domain::catalog::TemplateCatalog;
/// use admuse_api::domain::wizard::{ImageBlob, WizardPosition, WizardSession};
/// use std::sync::Arc;
/// use uuid::Uuid;
///
/// let catalog = Arc::new(TemplateCatalog::builtin());
/// let (mut session, _) = WizardSession::new(Uuid::new_v4(), catalog);
/// session
///     .add_image(ImageBlob::new("mug.png", "image/png", vec![1, 2, 3]).unwrap())
///     .unwrap();
/// session.next().unwrap();
/// session.select_intent("styled-shot").unwrap();
///
/// assert_eq!(session.position(), WizardPosition::ContentStep(1));
/// ```
#[derive(Debug, Clone)]
pub struct WizardSession {
    id: Uuid,
    user_id: Uuid,
    catalog: Arc<TemplateCatalog>,
    mode: SessionMode,
    position: WizardPosition,
    values: ValueBag,
    ad_name: String,
    brand_id: Option<String>,
    quality: Option<Quality>,
    intent: Option<String>,
    template: Option<TemplateId>,
    stored_ad_type: Option<String>,
    /// Dimensions of the reopened ad, sent as-is until the orientation changes
    stored_dimensions: Option<String>,
    dimensions_from_orientation: bool,
    steps: Vec<Step>,
    images: Vec<ImageBlob>,
    hosted_images: Vec<String>,
    result_images: Vec<String>,
    review_prompt: String,
    pending_confirmation: Option<Confirmation>,
    outcome: Option<GenerationOutcome>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl WizardSession {
    /// Starts a fresh session at ImageUpload
    pub fn new(user_id: Uuid, catalog: Arc<TemplateCatalog>) -> (Self, WizardEvent) {
        let now = Utc::now();
        let session = Self {
            id: Uuid::new_v4(),
            user_id,
            catalog,
            mode: SessionMode::Fresh,
            position: WizardPosition::ImageUpload,
            values: ValueBag::with_defaults(),
            ad_name: String::new(),
            brand_id: None,
            quality: None,
            intent: None,
            template: None,
            stored_ad_type: None,
            stored_dimensions: None,
            dimensions_from_orientation: true,
            steps: Vec::new(),
            images: Vec::new(),
            hosted_images: Vec::new(),
            result_images: Vec::new(),
            review_prompt: String::new(),
            pending_confirmation: None,
            outcome: None,
            created_at: now,
            updated_at: now,
        };

        let event = WizardEvent::Started {
            session_id: session.id,
        };
        (session, event)
    }

    /// Opens a session on an existing ad, directly at Review
    ///
    /// Previews list the ad's source images followed by its results, and the
    /// review prompt is the ad's stored prompt. An `ad_type` that is not a
    /// known template is kept verbatim for resubmission.
    pub fn hydrate(
        user_id: Uuid,
        catalog: Arc<TemplateCatalog>,
        ad: &ExistingAd,
    ) -> (Self, WizardEvent) {
        let (mut session, _) = Self::new(user_id, catalog);

        session.mode = SessionMode::Edit { ad_id: ad.id };
        session.position = WizardPosition::Review;
        session.ad_name = ad.name.clone().unwrap_or_default();
        session.brand_id = ad.brand_id.clone();
        session.review_prompt = ad.prompt.clone();
        session.hosted_images = ad.original_image_urls.clone();
        session.result_images = ad.result_urls.clone();
        session.stored_dimensions = ad.dimensions.clone();
        session.dimensions_from_orientation = false;

        if let Some(orientation) = ad
            .dimensions
            .as_deref()
            .and_then(Orientation::from_dimensions)
        {
            session.values.set(keys::ORIENTATION, orientation.as_str());
        }

        if let Some(ad_type) = ad.ad_type.as_deref() {
            match ad_type.parse::<TemplateId>() {
                Ok(template) => {
                    session.template = Some(template);
                    session.values.set(keys::TEMPLATE, template.as_str());
                }
                Err(_) => {
                    tracing::warn!(ad_id = %ad.id, ad_type, "existing ad has an unknown template");
                    session.stored_ad_type = Some(ad_type.to_string());
                }
            }
        }

        let event = WizardEvent::Hydrated {
            session_id: session.id,
            ad_id: ad.id,
        };
        (session, event)
    }

    // ===== Images =====

    /// Adds an uploaded image; only while at ImageUpload
    pub fn add_image(&mut self, image: ImageBlob) -> WizardResult<WizardEvent> {
        self.require(WizardPosition::ImageUpload, "add images")?;
        if self.images.len() >= MAX_IMAGES {
            return Err(WizardError::TooManyImages { max: MAX_IMAGES });
        }

        let handle = image.handle().to_string();
        self.images.push(image);
        self.touch();

        Ok(WizardEvent::ImageAdded {
            session_id: self.id,
            handle,
        })
    }

    pub fn remove_image(&mut self, handle: &str) -> WizardResult<WizardEvent> {
        self.require(WizardPosition::ImageUpload, "remove images")?;
        let index = self
            .images
            .iter()
            .position(|image| image.handle() == handle)
            .ok_or_else(|| WizardError::UnknownImage(handle.to_string()))?;

        self.images.remove(index);
        self.touch();

        Ok(WizardEvent::ImageRemoved {
            session_id: self.id,
            handle: handle.to_string(),
        })
    }

    // ===== Answers =====

    pub fn set_value(&mut self, name: &str, value: impl Into<String>) -> WizardResult<()> {
        self.require_open("edit answers")?;
        if name == keys::ORIENTATION {
            self.dimensions_from_orientation = true;
        }
        self.values.set(name, value);
        self.touch();
        Ok(())
    }

    pub fn set_ad_name(&mut self, name: impl Into<String>) -> WizardResult<()> {
        self.require_open("rename the ad")?;
        self.ad_name = name.into();
        self.touch();
        Ok(())
    }

    pub fn set_brand_id(&mut self, brand_id: Option<String>) -> WizardResult<()> {
        self.require_open("change the brand")?;
        self.brand_id = brand_id.filter(|b| !b.is_empty());
        self.touch();
        Ok(())
    }

    pub fn set_quality(&mut self, quality: Option<Quality>) -> WizardResult<()> {
        self.require_open("change the quality")?;
        self.quality = quality;
        self.touch();
        Ok(())
    }

    /// Replaces the assembled prompt with the user's edit
    pub fn edit_review_prompt(&mut self, prompt: impl Into<String>) -> WizardResult<()> {
        self.require(WizardPosition::Review, "edit the prompt")?;
        self.review_prompt = prompt.into();
        self.touch();
        Ok(())
    }

    // ===== Selection =====

    /// Picks an intent, discarding every answer given so far
    ///
    /// Intents offering one template select it and go straight to the first
    /// content step; others go to template selection.
    pub fn select_intent(&mut self, intent_id: &str) -> WizardResult<WizardEvent> {
        self.require(WizardPosition::IntentSelection, "select an intent")?;
        let catalog = Arc::clone(&self.catalog);
        let intent = catalog.find_intent(intent_id)?;

        self.clear_answers();
        self.intent = Some(intent.id.to_string());

        let auto_selected = intent.single_template();
        match auto_selected {
            Some(template) => {
                self.apply_template(&catalog, template)?;
                self.move_to(WizardPosition::ContentStep(1))?;
            }
            None => {
                self.move_to(WizardPosition::TemplateSelection)?;
            }
        }

        tracing::debug!(
            session_id = %self.id,
            intent = intent.id,
            auto_selected = ?auto_selected,
            "intent selected"
        );

        Ok(WizardEvent::IntentSelected {
            session_id: self.id,
            intent: intent.id.to_string(),
            templates: intent.templates.clone(),
            auto_selected,
        })
    }

    /// Picks one of the current intent's templates
    ///
    /// Choosing a different template than before discards the answers.
    pub fn select_template(&mut self, template: TemplateId) -> WizardResult<WizardEvent> {
        self.require(WizardPosition::TemplateSelection, "select a template")?;
        let catalog = Arc::clone(&self.catalog);
        let intent_id = self.intent.clone().unwrap_or_default();
        let intent = catalog.find_intent(&intent_id)?;
        if !intent.offers(template) {
            return Err(WizardError::TemplateNotOffered {
                template,
                intent: intent_id,
            });
        }

        if self.template != Some(template) {
            self.clear_answers();
        }
        self.apply_template(&catalog, template)?;
        self.move_to(WizardPosition::ContentStep(1))?;

        Ok(WizardEvent::TemplateSelected {
            session_id: self.id,
            template,
            content_steps: self.steps.len(),
        })
    }

    // ===== Navigation =====

    /// Why Next is currently disabled, if it is
    pub fn next_blocker(&self) -> Option<BlockReason> {
        match self.position {
            WizardPosition::ImageUpload if self.images.is_empty() => Some(BlockReason::NoImages),
            WizardPosition::ContentStep(index) => {
                let step = self.steps.get(index - 1)?;
                check_content_step(&StepContext {
                    step,
                    values: &self.values,
                    ad_name: &self.ad_name,
                })
                .err()
            }
            _ => None,
        }
    }

    /// Moves forward, or reports why it cannot
    ///
    /// Leaving the last content step assembles the prompt and enters Review.
    pub fn next(&mut self) -> WizardResult<Advance> {
        match self.position {
            WizardPosition::ImageUpload => {
                if let Some(reason) = self.next_blocker() {
                    return Ok(reason.into());
                }
                Ok(self.move_to(WizardPosition::IntentSelection)?.into())
            }
            WizardPosition::ContentStep(index) => {
                if let Some(reason) = self.next_blocker() {
                    return Ok(reason.into());
                }
                if index < self.steps.len() {
                    Ok(self.move_to(WizardPosition::ContentStep(index + 1))?.into())
                } else {
                    Ok(self.enter_review()?.into())
                }
            }
            position => Err(WizardError::InvalidTransition {
                position,
                action: "go to the next step",
            }),
        }
    }

    pub fn back(&mut self) -> WizardResult<Advance> {
        match self.position {
            WizardPosition::IntentSelection => {
                let event = self.move_to(WizardPosition::ImageUpload)?;
                self.clear_answers();
                self.intent = None;
                Ok(event.into())
            }
            WizardPosition::TemplateSelection => {
                Ok(self.move_to(WizardPosition::IntentSelection)?.into())
            }
            WizardPosition::ContentStep(1) => {
                let offers_choice = self
                    .intent
                    .as_deref()
                    .and_then(|id| self.catalog.find_intent(id).ok())
                    .map(|intent| intent.templates.len() > 1)
                    .unwrap_or(false);
                let target = if offers_choice {
                    WizardPosition::TemplateSelection
                } else {
                    WizardPosition::IntentSelection
                };
                Ok(self.move_to(target)?.into())
            }
            WizardPosition::ContentStep(index) => {
                Ok(self.move_to(WizardPosition::ContentStep(index - 1))?.into())
            }
            WizardPosition::Review => {
                if matches!(self.mode, SessionMode::Edit { .. }) || self.steps.is_empty() {
                    return Ok(BlockReason::NoEarlierSteps.into());
                }
                self.pending_confirmation = None;
                Ok(self.move_to(WizardPosition::ContentStep(self.steps.len()))?.into())
            }
            position => Err(WizardError::InvalidTransition {
                position,
                action: "go back",
            }),
        }
    }

    /// Returns any session to a fresh ImageUpload
    pub fn reset(&mut self) -> WizardEvent {
        let previous = self.id;
        let (fresh, _) = Self::new(self.user_id, Arc::clone(&self.catalog));
        *self = Self {
            id: previous,
            created_at: self.created_at,
            ..fresh
        };
        tracing::debug!(session_id = %self.id, "wizard reset");
        WizardEvent::Reset {
            session_id: self.id,
        }
    }

    // ===== Confirmation & submission =====

    /// Opens the blocking confirmation that states the credit cost
    ///
    /// The requested quantity is clamped to what the balance allows.
    pub fn request_confirmation(
        &mut self,
        requested_samples: u32,
        available_credits: u32,
        policy: &CreditPolicy,
    ) -> WizardResult<Advance> {
        self.require(WizardPosition::Review, "confirm the ad")?;
        if self.review_prompt.trim().is_empty() {
            return Ok(BlockReason::EmptyPrompt.into());
        }

        let Some(confirmation) =
            Confirmation::for_request(policy, requested_samples, available_credits)
        else {
            return Ok(BlockReason::InsufficientCredits {
                available: available_credits,
                cost_per_sample: policy.cost_per_sample(),
            }
            .into());
        };

        let event = WizardEvent::ConfirmationRequested {
            session_id: self.id,
            num_samples: confirmation.num_samples,
            total_cost: confirmation.total_cost,
        };
        self.pending_confirmation = Some(confirmation);
        self.touch();
        Ok(event.into())
    }

    /// Request the generation service would receive right now
    pub fn build_submission(&self) -> Result<AdSubmission, BlockReason> {
        let confirmation = self
            .pending_confirmation
            .as_ref()
            .ok_or(BlockReason::NotConfirmed)?;
        if self.review_prompt.trim().is_empty() {
            return Err(BlockReason::EmptyPrompt);
        }
        if self.ad_name.trim().is_empty() {
            return Err(BlockReason::MissingAdName);
        }
        let ad_type = self
            .template
            .map(|t| t.as_str().to_string())
            .or_else(|| self.stored_ad_type.clone())
            .ok_or(BlockReason::UnknownAdType)?;
        if self.images.is_empty() && self.hosted_images.is_empty() {
            return Err(BlockReason::NoImages);
        }

        let dimensions = if self.dimensions_from_orientation {
            self.values
                .get(keys::ORIENTATION)
                .and_then(|o| o.parse::<Orientation>().ok())
                .map(|o| o.dimensions().to_string())
        } else {
            self.stored_dimensions.clone()
        };

        Ok(AdSubmission {
            images: self.images.clone(),
            image_urls: self.hosted_images.clone(),
            prompt: self.review_prompt.clone(),
            name: self.ad_name.trim().to_string(),
            brand_id: self.brand_id.clone(),
            num_samples: confirmation.num_samples,
            quality: self.quality,
            ad_type,
            dimensions,
        })
    }

    /// Hands the confirmed ad to the generation service
    ///
    /// Requires a pending confirmation and the user's acknowledgement of its
    /// cost. A failed call leaves the session untouched at Review, with the
    /// confirmation still pending, so the user can retry.
    pub async fn submit(
        &mut self,
        acknowledged: bool,
        user: &UserContext,
        generator: &dyn GenerationService,
    ) -> WizardResult<Advance> {
        self.require(WizardPosition::Review, "submit the ad")?;
        if self.pending_confirmation.is_none() {
            return Ok(BlockReason::NotConfirmed.into());
        }
        if !acknowledged {
            return Ok(BlockReason::NotAcknowledged.into());
        }
        let submission = match self.build_submission() {
            Ok(submission) => submission,
            Err(reason) => return Ok(reason.into()),
        };

        tracing::info!(
            session_id = %self.id,
            ad_type = %submission.ad_type,
            num_samples = submission.num_samples,
            images = submission.images.len() + submission.image_urls.len(),
            "submitting ad for generation"
        );

        let outcome = generator
            .generate(user, submission)
            .await
            .map_err(|e| {
                tracing::warn!(session_id = %self.id, "generation failed: {}", e);
                WizardError::SubmissionFailed(e)
            })?;

        self.move_to(WizardPosition::Submitted)?;
        self.pending_confirmation = None;
        let event = WizardEvent::Submitted {
            session_id: self.id,
            images: outcome.images.len(),
            credits_used: outcome.credits_used,
        };
        self.outcome = Some(outcome);
        Ok(event.into())
    }

    // ===== Getters =====

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn catalog(&self) -> &TemplateCatalog {
        &self.catalog
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn position(&self) -> WizardPosition {
        self.position
    }

    pub fn values(&self) -> &ValueBag {
        &self.values
    }

    pub fn ad_name(&self) -> &str {
        &self.ad_name
    }

    pub fn brand_id(&self) -> Option<&str> {
        self.brand_id.as_deref()
    }

    pub fn quality(&self) -> Option<Quality> {
        self.quality
    }

    pub fn intent(&self) -> Option<&str> {
        self.intent.as_deref()
    }

    pub fn template(&self) -> Option<TemplateId> {
        self.template
    }

    /// Resolved content steps of the chosen template
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Step shown at the current position, if it is a content step
    pub fn current_step(&self) -> Option<&Step> {
        match self.position {
            WizardPosition::ContentStep(index) => self.steps.get(index - 1),
            _ => None,
        }
    }

    pub fn images(&self) -> &[ImageBlob] {
        &self.images
    }

    /// Preview handles of local uploads, then hosted sources, then results
    pub fn image_previews(&self) -> Vec<String> {
        self.images
            .iter()
            .map(|image| image.handle().to_string())
            .chain(self.hosted_images.iter().cloned())
            .chain(self.result_images.iter().cloned())
            .collect()
    }

    /// Answers of every content step, with option values shown as labels
    pub fn review_summary(&self) -> Vec<ReviewLine> {
        self.steps
            .iter()
            .flat_map(|step| {
                step.fields
                    .iter()
                    .filter(|field| field.is_visible(&self.values))
                    .filter_map(move |field| {
                        let raw = self.values.get(&field.name)?;
                        if raw.trim().is_empty() {
                            return None;
                        }
                        Some(ReviewLine {
                            step: step.title.clone(),
                            label: field.label.clone(),
                            value: field.display_value(raw).to_string(),
                        })
                    })
            })
            .collect()
    }

    pub fn review_prompt(&self) -> &str {
        &self.review_prompt
    }

    pub fn pending_confirmation(&self) -> Option<&Confirmation> {
        self.pending_confirmation.as_ref()
    }

    pub fn outcome(&self) -> Option<&GenerationOutcome> {
        self.outcome.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    // ===== Internals =====

    fn require(&self, expected: WizardPosition, action: &'static str) -> WizardResult<()> {
        if self.position == expected {
            Ok(())
        } else {
            Err(WizardError::InvalidTransition {
                position: self.position,
                action,
            })
        }
    }

    fn require_open(&self, action: &'static str) -> WizardResult<()> {
        if self.position.is_terminal() {
            return Err(WizardError::InvalidTransition {
                position: self.position,
                action,
            });
        }
        Ok(())
    }

    fn move_to(&mut self, next: WizardPosition) -> WizardResult<WizardEvent> {
        let from = self.position;
        if !from.can_transition_to(next) {
            return Err(WizardError::InvalidTransition {
                position: from,
                action: "move there",
            });
        }

        self.position = next;
        self.touch();
        tracing::debug!(session_id = %self.id, %from, to = %next, "wizard moved");

        Ok(WizardEvent::Moved {
            session_id: self.id,
            from,
            to: next,
        })
    }

    fn apply_template(&mut self, catalog: &TemplateCatalog, template: TemplateId) -> WizardResult<()> {
        self.steps = catalog.content_steps(template)?;
        self.template = Some(template);
        self.values.set(keys::TEMPLATE, template.as_str());
        Ok(())
    }

    fn clear_answers(&mut self) {
        self.values.reset();
        self.steps.clear();
        self.template = None;
        self.review_prompt.clear();
        self.pending_confirmation = None;
    }

    fn enter_review(&mut self) -> WizardResult<WizardEvent> {
        let catalog = Arc::clone(&self.catalog);
        let template_id = self.template.ok_or(WizardError::InvalidTransition {
            position: self.position,
            action: "review without a template",
        })?;
        let template = catalog.get_template(template_id)?;

        self.review_prompt = prompt::assemble(template, &self.values);
        self.move_to(WizardPosition::Review)?;

        Ok(WizardEvent::PromptAssembled {
            session_id: self.id,
            template: template_id,
            prompt_chars: self.review_prompt.chars().count(),
        })
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    fn catalog() -> Arc<TemplateCatalog> {
        Arc::new(TemplateCatalog::builtin())
    }

    fn image() -> ImageBlob {
        ImageBlob::new("mug.png", "image/png", vec![0x89, 0x50, 0x4e, 0x47]).unwrap()
    }

    fn at_intent_selection() -> WizardSession {
        let (mut session, _) = WizardSession::new(Uuid::new_v4(), catalog());
        session.add_image(image()).unwrap();
        session.next().unwrap();
        session
    }

    fn fill_basics(session: &mut WizardSession) {
        session.set_ad_name("Spring launch").unwrap();
        session.set_value(keys::PRODUCT_NAME, "Aurora Mug").unwrap();
        session
            .set_value(keys::PRODUCT_DESCRIPTION, "a speckled ceramic mug")
            .unwrap();
    }

    /// Walks the styled-product template through to Review
    fn at_review() -> WizardSession {
        let mut session = at_intent_selection();
        session.select_intent("styled-shot").unwrap();
        fill_basics(&mut session);
        session.next().unwrap();
        session.set_value("backdrop", "a soft pastel gradient").unwrap();
        session.set_value("lighting", "natural window light").unwrap();
        session.next().unwrap();
        session.set_value("colorPalette", "monochrome").unwrap();
        session.next().unwrap();
        assert_eq!(session.position(), WizardPosition::Review);
        session
    }

    struct RecordingGenerator {
        result: Result<GenerationOutcome, String>,
        calls: Mutex<Vec<AdSubmission>>,
    }

    impl RecordingGenerator {
        fn succeeding() -> Self {
            Self {
                result: Ok(GenerationOutcome {
                    images: vec!["https://cdn.example.com/r1.png".to_string()],
                    credits_used: 2,
                }),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                result: Err(message.to_string()),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl GenerationService for RecordingGenerator {
        async fn generate(
            &self,
            _user: &UserContext,
            submission: AdSubmission,
        ) -> Result<GenerationOutcome, String> {
            self.calls.lock().unwrap().push(submission);
            self.result.clone()
        }
    }

    fn user() -> UserContext {
        UserContext::new(Uuid::new_v4(), "token")
    }

    #[test]
    fn new_session_starts_at_image_upload_with_defaults() {
        let (session, event) = WizardSession::new(Uuid::new_v4(), catalog());

        assert_eq!(session.position(), WizardPosition::ImageUpload);
        assert_eq!(session.values(), &ValueBag::with_defaults());
        assert_eq!(session.mode(), SessionMode::Fresh);
        assert_eq!(event.session_id(), session.id());
    }

    #[test]
    fn next_without_images_is_blocked_not_an_error() {
        let (mut session, _) = WizardSession::new(Uuid::new_v4(), catalog());

        let advance = session.next().unwrap();

        assert_eq!(
            advance,
            Advance::Blocked {
                reason: BlockReason::NoImages
            }
        );
        assert_eq!(session.position(), WizardPosition::ImageUpload);
    }

    #[test]
    fn at_most_four_images() {
        let (mut session, _) = WizardSession::new(Uuid::new_v4(), catalog());
        for _ in 0..MAX_IMAGES {
            session.add_image(image()).unwrap();
        }
        assert!(matches!(
            session.add_image(image()),
            Err(WizardError::TooManyImages { max: 4 })
        ));
    }

    #[test]
    fn remove_image_by_handle() {
        let (mut session, _) = WizardSession::new(Uuid::new_v4(), catalog());
        let blob = image();
        let handle = blob.handle().to_string();
        session.add_image(blob).unwrap();

        session.remove_image(&handle).unwrap();

        assert!(session.images().is_empty());
        assert!(matches!(
            session.remove_image(&handle),
            Err(WizardError::UnknownImage(_))
        ));
    }

    #[test]
    fn single_template_intent_skips_template_selection() {
        let mut session = at_intent_selection();

        let event = session.select_intent("styled-shot").unwrap();

        assert_eq!(session.position(), WizardPosition::ContentStep(1));
        assert_eq!(session.template(), Some(TemplateId::StyledProduct));
        assert!(matches!(
            event,
            WizardEvent::IntentSelected {
                auto_selected: Some(TemplateId::StyledProduct),
                ..
            }
        ));
        assert_eq!(session.current_step().unwrap().title, "Product Basics");
    }

    #[test]
    fn multi_template_intent_goes_to_template_selection() {
        let mut session = at_intent_selection();

        session.select_intent("showcase-product").unwrap();
        assert_eq!(session.position(), WizardPosition::TemplateSelection);
        assert!(session.steps().is_empty());

        session.select_template(TemplateId::StyledProduct).unwrap();

        let expected: Vec<Step> = session
            .catalog()
            .get_steps_for_template(TemplateId::StyledProduct)
            .unwrap()
            .into_iter()
            .filter(|s| s.step > 1)
            .collect();
        assert_eq!(session.position(), WizardPosition::ContentStep(1));
        assert_eq!(session.steps(), expected.as_slice());
        assert_eq!(session.values().get(keys::TEMPLATE), Some("styled-product"));
    }

    #[test]
    fn template_outside_intent_is_rejected() {
        let mut session = at_intent_selection();
        session.select_intent("showcase-product").unwrap();

        let result = session.select_template(TemplateId::FlatLay);

        assert!(matches!(result, Err(WizardError::TemplateNotOffered { .. })));
        assert_eq!(session.position(), WizardPosition::TemplateSelection);
    }

    #[test]
    fn unknown_intent_fails_loudly() {
        let mut session = at_intent_selection();
        assert!(matches!(
            session.select_intent("make-it-pop"),
            Err(WizardError::Catalog(_))
        ));
    }

    #[test]
    fn selecting_intent_resets_answers() {
        let mut session = at_intent_selection();
        session.select_intent("styled-shot").unwrap();
        session.set_value(keys::PRODUCT_NAME, "Aurora Mug").unwrap();
        session.set_value(keys::ORIENTATION, "square").unwrap();

        session.back().unwrap();
        assert_eq!(session.position(), WizardPosition::IntentSelection);
        session.select_intent("flat-lay").unwrap();

        assert_eq!(session.values().get(keys::PRODUCT_NAME), None);
        assert_eq!(session.values().get(keys::ORIENTATION), Some("portrait"));
        assert_eq!(session.template(), Some(TemplateId::FlatLay));
    }

    #[test]
    fn content_step_requires_fields_and_ad_name() {
        let mut session = at_intent_selection();
        session.select_intent("styled-shot").unwrap();

        let advance = session.next().unwrap();
        assert!(matches!(
            advance,
            Advance::Blocked {
                reason: BlockReason::IncompleteStep { .. }
            }
        ));

        session.set_value(keys::PRODUCT_NAME, "Aurora Mug").unwrap();
        session.set_value(keys::PRODUCT_DESCRIPTION, "ceramic").unwrap();
        assert_eq!(
            session.next().unwrap(),
            Advance::Blocked {
                reason: BlockReason::MissingAdName
            }
        );

        session.set_ad_name("Spring launch").unwrap();
        assert!(!session.next().unwrap().is_blocked());
        assert_eq!(session.position(), WizardPosition::ContentStep(2));
    }

    #[test]
    fn last_step_assembles_prompt_into_review() {
        let mut session = at_intent_selection();
        session.select_intent("styled-shot").unwrap();
        fill_basics(&mut session);
        session.set_value(keys::REFERENCE_INTENT, "style-inspiration").unwrap();
        session.next().unwrap();
        session.set_value("backdrop", "a soft pastel gradient").unwrap();
        session.set_value("lighting", "natural window light").unwrap();
        session.next().unwrap();
        session.set_value("colorPalette", "monochrome").unwrap();
        session
            .set_value(keys::EXTRA_INSTRUCTIONS, "No text in the image.")
            .unwrap();

        let advance = session.next().unwrap();

        assert!(matches!(
            advance.event(),
            Some(WizardEvent::PromptAssembled {
                template: TemplateId::StyledProduct,
                ..
            })
        ));
        assert_eq!(session.position(), WizardPosition::Review);
        let prompt = session.review_prompt();
        assert!(prompt.starts_with("A high-end styled product shot of Aurora Mug"));
        assert!(prompt.contains("Reference Image Instructions:"));
        assert!(prompt.ends_with("Extra instructions:\nNo text in the image."));
    }

    #[test]
    fn back_from_first_step_depends_on_intent() {
        let mut session = at_intent_selection();
        session.select_intent("showcase-product").unwrap();
        session.select_template(TemplateId::ProductInEnvironment).unwrap();
        session.back().unwrap();
        assert_eq!(session.position(), WizardPosition::TemplateSelection);
        session.back().unwrap();
        assert_eq!(session.position(), WizardPosition::IntentSelection);

        session.select_intent("flat-lay").unwrap();
        session.back().unwrap();
        assert_eq!(session.position(), WizardPosition::IntentSelection);
    }

    #[test]
    fn back_to_image_upload_resets_answers() {
        let mut session = at_intent_selection();
        session.select_intent("flat-lay").unwrap();
        session.set_value(keys::PRODUCT_NAME, "Aurora Mug").unwrap();
        session.back().unwrap();

        session.back().unwrap();

        assert_eq!(session.position(), WizardPosition::ImageUpload);
        assert_eq!(session.values(), &ValueBag::with_defaults());
        assert!(session.steps().is_empty());
        assert_eq!(session.images().len(), 1);
    }

    #[test]
    fn back_from_review_returns_to_last_step() {
        let mut session = at_review();
        let last = session.steps().len();

        session.back().unwrap();

        assert_eq!(session.position(), WizardPosition::ContentStep(last));
    }

    #[test]
    fn next_is_invalid_at_selection_screens() {
        let mut session = at_intent_selection();
        assert!(matches!(
            session.next(),
            Err(WizardError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn edit_mode_hydrates_at_review() {
        let ad = ExistingAd {
            id: Uuid::new_v4(),
            prompt: "X".to_string(),
            original_image_urls: vec!["a.png".to_string()],
            result_urls: vec!["b.png".to_string()],
            name: Some("Old ad".to_string()),
            brand_id: Some("brand-1".to_string()),
            ad_type: Some("flat-lay".to_string()),
            dimensions: Some("1536x1024".to_string()),
        };

        let (mut session, event) = WizardSession::hydrate(Uuid::new_v4(), catalog(), &ad);

        assert_eq!(session.position(), WizardPosition::Review);
        assert_eq!(session.image_previews(), vec!["a.png", "b.png"]);
        assert_eq!(session.review_prompt(), "X");
        assert_eq!(session.template(), Some(TemplateId::FlatLay));
        assert_eq!(session.values().get(keys::ORIENTATION), Some("landscape"));
        assert_eq!(session.mode(), SessionMode::Edit { ad_id: ad.id });
        assert!(matches!(event, WizardEvent::Hydrated { .. }));

        assert_eq!(
            session.back().unwrap(),
            Advance::Blocked {
                reason: BlockReason::NoEarlierSteps
            }
        );
    }

    #[test]
    fn confirmation_clamps_quantity_and_states_cost() {
        let mut session = at_review();
        let policy = CreditPolicy::new(2).unwrap();

        let advance = session.request_confirmation(3, 5, &policy).unwrap();

        assert!(!advance.is_blocked());
        let confirmation = session.pending_confirmation().unwrap();
        assert_eq!(confirmation.num_samples, 2);
        assert_eq!(confirmation.total_cost, 4);
    }

    #[test]
    fn confirmation_blocked_without_credits_or_prompt() {
        let mut session = at_review();
        let policy = CreditPolicy::new(2).unwrap();

        assert_eq!(
            session.request_confirmation(1, 1, &policy).unwrap(),
            Advance::Blocked {
                reason: BlockReason::InsufficientCredits {
                    available: 1,
                    cost_per_sample: 2
                }
            }
        );

        session.edit_review_prompt("   ").unwrap();
        assert_eq!(
            session.request_confirmation(1, 10, &policy).unwrap(),
            Advance::Blocked {
                reason: BlockReason::EmptyPrompt
            }
        );
        assert!(session.pending_confirmation().is_none());
    }

    #[tokio::test]
    async fn submit_requires_acknowledged_confirmation() {
        let mut session = at_review();
        let generator = RecordingGenerator::succeeding();

        let advance = session.submit(true, &user(), &generator).await.unwrap();
        assert_eq!(
            advance,
            Advance::Blocked {
                reason: BlockReason::NotConfirmed
            }
        );

        let policy = CreditPolicy::new(1).unwrap();
        session.request_confirmation(2, 10, &policy).unwrap();
        let advance = session.submit(false, &user(), &generator).await.unwrap();
        assert_eq!(
            advance,
            Advance::Blocked {
                reason: BlockReason::NotAcknowledged
            }
        );
        assert!(generator.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn successful_submission_is_terminal() {
        let mut session = at_review();
        session.edit_review_prompt("Edited prompt").unwrap();
        session.set_brand_id(Some("brand-7".to_string())).unwrap();
        let generator = RecordingGenerator::succeeding();
        let policy = CreditPolicy::new(1).unwrap();
        session.request_confirmation(2, 10, &policy).unwrap();

        let advance = session.submit(true, &user(), &generator).await.unwrap();

        assert!(matches!(
            advance.event(),
            Some(WizardEvent::Submitted { credits_used: 2, .. })
        ));
        assert_eq!(session.position(), WizardPosition::Submitted);
        assert_eq!(session.outcome().unwrap().images.len(), 1);

        let calls = generator.calls.lock().unwrap();
        let sent = &calls[0];
        assert_eq!(sent.prompt, "Edited prompt");
        assert_eq!(sent.name, "Spring launch");
        assert_eq!(sent.brand_id.as_deref(), Some("brand-7"));
        assert_eq!(sent.num_samples, 2);
        assert_eq!(sent.ad_type, "styled-product");
        assert_eq!(sent.dimensions.as_deref(), Some("1024x1536"));
        assert_eq!(sent.images.len(), 1);
        drop(calls);

        assert!(session.set_value(keys::PRODUCT_NAME, "Other").is_err());
    }

    #[tokio::test]
    async fn failed_submission_preserves_state() {
        let mut session = at_review();
        let generator = RecordingGenerator::failing("Insufficient credits");
        let policy = CreditPolicy::new(1).unwrap();
        session.request_confirmation(1, 10, &policy).unwrap();
        let prompt = session.review_prompt().to_string();

        let err = session.submit(true, &user(), &generator).await.unwrap_err();

        assert_eq!(err.to_string(), "generation failed: Insufficient credits");
        assert_eq!(session.position(), WizardPosition::Review);
        assert_eq!(session.review_prompt(), prompt);
        assert!(session.pending_confirmation().is_some());
    }

    #[tokio::test]
    async fn edit_mode_submission_uses_hosted_images() {
        let ad = ExistingAd {
            id: Uuid::new_v4(),
            prompt: "X".to_string(),
            original_image_urls: vec!["a.png".to_string()],
            result_urls: vec!["b.png".to_string()],
            name: Some("Old ad".to_string()),
            brand_id: None,
            ad_type: Some("seasonal-banner".to_string()),
            dimensions: None,
        };
        let (mut session, _) = WizardSession::hydrate(Uuid::new_v4(), catalog(), &ad);
        let generator = RecordingGenerator::succeeding();
        session
            .request_confirmation(1, 5, &CreditPolicy::new(1).unwrap())
            .unwrap();

        session.submit(true, &user(), &generator).await.unwrap();

        let calls = generator.calls.lock().unwrap();
        assert_eq!(calls[0].image_urls, vec!["a.png"]);
        assert!(calls[0].images.is_empty());
        assert_eq!(calls[0].ad_type, "seasonal-banner");
        assert_eq!(calls[0].dimensions, None);
    }

    fn reopened_with_dimensions(dimensions: &str) -> WizardSession {
        let ad = ExistingAd {
            id: Uuid::new_v4(),
            prompt: "X".to_string(),
            original_image_urls: vec!["a.png".to_string()],
            result_urls: Vec::new(),
            name: Some("Old ad".to_string()),
            brand_id: None,
            ad_type: Some("flat-lay".to_string()),
            dimensions: Some(dimensions.to_string()),
        };
        let (mut session, _) = WizardSession::hydrate(Uuid::new_v4(), catalog(), &ad);
        session
            .request_confirmation(1, 5, &CreditPolicy::new(1).unwrap())
            .unwrap();
        session
    }

    #[test]
    fn edit_mode_keeps_stored_dimensions() {
        let session = reopened_with_dimensions("1792x1024");

        let submission = session.build_submission().unwrap();

        assert_eq!(submission.dimensions.as_deref(), Some("1792x1024"));
    }

    #[test]
    fn edit_mode_orientation_change_replaces_dimensions() {
        let mut session = reopened_with_dimensions("1792x1024");

        session.set_value(keys::ORIENTATION, "square").unwrap();

        let submission = session.build_submission().unwrap();
        assert_eq!(submission.dimensions.as_deref(), Some("1024x1024"));
    }

    #[test]
    fn review_summary_shows_option_labels() {
        let session = at_review();

        let summary = session.review_summary();

        let lighting = summary.iter().find(|l| l.label == "Lighting").unwrap();
        assert_eq!(lighting.value, "Natural");
        assert_eq!(lighting.step, "Styling");
        assert!(summary.iter().all(|l| l.label != "Accent props"));
    }

    #[test]
    fn reset_returns_to_fresh_upload() {
        let mut session = at_review();
        let id = session.id();

        let event = session.reset();

        assert_eq!(event, WizardEvent::Reset { session_id: id });
        assert_eq!(session.id(), id);
        assert_eq!(session.position(), WizardPosition::ImageUpload);
        assert!(session.images().is_empty());
        assert_eq!(session.values(), &ValueBag::with_defaults());
        assert_eq!(session.ad_name(), "");
    }
}
