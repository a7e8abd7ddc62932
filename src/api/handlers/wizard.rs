use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tokio::sync::OwnedMutexGuard;
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::middleware::JwtAuth;
use crate::api::state::AppState;
use crate::domain::ad::{GenerationOutcome, Quality};
use crate::domain::catalog::{CatalogError, Step, TemplateId};
use crate::domain::credits::{Confirmation, QuantityBound};
use crate::domain::user::UserContext;
use crate::domain::wizard::{
    Advance, BlockReason, ImageBlob, ReviewLine, SessionMode, ValueBag, WizardEvent,
    WizardPosition, WizardSession,
};

// ===== DTOs =====

#[derive(Debug, Serialize)]
pub struct ImageView {
    pub handle: String,
    pub file_name: String,
    pub content_type: String,
    pub size: usize,
}

impl From<&ImageBlob> for ImageView {
    fn from(image: &ImageBlob) -> Self {
        Self {
            handle: image.handle().to_string(),
            file_name: image.file_name().to_string(),
            content_type: image.content_type().to_string(),
            size: image.len(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ConfirmationView {
    #[serde(flatten)]
    pub details: Confirmation,
    pub message: String,
}

/// Everything a client needs to render the current screen
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub id: Uuid,
    pub mode: SessionMode,
    pub position: WizardPosition,
    pub values: ValueBag,
    pub ad_name: String,
    pub brand_id: Option<String>,
    pub quality: Option<Quality>,
    pub intent: Option<String>,
    pub template: Option<TemplateId>,
    pub steps: Vec<Step>,
    pub current_step: Option<Step>,
    pub images: Vec<ImageView>,
    pub previews: Vec<String>,
    pub next_blocker: Option<BlockReason>,
    pub review_prompt: String,
    pub review_summary: Vec<ReviewLine>,
    pub confirmation: Option<ConfirmationView>,
    pub outcome: Option<GenerationOutcome>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&WizardSession> for SessionView {
    fn from(session: &WizardSession) -> Self {
        Self {
            id: session.id(),
            mode: session.mode(),
            position: session.position(),
            values: session.values().clone(),
            ad_name: session.ad_name().to_string(),
            brand_id: session.brand_id().map(str::to_string),
            quality: session.quality(),
            intent: session.intent().map(str::to_string),
            template: session.template(),
            steps: session.steps().to_vec(),
            current_step: session.current_step().cloned(),
            images: session.images().iter().map(ImageView::from).collect(),
            previews: session.image_previews(),
            next_blocker: session.next_blocker(),
            review_prompt: session.review_prompt().to_string(),
            review_summary: session.review_summary(),
            confirmation: session.pending_confirmation().map(|c| ConfirmationView {
                details: c.clone(),
                message: c.message(),
            }),
            outcome: session.outcome().cloned(),
            created_at: session.created_at(),
            updated_at: session.updated_at(),
        }
    }
}

/// Reply of every session-changing route
#[derive(Debug, Serialize)]
pub struct WizardResponse {
    /// What the action did; absent for plain edits
    pub result: Option<Advance>,
    pub session: SessionView,
}

impl WizardResponse {
    fn new(result: Option<Advance>, session: &WizardSession) -> Self {
        Self {
            result,
            session: SessionView::from(session),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateValuesRequest {
    #[serde(default)]
    pub values: BTreeMap<String, String>,
    pub ad_name: Option<String>,
    /// Empty string clears the brand
    pub brand_id: Option<String>,
    pub quality: Option<Quality>,
}

#[derive(Debug, Deserialize)]
pub struct SelectIntentRequest {
    pub intent: String,
}

#[derive(Debug, Deserialize)]
pub struct SelectTemplateRequest {
    pub template: String,
}

#[derive(Debug, Deserialize)]
pub struct EditPromptRequest {
    pub prompt: String,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmationRequest {
    pub num_samples: u32,
}

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub acknowledged: bool,
}

// ===== Helpers =====

/// Loads a session the caller owns; other users' sessions do not exist
async fn load(state: &AppState, user: &UserContext, id: Uuid) -> Result<WizardSession, ApiError> {
    state
        .sessions
        .find_by_id(id)
        .await
        .map_err(|e| ApiError::internal_server_error(format!("Failed to load session: {}", e)))?
        .filter(|session| session.user_id() == user.user_id())
        .ok_or_else(|| ApiError::not_found(format!("Session not found: {}", id)))
}

/// Loads a session for a change, holding its lock until the guard drops
async fn load_for_update(
    state: &AppState,
    user: &UserContext,
    id: Uuid,
) -> Result<(OwnedMutexGuard<()>, WizardSession), ApiError> {
    let guard = state.session_locks.acquire(id).await;
    let session = load(state, user, id).await?;
    Ok((guard, session))
}

async fn save(state: &AppState, session: &WizardSession) -> Result<(), ApiError> {
    state
        .sessions
        .save(session)
        .await
        .map_err(|e| ApiError::internal_server_error(format!("Failed to save session: {}", e)))
}

fn log_event(event: &WizardEvent) {
    tracing::info!(session_id = %event.session_id(), event = ?event, "wizard event");
}

fn log_advance(advance: &Advance) {
    match advance {
        Advance::Moved { event } => log_event(event),
        Advance::Blocked { reason } => tracing::debug!(%reason, "wizard action blocked"),
    }
}

/// Saves and replies with the outcome of a gated action
async fn respond(
    state: &AppState,
    session: &WizardSession,
    advance: Advance,
) -> Result<(StatusCode, Json<WizardResponse>), ApiError> {
    log_advance(&advance);
    save(state, session).await?;

    let status = match &advance {
        Advance::Blocked {
            reason: BlockReason::InsufficientCredits { .. },
        } => StatusCode::PAYMENT_REQUIRED,
        _ => StatusCode::OK,
    };
    Ok((status, Json(WizardResponse::new(Some(advance), session))))
}

async fn respond_event(
    state: &AppState,
    session: &WizardSession,
    event: WizardEvent,
) -> Result<Json<WizardResponse>, ApiError> {
    log_event(&event);
    save(state, session).await?;
    Ok(Json(WizardResponse::new(Some(event.into()), session)))
}

// ===== Session lifecycle =====

/// Start a fresh wizard at image upload
///
/// POST /api/wizard/sessions
pub async fn start_session(
    State(state): State<AppState>,
    JwtAuth(user): JwtAuth,
) -> Result<(StatusCode, Json<WizardResponse>), ApiError> {
    let (session, event) = WizardSession::new(user.user_id(), state.catalog.clone());
    let Json(body) = respond_event(&state, &session, event).await?;
    Ok((StatusCode::CREATED, Json(body)))
}

/// Reopen an existing ad at Review
///
/// POST /api/wizard/sessions/edit/:ad_id
pub async fn start_edit_session(
    State(state): State<AppState>,
    JwtAuth(user): JwtAuth,
    Path(ad_id): Path<Uuid>,
) -> Result<(StatusCode, Json<WizardResponse>), ApiError> {
    let ad = state
        .ads
        .find_by_id(&user, ad_id)
        .await
        .map_err(|e| ApiError::bad_gateway(format!("Failed to load ad: {}", e)))?
        .ok_or_else(|| ApiError::not_found(format!("Ad not found: {}", ad_id)))?;

    let (session, event) = WizardSession::hydrate(user.user_id(), state.catalog.clone(), &ad);
    let Json(body) = respond_event(&state, &session, event).await?;
    Ok((StatusCode::CREATED, Json(body)))
}

/// GET /api/wizard/sessions/:id
pub async fn get_session(
    State(state): State<AppState>,
    JwtAuth(user): JwtAuth,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    let session = load(&state, &user, id).await?;
    Ok(Json(SessionView::from(&session)))
}

/// DELETE /api/wizard/sessions/:id
pub async fn delete_session(
    State(state): State<AppState>,
    JwtAuth(user): JwtAuth,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let (_guard, session) = load_for_update(&state, &user, id).await?;
    state
        .sessions
        .delete(session.id())
        .await
        .map_err(|e| ApiError::internal_server_error(format!("Failed to delete session: {}", e)))?;

    tracing::info!(session_id = %id, "wizard session discarded");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/wizard/sessions/:id/reset
pub async fn reset_session(
    State(state): State<AppState>,
    JwtAuth(user): JwtAuth,
    Path(id): Path<Uuid>,
) -> Result<Json<WizardResponse>, ApiError> {
    let (_guard, mut session) = load_for_update(&state, &user, id).await?;
    let event = session.reset();
    respond_event(&state, &session, event).await
}

// ===== Images =====

/// Upload one or more images as multipart file fields
///
/// POST /api/wizard/sessions/:id/images
pub async fn upload_images(
    State(state): State<AppState>,
    JwtAuth(user): JwtAuth,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<WizardResponse>, ApiError> {
    let (_guard, mut session) = load_for_update(&state, &user, id).await?;
    let mut last_event = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {}", e)))?
    {
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("Failed to read {}: {}", file_name, e)))?;

        let image = ImageBlob::new(file_name, content_type, data.to_vec())?;
        let event = session.add_image(image)?;
        log_event(&event);
        last_event = Some(event);
    }

    let event = last_event.ok_or_else(|| ApiError::bad_request("No image files in request"))?;
    save(&state, &session).await?;
    Ok(Json(WizardResponse::new(Some(event.into()), &session)))
}

/// DELETE /api/wizard/sessions/:id/images/:handle
pub async fn remove_image(
    State(state): State<AppState>,
    JwtAuth(user): JwtAuth,
    Path((id, handle)): Path<(Uuid, String)>,
) -> Result<Json<WizardResponse>, ApiError> {
    let (_guard, mut session) = load_for_update(&state, &user, id).await?;
    let event = session.remove_image(&handle)?;
    respond_event(&state, &session, event).await
}

// ===== Answers =====

/// Set field answers, the ad name, brand or quality
///
/// PUT /api/wizard/sessions/:id/values
pub async fn update_values(
    State(state): State<AppState>,
    JwtAuth(user): JwtAuth,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateValuesRequest>,
) -> Result<Json<WizardResponse>, ApiError> {
    let (_guard, mut session) = load_for_update(&state, &user, id).await?;

    for (name, value) in req.values {
        session.set_value(&name, value)?;
    }
    if let Some(ad_name) = req.ad_name {
        session.set_ad_name(ad_name)?;
    }
    if let Some(brand_id) = req.brand_id {
        session.set_brand_id(Some(brand_id))?;
    }
    if req.quality.is_some() {
        session.set_quality(req.quality)?;
    }

    save(&state, &session).await?;
    Ok(Json(WizardResponse::new(None, &session)))
}

/// POST /api/wizard/sessions/:id/intent
pub async fn select_intent(
    State(state): State<AppState>,
    JwtAuth(user): JwtAuth,
    Path(id): Path<Uuid>,
    Json(req): Json<SelectIntentRequest>,
) -> Result<Json<WizardResponse>, ApiError> {
    let (_guard, mut session) = load_for_update(&state, &user, id).await?;
    let event = session.select_intent(&req.intent)?;
    respond_event(&state, &session, event).await
}

/// POST /api/wizard/sessions/:id/template
pub async fn select_template(
    State(state): State<AppState>,
    JwtAuth(user): JwtAuth,
    Path(id): Path<Uuid>,
    Json(req): Json<SelectTemplateRequest>,
) -> Result<Json<WizardResponse>, ApiError> {
    let template: TemplateId = req
        .template
        .parse()
        .map_err(|_| CatalogError::template_not_found(&req.template))?;

    let (_guard, mut session) = load_for_update(&state, &user, id).await?;
    let event = session.select_template(template)?;
    respond_event(&state, &session, event).await
}

// ===== Navigation =====

/// POST /api/wizard/sessions/:id/next
pub async fn next_step(
    State(state): State<AppState>,
    JwtAuth(user): JwtAuth,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<WizardResponse>), ApiError> {
    let (_guard, mut session) = load_for_update(&state, &user, id).await?;
    let advance = session.next()?;
    respond(&state, &session, advance).await
}

/// POST /api/wizard/sessions/:id/back
pub async fn previous_step(
    State(state): State<AppState>,
    JwtAuth(user): JwtAuth,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<WizardResponse>), ApiError> {
    let (_guard, mut session) = load_for_update(&state, &user, id).await?;
    let advance = session.back()?;
    respond(&state, &session, advance).await
}

// ===== Review, confirmation, submission =====

/// PUT /api/wizard/sessions/:id/prompt
pub async fn edit_prompt(
    State(state): State<AppState>,
    JwtAuth(user): JwtAuth,
    Path(id): Path<Uuid>,
    Json(req): Json<EditPromptRequest>,
) -> Result<Json<WizardResponse>, ApiError> {
    let (_guard, mut session) = load_for_update(&state, &user, id).await?;
    session.edit_review_prompt(req.prompt)?;
    save(&state, &session).await?;
    Ok(Json(WizardResponse::new(None, &session)))
}

/// Range of the sample quantity control for the caller's balance
///
/// GET /api/wizard/sessions/:id/quantity
pub async fn quantity_bound(
    State(state): State<AppState>,
    JwtAuth(user): JwtAuth,
    Path(id): Path<Uuid>,
) -> Result<Json<QuantityBound>, ApiError> {
    load(&state, &user, id).await?;
    let available = available_credits(&state, &user).await?;
    Ok(Json(state.policy.quantity_bound(available)))
}

/// POST /api/wizard/sessions/:id/confirmation
pub async fn request_confirmation(
    State(state): State<AppState>,
    JwtAuth(user): JwtAuth,
    Path(id): Path<Uuid>,
    Json(req): Json<ConfirmationRequest>,
) -> Result<(StatusCode, Json<WizardResponse>), ApiError> {
    let (_guard, mut session) = load_for_update(&state, &user, id).await?;
    let available = available_credits(&state, &user).await?;
    let advance = session.request_confirmation(req.num_samples, available, &state.policy)?;
    respond(&state, &session, advance).await
}

/// Acknowledge the stated cost and generate
///
/// POST /api/wizard/sessions/:id/submit
pub async fn submit(
    State(state): State<AppState>,
    JwtAuth(user): JwtAuth,
    Path(id): Path<Uuid>,
    Json(req): Json<SubmitRequest>,
) -> Result<(StatusCode, Json<WizardResponse>), ApiError> {
    let (_guard, mut session) = load_for_update(&state, &user, id).await?;
    let advance = session
        .submit(req.acknowledged, &user, state.generator.as_ref())
        .await?;
    respond(&state, &session, advance).await
}

async fn available_credits(state: &AppState, user: &UserContext) -> Result<u32, ApiError> {
    state
        .credits
        .available_credits(user)
        .await
        .map_err(|e| ApiError::bad_gateway(format!("Failed to load credits: {}", e)))
}
