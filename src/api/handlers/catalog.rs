use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};

use crate::api::errors::ApiError;
use crate::api::state::AppState;
use crate::domain::catalog::{CatalogError, Intent, Step, TemplateConfig, TemplateId};

/// Catalog entry without its steps
#[derive(Debug, Serialize)]
pub struct TemplateSummary {
    pub id: TemplateId,
    pub name: &'static str,
    pub description: &'static str,
    pub content_steps: usize,
}

impl From<&TemplateConfig> for TemplateSummary {
    fn from(template: &TemplateConfig) -> Self {
        Self {
            id: template.id,
            name: template.name,
            description: template.description,
            // Product Basics plus the template's own steps
            content_steps: template.steps.len() + 1,
        }
    }
}

/// Liveness probe
///
/// GET /health
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Intents with the templates each one offers
///
/// GET /api/intents
pub async fn list_intents(State(state): State<AppState>) -> Json<Vec<Intent>> {
    Json(state.catalog.intents().to_vec())
}

/// GET /api/templates
pub async fn list_templates(State(state): State<AppState>) -> Json<Vec<TemplateSummary>> {
    Json(
        state
            .catalog
            .templates()
            .iter()
            .map(TemplateSummary::from)
            .collect(),
    )
}

/// Full ordered step list of one template, selection step included
///
/// GET /api/templates/:id/steps
pub async fn get_template_steps(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Step>>, ApiError> {
    let template: TemplateId = id
        .parse()
        .map_err(|_| CatalogError::template_not_found(&id))?;

    Ok(Json(state.catalog.get_steps_for_template(template)?))
}
