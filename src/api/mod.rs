// API layer module (adapters for controllers)
// Exposes the wizard over JSON; handlers stay thin and defer to the domain

pub mod errors;
pub mod handlers;
pub mod locks;
pub mod middleware;
pub mod state;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use handlers::{catalog, wizard};
pub use state::AppState;

/// Four full-size photos plus multipart overhead
const UPLOAD_LIMIT_BYTES: usize = 50 * 1024 * 1024;

/// Builds the application router
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(catalog::health_check))
        // Catalog routes
        .route("/api/intents", get(catalog::list_intents))
        .route("/api/templates", get(catalog::list_templates))
        .route("/api/templates/:id/steps", get(catalog::get_template_steps))
        // Wizard routes
        .route("/api/wizard/sessions", post(wizard::start_session))
        .route(
            "/api/wizard/sessions/edit/:ad_id",
            post(wizard::start_edit_session),
        )
        .route(
            "/api/wizard/sessions/:id",
            get(wizard::get_session).delete(wizard::delete_session),
        )
        .route("/api/wizard/sessions/:id/reset", post(wizard::reset_session))
        .route(
            "/api/wizard/sessions/:id/images",
            post(wizard::upload_images).layer(DefaultBodyLimit::max(UPLOAD_LIMIT_BYTES)),
        )
        .route(
            "/api/wizard/sessions/:id/images/:handle",
            delete(wizard::remove_image),
        )
        .route("/api/wizard/sessions/:id/values", put(wizard::update_values))
        .route("/api/wizard/sessions/:id/intent", post(wizard::select_intent))
        .route("/api/wizard/sessions/:id/template", post(wizard::select_template))
        .route("/api/wizard/sessions/:id/next", post(wizard::next_step))
        .route("/api/wizard/sessions/:id/back", post(wizard::previous_step))
        .route("/api/wizard/sessions/:id/prompt", put(wizard::edit_prompt))
        .route("/api/wizard/sessions/:id/quantity", get(wizard::quantity_bound))
        .route(
            "/api/wizard/sessions/:id/confirmation",
            post(wizard::request_confirmation),
        )
        .route("/api/wizard/sessions/:id/submit", post(wizard::submit))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Shared state
        .with_state(state)
}
