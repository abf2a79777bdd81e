// ABOUTME: HTTP API layer for ProposalPilot providing REST endpoints and routing
// ABOUTME: Integration layer that depends on all domain packages

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use proposalpilot_proposals::DbState;

pub mod ai_usage_handlers;
pub mod billing_handlers;
pub mod briefs_handlers;
pub mod clients_handlers;
pub mod extract;
pub mod proposals_handlers;
pub mod response;
pub mod templates_handlers;
pub mod users_handlers;

/// Creates the users API router
pub fn create_users_router() -> Router<DbState> {
    Router::new()
        .route("/", post(users_handlers::create_user))
        .route("/{user_id}", get(users_handlers::get_user))
}

/// Creates the clients API router
pub fn create_clients_router() -> Router<DbState> {
    Router::new()
        .route("/", get(clients_handlers::list_clients))
        .route("/", post(clients_handlers::create_client))
        .route("/{client_id}", get(clients_handlers::get_client))
        .route("/{client_id}", put(clients_handlers::update_client))
        .route("/{client_id}", delete(clients_handlers::delete_client))
}

/// Creates the briefs API router
pub fn create_briefs_router() -> Router<DbState> {
    Router::new()
        .route("/", get(briefs_handlers::list_briefs))
        .route("/", post(briefs_handlers::create_brief))
        .route("/{brief_id}", get(briefs_handlers::get_brief))
        .route("/{brief_id}", put(briefs_handlers::update_brief))
        .route("/{brief_id}", delete(briefs_handlers::delete_brief))
        .route("/{brief_id}/analyze", post(briefs_handlers::analyze_brief))
}

/// Creates the proposals API router (everything except generation)
pub fn create_proposals_router() -> Router<DbState> {
    Router::new()
        .route("/", get(proposals_handlers::list_proposals))
        .route("/{proposal_id}", get(proposals_handlers::get_proposal))
        .route("/{proposal_id}", put(proposals_handlers::update_proposal))
        .route("/{proposal_id}", delete(proposals_handlers::delete_proposal))
        .route(
            "/{proposal_id}/status",
            put(proposals_handlers::update_proposal_status),
        )
        .route(
            "/{proposal_id}/score",
            post(proposals_handlers::score_proposal),
        )
}

/// Creates the proposal generation router. Kept separate so the server can
/// wrap exactly this route with the quota middleware.
pub fn create_generation_router() -> Router<DbState> {
    Router::new().route("/generate", post(proposals_handlers::generate_proposal))
}

/// Creates the templates API router
pub fn create_templates_router() -> Router<DbState> {
    Router::new()
        .route("/", get(templates_handlers::list_templates))
        .route("/", post(templates_handlers::create_template))
        .route("/{template_id}", get(templates_handlers::get_template))
        .route("/{template_id}", put(templates_handlers::update_template))
        .route("/{template_id}", delete(templates_handlers::delete_template))
}

/// Creates the billing API router
pub fn create_billing_router() -> Router<DbState> {
    Router::new()
        .route("/subscription", get(billing_handlers::get_subscription))
        .route("/usage", get(billing_handlers::get_usage))
}

/// Creates the AI usage logs API router for cost tracking
pub fn create_ai_usage_router() -> Router<DbState> {
    Router::new()
        .route("/logs", get(ai_usage_handlers::list_logs))
        .route("/stats", get(ai_usage_handlers::get_stats))
}
