// ABOUTME: Server wiring for ProposalPilot
// ABOUTME: Router assembly with CORS and the quota middleware on the generate route

use axum::http::{HeaderValue, Method};
use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use proposalpilot_proposals::DbState;

pub mod config;
pub mod error;
pub mod health;
pub mod middleware;

pub use config::Config;
pub use error::AppError;

/// Assemble the application router. The quota middleware wraps exactly the
/// proposal generation route.
pub fn build_router(db: DbState, cors_origin: &str) -> anyhow::Result<Router> {
    let cors = CorsLayer::new()
        .allow_origin(cors_origin.parse::<HeaderValue>()?)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    let generation = proposalpilot_api::create_generation_router().route_layer(
        axum::middleware::from_fn_with_state(db.clone(), middleware::quota_middleware),
    );

    let app = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/status", get(health::status_check))
        .nest("/api/users", proposalpilot_api::create_users_router())
        .nest("/api/clients", proposalpilot_api::create_clients_router())
        .nest("/api/briefs", proposalpilot_api::create_briefs_router())
        .nest(
            "/api/proposals",
            proposalpilot_api::create_proposals_router().merge(generation),
        )
        .nest("/api/templates", proposalpilot_api::create_templates_router())
        .nest("/api/billing", proposalpilot_api::create_billing_router())
        .nest("/api/ai-usage", proposalpilot_api::create_ai_usage_router())
        .with_state(db)
        .layer(cors);

    Ok(app)
}
