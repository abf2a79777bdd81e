// ABOUTME: Health and status endpoints

use axum::response::IntoResponse;
use serde_json::json;

use proposalpilot_api::response::ok;

pub async fn health_check() -> impl IntoResponse {
    ok(json!({ "status": "ok" }))
}

pub async fn status_check() -> impl IntoResponse {
    ok(json!({
        "status": "ok",
        "name": "proposalpilot",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
