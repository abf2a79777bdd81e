// ABOUTME: HTTP request handlers for billing state
// ABOUTME: Read-only subscription and quota usage views; webhooks are out of scope

use axum::{extract::State, response::IntoResponse};
use tracing::info;

use proposalpilot_billing::QuotaGuard;
use proposalpilot_proposals::DbState;

use crate::extract::RequesterId;
use crate::response::{internal_error, ok, ok_or_internal_error};

/// Current subscription record, or null for free-tier users
pub async fn get_subscription(
    State(db): State<DbState>,
    RequesterId(user_id): RequesterId,
) -> impl IntoResponse {
    info!("Getting subscription for user: {}", user_id);

    match db.subscription_storage.get_by_user(&user_id).await {
        Ok(subscription) => ok(subscription),
        Err(e) => internal_error(e, "Failed to load subscription"),
    }
}

/// Current quota usage snapshot (plan, limit, used, reset date)
pub async fn get_usage(
    State(db): State<DbState>,
    RequesterId(user_id): RequesterId,
) -> impl IntoResponse {
    info!("Getting quota usage for user: {}", user_id);

    let guard = QuotaGuard::new(db.pool.clone());
    let result = guard.usage_snapshot(&user_id).await;
    ok_or_internal_error(result, "Failed to load usage")
}
