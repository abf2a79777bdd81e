// ABOUTME: HTTP request handlers for AI usage log operations
// ABOUTME: Per-user cost and token reporting

use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;

use proposalpilot_ai::UsageQuery;
use proposalpilot_proposals::DbState;

use crate::extract::RequesterId;
use crate::response::ok_or_internal_error;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListLogsQuery {
    pub operation: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// List the requester's AI usage logs with optional filtering
pub async fn list_logs(
    State(db): State<DbState>,
    RequesterId(user_id): RequesterId,
    Query(params): Query<ListLogsQuery>,
) -> impl IntoResponse {
    info!(
        "Listing AI usage logs (user: {}, operation: {:?})",
        user_id, params.operation
    );

    let query = UsageQuery {
        user_id: Some(user_id),
        operation: params.operation,
        start_date: params.start_date,
        end_date: params.end_date,
        limit: params.limit,
        offset: params.offset,
    };

    let result = db.usage_log_storage.list(query).await;
    ok_or_internal_error(result, "Failed to list AI usage logs")
}

/// Aggregate AI usage statistics for the requester
pub async fn get_stats(
    State(db): State<DbState>,
    RequesterId(user_id): RequesterId,
) -> impl IntoResponse {
    info!("Getting AI usage stats for user: {}", user_id);

    let result = db.usage_log_storage.stats(Some(&user_id)).await;
    ok_or_internal_error(result, "Failed to get AI usage stats")
}
