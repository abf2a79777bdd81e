// ABOUTME: HTTP request handlers for brief operations
// ABOUTME: CRUD plus the analyze endpoint driving the brief analyzer

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use tracing::info;

use proposalpilot_briefs::{
    BriefAnalyzer, BriefError, BriefStatus, CreateBriefInput, UpdateBriefInput,
};
use proposalpilot_proposals::DbState;

use crate::extract::RequesterId;
use crate::response::{
    bad_request, created_or_internal_error, internal_error, not_found, ok, ok_or_internal_error,
    ok_or_not_found,
};

/// List the requester's briefs
pub async fn list_briefs(
    State(db): State<DbState>,
    RequesterId(user_id): RequesterId,
) -> impl IntoResponse {
    info!("Listing briefs for user: {}", user_id);

    let result = db.brief_storage.list(&user_id).await;
    ok_or_internal_error(result, "Failed to list briefs")
}

/// Create a brief
pub async fn create_brief(
    State(db): State<DbState>,
    RequesterId(user_id): RequesterId,
    Json(request): Json<CreateBriefInput>,
) -> impl IntoResponse {
    info!("Creating brief '{}' for user: {}", request.title, user_id);

    if request.title.trim().is_empty() {
        return bad_request("Title cannot be empty", "Invalid brief title");
    }

    if request.raw_text.trim().is_empty() {
        return bad_request("Brief text cannot be empty", "Invalid brief text");
    }

    if let Some(client_id) = &request.client_id {
        match db.client_storage.get(&user_id, client_id).await {
            Ok(Some(_)) => {}
            Ok(None) => return not_found("Client not found"),
            Err(e) => return internal_error(e, "Failed to create brief"),
        }
    }

    let result = db.brief_storage.create(&user_id, request).await;
    created_or_internal_error(result, "Failed to create brief")
}

/// Get a brief by id
pub async fn get_brief(
    State(db): State<DbState>,
    RequesterId(user_id): RequesterId,
    Path(brief_id): Path<String>,
) -> impl IntoResponse {
    info!("Getting brief: {}", brief_id);

    let result = db.brief_storage.get(&user_id, &brief_id).await;
    ok_or_not_found(result, "Brief not found")
}

/// Update a brief. Only draft briefs are editable.
pub async fn update_brief(
    State(db): State<DbState>,
    RequesterId(user_id): RequesterId,
    Path(brief_id): Path<String>,
    Json(request): Json<UpdateBriefInput>,
) -> impl IntoResponse {
    info!("Updating brief: {}", brief_id);

    let existing = match db.brief_storage.get(&user_id, &brief_id).await {
        Ok(Some(brief)) => brief,
        Ok(None) => return not_found("Brief not found"),
        Err(e) => return internal_error(e, "Failed to update brief"),
    };

    if existing.status != BriefStatus::Draft {
        return bad_request(
            format!("Brief is {}; only draft briefs can be edited", existing.status),
            "Brief is not editable",
        );
    }

    let result = db.brief_storage.update(&user_id, &brief_id, request).await;
    ok_or_internal_error(result, "Failed to update brief")
}

/// Delete a brief
pub async fn delete_brief(
    State(db): State<DbState>,
    RequesterId(user_id): RequesterId,
    Path(brief_id): Path<String>,
) -> impl IntoResponse {
    info!("Deleting brief: {}", brief_id);

    match db.brief_storage.delete(&user_id, &brief_id).await {
        Ok(true) => ok(()),
        Ok(false) => not_found("Brief not found"),
        Err(e) => internal_error(e, "Failed to delete brief"),
    }
}

/// Run AI analysis on a draft brief
pub async fn analyze_brief(
    State(db): State<DbState>,
    RequesterId(user_id): RequesterId,
    Path(brief_id): Path<String>,
) -> impl IntoResponse {
    info!("Analyzing brief: {} for user: {}", brief_id, user_id);

    // Client name/industry feed the prompt as hints when the brief has a client
    let client = match db.brief_storage.get(&user_id, &brief_id).await {
        Ok(Some(brief)) => match &brief.client_id {
            Some(client_id) => db
                .client_storage
                .get(&user_id, client_id)
                .await
                .unwrap_or(None),
            None => None,
        },
        Ok(None) => return not_found("Brief not found"),
        Err(e) => return internal_error(e, "Failed to analyze brief"),
    };

    let analyzer = BriefAnalyzer::new(db.pool.clone(), db.ai.clone());
    let result = analyzer
        .analyze(
            &user_id,
            &brief_id,
            client.as_ref().map(|c| c.name.as_str()),
            client.as_ref().and_then(|c| c.industry.as_deref()),
        )
        .await;

    match result {
        Ok(brief) => ok(brief),
        Err(BriefError::NotFound(_)) => not_found("Brief not found"),
        Err(e @ BriefError::InvalidStatus { .. }) => {
            bad_request(e, "Brief is not ready for analysis")
        }
        Err(e) => internal_error(e, "Brief analysis failed"),
    }
}
