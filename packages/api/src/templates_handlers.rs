// ABOUTME: HTTP request handlers for proposal template management
// ABOUTME: CRUD for user templates; system templates are read-only

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use tracing::info;

use proposalpilot_proposals::DbState;
use proposalpilot_templates::{CreateTemplateInput, TemplateError, UpdateTemplateInput};

use crate::extract::RequesterId;
use crate::response::{
    bad_request, created_or_internal_error, internal_error, not_found, ok, ok_or_internal_error,
    ok_or_not_found,
};

/// List system templates plus the requester's own
pub async fn list_templates(
    State(db): State<DbState>,
    RequesterId(user_id): RequesterId,
) -> impl IntoResponse {
    info!("Listing templates for user: {}", user_id);

    let result = db.template_storage.list(&user_id).await;
    ok_or_internal_error(result, "Failed to list templates")
}

/// Create a template
pub async fn create_template(
    State(db): State<DbState>,
    RequesterId(user_id): RequesterId,
    Json(request): Json<CreateTemplateInput>,
) -> impl IntoResponse {
    info!("Creating template '{}' for user: {}", request.name, user_id);

    if request.name.trim().is_empty() {
        return bad_request("Name cannot be empty", "Invalid template name");
    }

    let result = db.template_storage.create(&user_id, request).await;
    created_or_internal_error(result, "Failed to create template")
}

/// Get a template by id
pub async fn get_template(
    State(db): State<DbState>,
    RequesterId(user_id): RequesterId,
    Path(template_id): Path<String>,
) -> impl IntoResponse {
    info!("Getting template: {}", template_id);

    let result = db.template_storage.get(&user_id, &template_id).await;
    ok_or_not_found(result, "Template not found")
}

/// Update a user-owned template
pub async fn update_template(
    State(db): State<DbState>,
    RequesterId(user_id): RequesterId,
    Path(template_id): Path<String>,
    Json(request): Json<UpdateTemplateInput>,
) -> impl IntoResponse {
    info!("Updating template: {}", template_id);

    match db
        .template_storage
        .update(&user_id, &template_id, request)
        .await
    {
        Ok(template) => ok(template),
        Err(TemplateError::NotFound(_)) => not_found("Template not found"),
        Err(e @ TemplateError::SystemImmutable) => {
            bad_request(e, "System templates cannot be modified")
        }
        Err(e) => internal_error(e, "Failed to update template"),
    }
}

/// Delete a user-owned template
pub async fn delete_template(
    State(db): State<DbState>,
    RequesterId(user_id): RequesterId,
    Path(template_id): Path<String>,
) -> impl IntoResponse {
    info!("Deleting template: {}", template_id);

    match db.template_storage.delete(&user_id, &template_id).await {
        Ok(true) => ok(()),
        Ok(false) => not_found("Template not found"),
        Err(e @ TemplateError::SystemImmutable) => {
            bad_request(e, "System templates cannot be deleted")
        }
        Err(e) => internal_error(e, "Failed to delete template"),
    }
}
