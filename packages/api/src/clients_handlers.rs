// ABOUTME: HTTP request handlers for client records
// ABOUTME: CRUD scoped to the requesting user

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use tracing::info;

use proposalpilot_proposals::{CreateClientInput, DbState, UpdateClientInput};

use crate::extract::RequesterId;
use crate::response::{
    bad_request, created_or_internal_error, internal_error, not_found, ok, ok_or_internal_error,
    ok_or_not_found,
};

/// List the requester's clients
pub async fn list_clients(
    State(db): State<DbState>,
    RequesterId(user_id): RequesterId,
) -> impl IntoResponse {
    info!("Listing clients for user: {}", user_id);

    let result = db.client_storage.list(&user_id).await;
    ok_or_internal_error(result, "Failed to list clients")
}

/// Create a client
pub async fn create_client(
    State(db): State<DbState>,
    RequesterId(user_id): RequesterId,
    Json(request): Json<CreateClientInput>,
) -> impl IntoResponse {
    info!("Creating client '{}' for user: {}", request.name, user_id);

    if request.name.trim().is_empty() {
        return bad_request("Name cannot be empty", "Invalid client name");
    }

    let result = db.client_storage.create(&user_id, request).await;
    created_or_internal_error(result, "Failed to create client")
}

/// Get a client by id
pub async fn get_client(
    State(db): State<DbState>,
    RequesterId(user_id): RequesterId,
    Path(client_id): Path<String>,
) -> impl IntoResponse {
    info!("Getting client: {}", client_id);

    let result = db.client_storage.get(&user_id, &client_id).await;
    ok_or_not_found(result, "Client not found")
}

/// Update a client
pub async fn update_client(
    State(db): State<DbState>,
    RequesterId(user_id): RequesterId,
    Path(client_id): Path<String>,
    Json(request): Json<UpdateClientInput>,
) -> impl IntoResponse {
    info!("Updating client: {}", client_id);

    match db.client_storage.get(&user_id, &client_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return not_found("Client not found"),
        Err(e) => return internal_error(e, "Failed to update client"),
    }

    let result = db.client_storage.update(&user_id, &client_id, request).await;
    ok_or_internal_error(result, "Failed to update client")
}

/// Delete a client
pub async fn delete_client(
    State(db): State<DbState>,
    RequesterId(user_id): RequesterId,
    Path(client_id): Path<String>,
) -> impl IntoResponse {
    info!("Deleting client: {}", client_id);

    match db.client_storage.delete(&user_id, &client_id).await {
        Ok(true) => ok(()),
        Ok(false) => not_found("Client not found"),
        Err(e) => internal_error(e, "Failed to delete client"),
    }
}
