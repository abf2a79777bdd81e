// ABOUTME: HTTP request handlers for user records
// ABOUTME: Registration and lookup only; authentication is out of scope

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use tracing::info;

use proposalpilot_proposals::{CreateUserInput, DbState};

use crate::response::{bad_request, created_or_internal_error, ok_or_not_found};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub email: String,
    pub name: String,
    pub company: Option<String>,
    pub default_hourly_rate: Option<f64>,
}

/// Register a user record
pub async fn create_user(
    State(db): State<DbState>,
    Json(request): Json<CreateUserRequest>,
) -> impl IntoResponse {
    info!("Creating user: {}", request.email);

    if request.email.trim().is_empty() || !request.email.contains('@') {
        return bad_request("A valid email is required", "Invalid email");
    }

    if request.name.trim().is_empty() {
        return bad_request("Name cannot be empty", "Invalid name");
    }

    let result = db
        .user_storage
        .create(CreateUserInput {
            email: request.email,
            name: request.name,
            company: request.company,
            default_hourly_rate: request.default_hourly_rate,
        })
        .await;

    created_or_internal_error(result, "Failed to create user")
}

/// Get a user by id
pub async fn get_user(
    State(db): State<DbState>,
    Path(user_id): Path<String>,
) -> impl IntoResponse {
    info!("Getting user: {}", user_id);

    let result = db.user_storage.get(&user_id).await;
    ok_or_not_found(result, "User not found")
}
