// ABOUTME: Response envelope and helper combinators for API handlers
// ABOUTME: { success, data } on success, { success, error, message } on failure

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

pub fn ok<T: Serialize>(data: T) -> Response {
    (
        StatusCode::OK,
        Json(ApiResponse {
            success: true,
            data: Some(data),
            error: None,
            message: None,
        }),
    )
        .into_response()
}

pub fn created<T: Serialize>(data: T) -> Response {
    (
        StatusCode::CREATED,
        Json(ApiResponse {
            success: true,
            data: Some(data),
            error: None,
            message: None,
        }),
    )
        .into_response()
}

fn failure(status: StatusCode, error: String, message: &str) -> Response {
    (
        status,
        Json(ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(error),
            message: Some(message.to_string()),
        }),
    )
        .into_response()
}

pub fn bad_request(error: impl std::fmt::Display, message: &str) -> Response {
    failure(StatusCode::BAD_REQUEST, error.to_string(), message)
}

pub fn not_found(message: &str) -> Response {
    failure(StatusCode::NOT_FOUND, message.to_string(), message)
}

pub fn internal_error(err: impl std::fmt::Display, message: &str) -> Response {
    error!("{}: {}", message, err);
    failure(StatusCode::INTERNAL_SERVER_ERROR, err.to_string(), message)
}

/// 200 with the value, or 500 with `context` on error
pub fn ok_or_internal_error<T: Serialize, E: std::fmt::Display>(
    result: Result<T, E>,
    context: &str,
) -> Response {
    match result {
        Ok(data) => ok(data),
        Err(e) => internal_error(e, context),
    }
}

/// 201 with the value, or 500 with `context` on error
pub fn created_or_internal_error<T: Serialize, E: std::fmt::Display>(
    result: Result<T, E>,
    context: &str,
) -> Response {
    match result {
        Ok(data) => created(data),
        Err(e) => internal_error(e, context),
    }
}

/// 200 with the value, 404 when the lookup came back empty, 500 on error
pub fn ok_or_not_found<T: Serialize, E: std::fmt::Display>(
    result: Result<Option<T>, E>,
    message: &str,
) -> Response {
    match result {
        Ok(Some(data)) => ok(data),
        Ok(None) => not_found(message),
        Err(e) => internal_error(e, message),
    }
}
