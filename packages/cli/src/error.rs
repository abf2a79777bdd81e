// ABOUTME: Application error type for the server
// ABOUTME: Maps domain failures to HTTP status codes and a structured JSON body

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use uuid::Uuid;

/// Main application error type returned by middleware and fallbacks
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Resource not found")]
    NotFound,

    #[error("Proposal quota exceeded")]
    QuotaExceeded {
        limit: i64,
        used: i64,
        resets_at: Option<String>,
    },

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

/// Structured error response format for API consistency
#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: ErrorDetail,
    request_id: String,
}

/// Error detail structure with machine-readable codes
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorDetail {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    limit: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    used: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    resets_at: Option<String>,
}

impl AppError {
    /// Convert AppError to appropriate HTTP status code and error code
    fn to_status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AppError::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::QuotaExceeded { .. } => (StatusCode::PAYMENT_REQUIRED, "QUOTA_EXCEEDED"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }

    /// User-facing message, sanitized for external consumption
    fn to_user_message(&self) -> String {
        match self {
            AppError::Validation(msg) => format!("Validation failed: {}", msg),
            AppError::NotFound => "The requested resource was not found".to_string(),
            AppError::QuotaExceeded { limit, used, .. } => format!(
                "Proposal limit reached ({} of {}). Upgrade your plan to continue.",
                used, limit
            ),
            AppError::Internal(_) => "An internal server error occurred".to_string(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self::Internal(err.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let request_id = Uuid::new_v4().to_string();
        let (status_code, error_code) = self.to_status_and_code();
        let user_message = self.to_user_message();

        // Log internal errors with full context but don't expose details
        match &self {
            AppError::Internal(err) => {
                error!(
                    request_id = %request_id,
                    error = %err,
                    "Internal server error occurred"
                );
            }
            AppError::QuotaExceeded { limit, used, .. } => {
                error!(
                    request_id = %request_id,
                    limit = %limit,
                    used = %used,
                    audit = true,
                    "Proposal quota exceeded"
                );
            }
            _ => {
                tracing::info!(
                    request_id = %request_id,
                    error_code = %error_code,
                    error = %self,
                    "API error response"
                );
            }
        }

        let mut error_detail = ErrorDetail {
            code: error_code.to_string(),
            message: user_message,
            limit: None,
            used: None,
            resets_at: None,
        };

        if let AppError::QuotaExceeded {
            limit,
            used,
            resets_at,
        } = &self
        {
            error_detail.limit = Some(*limit);
            error_detail.used = Some(*used);
            error_detail.resets_at = resets_at.clone();
        }

        let error_response = ErrorResponse {
            success: false,
            error: error_detail,
            request_id,
        };

        let mut response = Json(error_response).into_response();
        *response.status_mut() = status_code;

        // Machine-readable quota headers on 402s
        if let AppError::QuotaExceeded { limit, used, .. } = &self {
            let headers = response.headers_mut();
            if let Ok(value) = limit.to_string().parse() {
                headers.insert("X-Quota-Limit", value);
            }
            if let Ok(value) = used.to_string().parse() {
                headers.insert("X-Quota-Used", value);
            }
        }

        response
    }
}

/// Result type alias for middleware
pub type AppResult<T> = Result<T, AppError>;
