// ABOUTME: Request extractors
// ABOUTME: RequesterId reads the x-user-id header; identity is always explicit

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::Response;

use crate::response::bad_request;

pub const USER_ID_HEADER: &str = "x-user-id";

/// The caller's user id, taken from the `x-user-id` header. There is no
/// ambient current-user context; handlers pass this id into every operation.
#[derive(Debug, Clone)]
pub struct RequesterId(pub String);

impl<S> FromRequestParts<S> for RequesterId
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.is_empty())
            .map(|value| RequesterId(value.to_string()))
            .ok_or_else(|| {
                bad_request(
                    format!("{} header is required", USER_ID_HEADER),
                    "Missing requester identity",
                )
            })
    }
}
