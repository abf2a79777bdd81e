// ABOUTME: Quota middleware for the generate-proposal route
// ABOUTME: Checks before the handler runs, commits usage only on a 2xx response

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use proposalpilot_api::extract::USER_ID_HEADER;
use proposalpilot_billing::{QuotaDecision, QuotaGuard};
use proposalpilot_proposals::DbState;

use crate::error::AppError;

/// Enforce the proposal quota on the wrapped route. Rejections become
/// structured 402 responses; a failed downstream handler leaves the usage
/// counter unchanged.
pub async fn quota_middleware(
    State(db): State<DbState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user_id = request
        .headers()
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(|value| value.to_string())
        .ok_or_else(|| AppError::validation(format!("{} header is required", USER_ID_HEADER)))?;

    let guard = QuotaGuard::new(db.pool.clone());

    match guard.check(&user_id).await {
        QuotaDecision::Allowed => {
            let response = next.run(request).await;

            if response.status().is_success() {
                guard.commit_usage(&user_id).await;
            } else {
                debug!(
                    user_id = %user_id,
                    status = %response.status(),
                    "Generation did not succeed; quota usage not committed"
                );
            }

            Ok(response)
        }
        QuotaDecision::Rejected(rejection) => Err(AppError::QuotaExceeded {
            limit: rejection.limit,
            used: rejection.used,
            resets_at: rejection.resets_at.map(|date| date.to_rfc3339()),
        }),
    }
}
