use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

use super::ADMIN_IDENTITY;
use crate::{error::ApiError, state::AppState};

/// Extract bearer token from Authorization header
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Lets the request through only for a live token naming the admin identity.
pub async fn require_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(request.headers())
        .ok_or_else(|| ApiError::Unauthorized("Token required".into()))?;

    let identity = state.tokens.verify(token)?;
    if identity != ADMIN_IDENTITY {
        tracing::warn!(identity = %identity, "Rejected token for non-admin identity");
        return Err(ApiError::Forbidden);
    }

    Ok(next.run(request).await)
}
