/*!
 * Authentication Routes
 * Admin login and password change
 */
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{auth::ADMIN_IDENTITY, error::ApiError, state::AppState};

/// Shortest password accepted by change-password
const MIN_PASSWORD_LEN: usize = 6;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize, Serialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[serde(default)]
    pub old_password: String,
    #[serde(default)]
    pub new_password: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /login
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(payload) = body?;

    if payload.username.is_empty() || payload.password.is_empty() {
        return Err(ApiError::Validation(
            "Username and password are required".to_string(),
        ));
    }

    if !state.admin.check(&payload.username, &payload.password).await {
        tracing::warn!("Failed login attempt for: {}", payload.username);
        return Err(ApiError::InvalidCredentials);
    }

    let token = state.tokens.issue(ADMIN_IDENTITY).map_err(|e| {
        tracing::error!("Failed to create access token: {}", e);
        ApiError::Internal("Failed to create token".to_string())
    })?;

    tracing::info!("Successful login for: {}", payload.username);

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        token,
    }))
}

/// POST /change-password (behind the auth gate)
pub async fn change_password(
    State(state): State<AppState>,
    body: Result<Json<ChangePasswordRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(payload) = body?;

    // A missing or empty old password is just a wrong one.
    if payload.new_password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::Validation(format!(
            "New password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    state
        .admin
        .change_password(&payload.old_password, &payload.new_password)
        .await?;

    Ok(Json(json!({ "message": "Password changed successfully" })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{self, ADMIN_PASSWORD, ADMIN_USERNAME};
    use axum::http::{Method, StatusCode};
    use chrono::Duration;

    async fn login_with(app: &testing::TestApp, username: &str, password: &str) -> (StatusCode, Value) {
        app.json(
            Method::POST,
            "/login",
            None,
            Some(json!({ "username": username, "password": password })),
        )
        .await
    }

    #[tokio::test]
    async fn test_login_returns_verifiable_token() {
        let app = testing::app();
        let (status, body) = login_with(&app, ADMIN_USERNAME, ADMIN_PASSWORD).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Login successful");

        let token = body["token"].as_str().unwrap();
        assert_eq!(app.state.tokens.verify(token).unwrap(), ADMIN_IDENTITY);
    }

    #[tokio::test]
    async fn test_login_empty_fields_returns_bad_request() {
        let app = testing::app();
        let (status, _) = login_with(&app, "", ADMIN_PASSWORD).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = app.json(Method::POST, "/login", None, Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_login_wrong_credentials_returns_unauthorized() {
        let app = testing::app();
        let (status, body) = login_with(&app, ADMIN_USERNAME, "wrongpassword").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Invalid credentials");

        let (status, _) = login_with(&app, "root", ADMIN_PASSWORD).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_login_token_expires_after_a_day() {
        let app = testing::app();
        let (_, body) = login_with(&app, ADMIN_USERNAME, ADMIN_PASSWORD).await;
        let token = body["token"].as_str().unwrap().to_string();

        app.clock.advance(Duration::hours(23));
        let (status, _) = app.json(Method::GET, "/blog-posts/all", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);

        app.clock.advance(Duration::hours(2));
        let (status, body) = app.json(Method::GET, "/blog-posts/all", Some(&token), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Token expired. Please log in again.");
    }

    #[tokio::test]
    async fn test_change_password_flow() {
        let app = testing::app();
        let token = app.admin_token();
        let change = |old: &str, new: &str| json!({ "oldPassword": old, "newPassword": new });

        let (status, _) = app
            .json(Method::POST, "/change-password", None, Some(change(ADMIN_PASSWORD, "brand-new")))
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = app
            .json(Method::POST, "/change-password", Some(&token), Some(change("guess", "brand-new")))
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Old password is incorrect");

        let (status, body) = app
            .json(Method::POST, "/change-password", Some(&token), Some(change("", "brand-new")))
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Old password is incorrect");

        let (status, _) = app
            .json(Method::POST, "/change-password", Some(&token), Some(json!({ "newPassword": "brand-new" })))
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = app
            .json(Method::POST, "/change-password", Some(&token), Some(change(ADMIN_PASSWORD, "abc")))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = app
            .json(Method::POST, "/change-password", Some(&token), Some(change(ADMIN_PASSWORD, "brand-new")))
            .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = login_with(&app, ADMIN_USERNAME, ADMIN_PASSWORD).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let (status, _) = login_with(&app, ADMIN_USERNAME, "brand-new").await;
        assert_eq!(status, StatusCode::OK);
    }
}
