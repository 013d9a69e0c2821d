//! Authentication endpoints: register, login, logout

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::auth::{decode_token, issue_token};
use crate::db;
use crate::error::ApiError;
use crate::state::AppState;
use crate::util::{hash_password, now_millis, verify_password};

use super::ApiResult;

const USERNAME_MAX_LEN: usize = 100;
const PASSWORD_MIN_LEN: usize = 6;

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub user_id: i64,
    pub username: String,
}

/// POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let username = req.username.trim();
    if username.is_empty() || username.len() > USERNAME_MAX_LEN {
        return Err(ApiError::Validation("Username is required".into()));
    }
    if req.password.len() < PASSWORD_MIN_LEN {
        return Err(ApiError::Validation(
            "Password must be at least 6 characters long".into(),
        ));
    }

    if db::users::find_by_username(&state.pool, username)
        .await?
        .is_some()
    {
        return Err(ApiError::DuplicateUsername);
    }

    let password_hash = hash_password(&req.password).map_err(|e| {
        tracing::error!(error = %e, "password hashing failed");
        ApiError::Internal
    })?;

    let user_id = db::users::create(&state.pool, username, &password_hash, now_millis()).await?;

    let token = issue_token(&state, user_id, username).map_err(|e| {
        tracing::error!(error = %e, "token signing failed");
        ApiError::Internal
    })?;

    tracing::info!(user_id, "user registered");

    Ok((StatusCode::CREATED, Json(json!({ "token": token }))))
}

/// POST /auth/login
///
/// Unknown username and wrong password produce the identical response.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let user = db::users::find_by_username(&state.pool, req.username.trim())
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    if !verify_password(&req.password, &user.password_hash) {
        return Err(ApiError::InvalidCredentials);
    }

    let token = issue_token(&state, user.id, &user.username).map_err(|e| {
        tracing::error!(error = %e, "token signing failed");
        ApiError::Internal
    })?;

    Ok(Json(LoginResponse {
        token,
        user_id: user.id,
        username: user.username,
    }))
}

/// POST /auth/logout
///
/// Best-effort revocation: a valid bearer token has its `jti` recorded until
/// the token's own expiry; a missing or invalid token is simply ignored.
/// Always acks.
pub async fn logout(State(state): State<AppState>, request: Request) -> Json<serde_json::Value> {
    let token = request
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    if let Some(token) = token
        && let Ok(claims) = decode_token(&state, token)
    {
        state.revoked.revoke(&claims.jti, (claims.exp as i64) * 1000);
        tracing::info!(user = %claims.sub, "token revoked");
    }

    Json(json!({ "message": "Logged out" }))
}
