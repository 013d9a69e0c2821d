//! Bearer-token issue and validation
//!
//! Tokens are HS256 JWTs carrying the user's id and username. Validation
//! checks signature, issuer, audience and expiry with zero clock-skew
//! tolerance, then rejects tokens revoked by logout.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// JWT claims
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    /// Username
    pub name: String,
    /// Token id, referenced by the revocation set
    pub jti: String,
    /// Issuer
    pub iss: String,
    /// Audience
    pub aud: String,
    /// Issued at (Unix seconds)
    pub iat: usize,
    /// Expiration (Unix seconds)
    pub exp: usize,
}

/// Authenticated identity extracted from a verified token. Order operations
/// scope everything by this id; logout works from the raw header instead and
/// never goes through the middleware.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: i64,
}

/// Sign a token for a user.
pub fn issue_token(
    state: &AppState,
    user_id: i64,
    username: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        name: username.to_owned(),
        jti: Uuid::new_v4().to_string(),
        iss: state.jwt_issuer.clone(),
        aud: state.jwt_audience.clone(),
        iat: now.timestamp() as usize,
        exp: (now + chrono::Duration::minutes(state.token_ttl_minutes)).timestamp() as usize,
    };

    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(state.jwt_secret.as_bytes()),
    )
}

/// Verify signature, issuer, audience and expiry (no leeway) and return the
/// claims. Revocation is not checked here; callers decide whether it applies.
pub fn decode_token(state: &AppState, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::default();
    validation.leeway = 0;
    validation.set_issuer(&[&state.jwt_issuer]);
    validation.set_audience(&[&state.jwt_audience]);

    jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(state.jwt_secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
}

/// Middleware guarding the order routes: extracts the bearer token, verifies
/// it, rejects revoked tokens, and injects [`Identity`] for handlers.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = request
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::Unauthenticated)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(ApiError::Unauthenticated)?;

    let claims = decode_token(&state, token).map_err(|e| {
        tracing::debug!(error = %e, "token validation failed");
        ApiError::Unauthenticated
    })?;

    if state.revoked.is_revoked(&claims.jti) {
        return Err(ApiError::Unauthenticated);
    }

    let user_id: i64 = claims.sub.parse().map_err(|_| ApiError::Unauthenticated)?;

    request.extensions_mut().insert(Identity { user_id });

    Ok(next.run(request).await)
}
