// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! JWT session authentication middleware.

use crate::error::AppError;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "homecook_token";

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user email)
    pub sub: String,
    /// Session id, keys the per-session generation cache
    pub sid: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

/// Authenticated user extracted from JWT.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub email: String,
    pub session_id: String,
    pub expires_at: DateTime<Utc>,
}

/// Session token from the cookie, falling back to a Bearer header.
fn extract_token(jar: &CookieJar, request: &Request) -> Option<String> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        return Some(cookie.value().to_string());
    }

    request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::to_string)
}

/// Validate a session token and return its claims.
pub fn verify_jwt(token: &str, signing_key: &[u8]) -> Result<Claims, AppError> {
    let key = DecodingKey::from_secret(signing_key);
    let validation = Validation::new(Algorithm::HS256);

    decode::<Claims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|_| AppError::InvalidToken)
}

/// Middleware that requires valid JWT authentication.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_token(&jar, &request).ok_or(AppError::Unauthorized)?;
    let claims = verify_jwt(&token, &state.config.jwt_signing_key)?;

    let expires_at = DateTime::<Utc>::from_timestamp(claims.exp as i64, 0)
        .ok_or(AppError::InvalidToken)?;

    request.extensions_mut().insert(AuthUser {
        email: claims.sub,
        session_id: claims.sid,
        expires_at,
    });

    Ok(next.run(request).await)
}

/// A freshly minted session token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Create a JWT for a user session.
pub fn create_jwt(
    email: &str,
    session_id: &str,
    ttl: Duration,
    signing_key: &[u8],
) -> anyhow::Result<IssuedToken> {
    use jsonwebtoken::{encode, EncodingKey, Header};

    let now = Utc::now().timestamp().max(0) as usize;
    let exp = now + ttl.as_secs() as usize;

    let claims = Claims {
        sub: email.to_string(),
        sid: session_id.to_string(),
        iat: now,
        exp,
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )?;
    let expires_at = DateTime::<Utc>::from_timestamp(exp as i64, 0)
        .ok_or_else(|| anyhow::anyhow!("token expiry out of range"))?;

    Ok(IssuedToken { token, expires_at })
}
