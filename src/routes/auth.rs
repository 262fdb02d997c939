// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Account routes: registration, login and session lifecycle.

use crate::error::{AppError, Result};
use crate::middleware::auth::{create_jwt, AuthUser, SESSION_COOKIE};
use crate::models::User;
use crate::services::password::{hash_password, verify_password};
use crate::services::session::new_session_id;
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// Public auth routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
}

/// Auth routes that need an existing session.
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn session_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/session", get(current_session))
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SessionUser {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AuthResponse {
    pub token: String,
    pub user: SessionUser,
}

/// Emails are compared case-insensitively.
fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Mint a token, register its session and attach the cookie.
fn start_session(state: &AppState, jar: CookieJar, user: &User) -> Result<(CookieJar, AuthResponse)> {
    let session_id = new_session_id()?;
    let issued = create_jwt(
        &user.email,
        &session_id,
        state.config.session_ttl,
        &state.config.jwt_signing_key,
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!("JWT creation failed: {}", e)))?;

    state.sessions.purge_expired(Utc::now());
    state.sessions.start(&session_id, issued.expires_at);

    let cookie = Cookie::build((SESSION_COOKIE, issued.token.clone()))
        .path("/")
        .http_only(true)
        .secure(!state.config.frontend_url.starts_with("http://"))
        .same_site(SameSite::Lax);

    Ok((
        jar.add(cookie),
        AuthResponse {
            token: issued.token,
            user: SessionUser {
                name: user.name.clone(),
                email: user.email.clone(),
            },
        },
    ))
}

async fn register(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, CookieJar, Json<AuthResponse>)> {
    req.validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let email = normalize_email(&req.email);
    let password_hash = hash_password(&req.password)?;
    let user = User::new(
        req.name.trim().to_string(),
        email,
        password_hash,
        &format_utc_rfc3339(Utc::now()),
    );

    state.db.create_user(&user).await?;
    tracing::info!(email = %user.email, "User registered");

    let (jar, body) = start_session(&state, jar, &user)?;
    Ok((StatusCode::CREATED, jar, Json(body)))
}

async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<AuthResponse>)> {
    let email = normalize_email(&req.email);

    let Some(user) = state.db.get_user(&email).await? else {
        tracing::warn!(email = %email, "Login for unknown user");
        return Err(AppError::Unauthorized);
    };

    if !verify_password(&req.password, &user.password_hash)? {
        tracing::warn!(email = %email, "Login with wrong password");
        return Err(AppError::Unauthorized);
    }

    tracing::info!(email = %email, "User logged in");
    let (jar, body) = start_session(&state, jar, &user)?;
    Ok((jar, Json(body)))
}

/// End the session: drop its cached generations and clear the cookie.
async fn logout(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    jar: CookieJar,
) -> (StatusCode, CookieJar) {
    state.sessions.end(&user.session_id);
    tracing::info!(email = %user.email, "User logged out");

    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    (StatusCode::NO_CONTENT, jar)
}

async fn current_session(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<SessionUser>> {
    let stored = state
        .db
        .get_user(&user.email)
        .await?
        .ok_or(AppError::Unauthorized)?;

    Ok(Json(SessionUser {
        name: stored.name,
        email: stored.email,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Ana@Example.COM "), "ana@example.com");
    }

    #[test]
    fn test_register_request_validation() {
        let ok = RegisterRequest {
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            password: "long enough".to_string(),
        };
        assert!(ok.validate().is_ok());

        let bad_email = RegisterRequest {
            email: "not-an-email".to_string(),
            ..ok_request()
        };
        assert!(bad_email.validate().is_err());

        let short_password = RegisterRequest {
            password: "short".to_string(),
            ..ok_request()
        };
        assert!(short_password.validate().is_err());
    }

    fn ok_request() -> RegisterRequest {
        RegisterRequest {
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            password: "long enough".to_string(),
        }
    }
}
