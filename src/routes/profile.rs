// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Profile and preference quiz routes.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::QuizProfile;
use crate::AppState;
use axum::{
    extract::State,
    routing::{get, post, put},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// Profile routes (require authentication via JWT).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/auth/submit-quiz", post(submit_quiz))
        .route("/api/auth/profile", get(get_profile))
        .route("/api/auth/profile/quiz", put(update_quiz))
        .route("/api/auth/profile/name", put(update_name))
        .route("/api/auth/profile/subscription", put(update_subscription))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ProfileResponse {
    pub name: String,
    pub email: String,
    pub subscription: String,
    pub quiz_data: Option<QuizProfile>,
}

async fn get_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ProfileResponse>> {
    let stored = state
        .db
        .get_user(&user.email)
        .await?
        .ok_or_else(|| AppError::NotFound("user".to_string()))?;

    Ok(Json(ProfileResponse {
        name: stored.name,
        email: stored.email,
        subscription: stored.subscription,
        quiz_data: stored.quiz_data,
    }))
}

// ─── Quiz ────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizPayload {
    pub quiz_data: QuizProfile,
}

async fn store_quiz(state: &AppState, email: &str, quiz: &QuizProfile) -> Result<()> {
    quiz.validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    state.db.set_quiz(email, quiz).await?;
    tracing::info!(email, slots = ?quiz.meals_per_day, "Quiz answers stored");
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

async fn submit_quiz(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<QuizPayload>,
) -> Result<Json<MessageResponse>> {
    store_quiz(&state, &user.email, &payload.quiz_data).await?;
    Ok(Json(MessageResponse {
        message: "Quiz data saved successfully".to_string(),
    }))
}

async fn update_quiz(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<QuizPayload>,
) -> Result<Json<QuizPayload>> {
    store_quiz(&state, &user.email, &payload.quiz_data).await?;
    Ok(Json(payload))
}

// ─── Name & Subscription ─────────────────────────────────────

#[derive(Debug, Deserialize, Serialize)]
pub struct NamePayload {
    pub name: String,
}

async fn update_name(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<NamePayload>,
) -> Result<Json<NamePayload>> {
    let name = payload.name.trim();
    if name.is_empty() || name.len() > 100 {
        return Err(AppError::BadRequest("name must be 1-100 characters".to_string()));
    }

    state.db.set_name(&user.email, name).await?;
    Ok(Json(NamePayload {
        name: name.to_string(),
    }))
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SubscriptionPayload {
    pub subscription: String,
}

async fn update_subscription(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<SubscriptionPayload>,
) -> Result<Json<SubscriptionPayload>> {
    let subscription = payload.subscription.trim();
    if subscription.is_empty() {
        return Err(AppError::BadRequest("subscription required".to_string()));
    }

    state.db.set_subscription(&user.email, subscription).await?;
    tracing::info!(email = %user.email, subscription, "Subscription updated");
    Ok(Json(SubscriptionPayload {
        subscription: subscription.to_string(),
    }))
}
