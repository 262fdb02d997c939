// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Meal generation routes.
//!
//! Generation requests for one session are serialized by the session lock,
//! so a grocery list always sees the instructions of a finished request.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{GroceryList, InstructionSet, WeekRecord, WeeklyPlan};
use crate::time_utils::current_week_key;
use crate::AppState;
use axum::{
    extract::{Query, State},
    routing::get,
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Furthest week, in either direction, a plan can be generated for.
const MAX_WEEK_OFFSET: u64 = 52;

/// Meal routes (require authentication via JWT).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/meal/generateMeal", get(generate_meal))
        .route("/api/meal/generateInstructions", get(generate_instructions))
        .route("/api/meal/generateGroceryList", get(generate_grocery_list))
        .route("/api/meal/stored", get(get_stored))
}

#[derive(Debug, Deserialize)]
pub struct WeekQuery {
    #[serde(default)]
    pub offset: i64,
}

impl WeekQuery {
    fn checked_offset(&self) -> Result<i64> {
        if self.offset.unsigned_abs() > MAX_WEEK_OFFSET {
            return Err(AppError::BadRequest(format!(
                "offset must be within ±{} weeks",
                MAX_WEEK_OFFSET
            )));
        }
        Ok(self.offset)
    }
}

#[derive(Debug, Serialize)]
pub struct PlanResponse {
    pub plan: WeeklyPlan,
}

#[derive(Debug, Serialize)]
pub struct InstructionsResponse {
    pub instructions: InstructionSet,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroceryResponse {
    pub grocery_list: GroceryList,
}

async fn generate_meal(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<WeekQuery>,
) -> Result<Json<PlanResponse>> {
    let week = current_week_key(query.checked_offset()?);

    let session = state.sessions.context(&user.session_id, user.expires_at);
    let mut session = session.lock().await;

    let plan = state
        .meal_planner
        .generate_plan(&user.email, week, &mut session)
        .await?;
    Ok(Json(PlanResponse { plan }))
}

async fn generate_instructions(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<InstructionsResponse>> {
    let session = state.sessions.context(&user.session_id, user.expires_at);
    let mut session = session.lock().await;

    let instructions = state
        .meal_planner
        .generate_instructions(&user.email, &mut session)
        .await?;
    Ok(Json(InstructionsResponse { instructions }))
}

async fn generate_grocery_list(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<WeekQuery>,
) -> Result<Json<GroceryResponse>> {
    let week = current_week_key(query.checked_offset()?);

    let session = state.sessions.context(&user.session_id, user.expires_at);
    let session = session.lock().await;

    let grocery_list = state
        .meal_planner
        .generate_grocery_list(&user.email, week, &session)
        .await?;
    Ok(Json(GroceryResponse { grocery_list }))
}

/// Everything stored for the user; history is sorted by week.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct StoredResponse {
    pub plan: Option<WeeklyPlan>,
    pub grocery_list: Option<GroceryList>,
    pub instructions: Option<InstructionSet>,
    pub history: Vec<WeekRecord>,
}

async fn get_stored(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<StoredResponse>> {
    let stored = state
        .db
        .get_user(&user.email)
        .await?
        .ok_or_else(|| AppError::NotFound("user".to_string()))?;

    Ok(Json(StoredResponse {
        history: stored.meal_history.sorted_by_week(),
        plan: stored.meal_plan,
        grocery_list: stored.grocery_list,
        instructions: stored.instructions,
    }))
}
