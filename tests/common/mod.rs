// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use home_cook::config::Config;
use home_cook::db::FirestoreDb;
use home_cook::middleware::auth::create_jwt;
use home_cook::routes::create_router;
use home_cook::services::llm::{ChatModel, ChatRequest, ProviderError};
use home_cook::services::{MealPlanService, RetryDriver, SessionStore};
use home_cook::AppState;
use std::sync::{Arc, Mutex};

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project", std::time::Duration::from_secs(10))
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a mock database connection (offline).
#[allow(dead_code)]
pub fn test_db_offline() -> FirestoreDb {
    FirestoreDb::new_mock()
}

/// Chat model that replays canned replies in order, then repeats the last.
#[allow(dead_code)]
pub struct ScriptedModel {
    replies: Vec<String>,
    calls: Mutex<usize>,
}

#[allow(dead_code)]
impl ScriptedModel {
    pub fn new(replies: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            replies: replies.iter().map(|s| s.to_string()).collect(),
            calls: Mutex::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn complete(&self, _request: &ChatRequest) -> Result<String, ProviderError> {
        let mut calls = self.calls.lock().unwrap();
        let reply = self
            .replies
            .get(*calls)
            .or_else(|| self.replies.last())
            .cloned()
            .ok_or_else(|| ProviderError::Transport("no scripted reply".to_string()));
        *calls += 1;
        reply
    }
}

/// Seven days of plan markdown covering `slots`.
#[allow(dead_code)]
pub fn plan_markdown(slots: &[&str]) -> String {
    (1..=7)
        .map(|d| {
            let meals: Vec<String> = slots
                .iter()
                .map(|s| format!("* {}: {} dish {}", s, s, d))
                .collect();
            format!("### Day {}:\n{}\n", d, meals.join("\n"))
        })
        .collect()
}

/// Create a test app with offline mock dependencies and the given model.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app_with_model(model: Arc<dyn ChatModel>) -> (axum::Router, Arc<AppState>) {
    let config = Config::default();
    let db = test_db_offline();
    let driver = RetryDriver::new(model, config.max_generation_attempts);
    let meal_planner = MealPlanService::new(db.clone(), driver);

    let state = Arc::new(AppState {
        config,
        db,
        meal_planner,
        sessions: SessionStore::new(),
    });

    (create_router(state.clone()), state)
}

/// Create a test app with offline mock dependencies.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    create_test_app_with_model(ScriptedModel::new(&[]))
}

/// Session token for `email`, registered with the app's session store.
#[allow(dead_code)]
pub fn test_token(state: &AppState, email: &str) -> (String, String) {
    let session_id = format!("test-session-{}", email);
    let issued = create_jwt(
        email,
        &session_id,
        state.config.session_ttl,
        &state.config.jwt_signing_key,
    )
    .expect("JWT creation should succeed");
    state.sessions.start(&session_id, issued.expires_at);
    (issued.token, session_id)
}
