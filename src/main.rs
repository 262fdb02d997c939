// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Home Cook API Server
//!
//! Generates weekly meal plans, cooking instructions and grocery lists from
//! a user's preference quiz.

use home_cook::{
    config::Config,
    db::FirestoreDb,
    services::{MealPlanService, OpenAiCompatClient, RetryDriver, SessionStore},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting Home Cook API");

    let db = FirestoreDb::new(&config.gcp_project_id, config.db_timeout).await?;

    // One model client for the whole process
    let model = OpenAiCompatClient::new(
        &config.llm_base_url,
        config.llm_api_key.clone(),
        config.llm_model.clone(),
        config.llm_timeout,
    )?;
    tracing::info!(
        base_url = %config.llm_base_url,
        model = %model.model(),
        max_attempts = config.max_generation_attempts,
        "Completion client initialized"
    );

    let driver = RetryDriver::new(Arc::new(model), config.max_generation_attempts);
    let meal_planner = MealPlanService::new(db.clone(), driver);

    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        meal_planner,
        sessions: SessionStore::new(),
    });

    let app = home_cook::routes::create_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,home_cook=debug"));

    tracing_subscriber::registry().with(filter).with(format).init();
}
