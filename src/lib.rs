// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Home Cook: weekly meal plans, cooking instructions and grocery lists
//!
//! This crate provides the backend API. A chat model writes markdown, strict
//! parsers turn it into structured data, and the result is reconciled into a
//! per-user weekly history.

pub mod config;
pub mod db;
pub mod error;
pub mod markdown;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::FirestoreDb;
use services::{MealPlanService, SessionStore};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub meal_planner: MealPlanService,
    pub sessions: SessionStore,
}
