// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod generation;
pub mod llm;
pub mod meal_plan;
pub mod password;
pub mod session;

pub use generation::{GenerationFailed, GenerationKind, Generated, RetryDriver};
pub use llm::{ChatModel, ChatRequest, OpenAiCompatClient, ProviderError};
pub use meal_plan::MealPlanService;
pub use session::{SessionContext, SessionStore};
