// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod history;
pub mod plan;
pub mod user;

pub use history::{MealHistory, UpsertOutcome, WeekFragment, WeekRecord, HISTORY_RETENTION};
pub use plan::{GroceryItem, GroceryList, InstructionSet, MealSlotMap, WeeklyPlan};
pub use user::{MealSlot, MealStyle, QuizProfile, SkillLevel, User};
