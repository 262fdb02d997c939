// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Structured meal plan, cooking instructions and grocery list.
//!
//! These are only ever built by the markdown parsers, so every value that
//! reaches storage has already passed validation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Number of days in a generated plan.
pub const DAYS_PER_WEEK: usize = 7;

/// Meal slot name → free text (a short description in a plan, step-by-step
/// text in an instruction set).
pub type MealSlotMap = BTreeMap<String, String>;

/// One day of a weekly plan.
pub type DayPlan = MealSlotMap;

/// Seven day plans, Day 1 (Monday) through Day 7.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct WeeklyPlan(pub Vec<DayPlan>);

impl WeeklyPlan {
    pub fn days(&self) -> &[DayPlan] {
        &self.0
    }

    /// Day plan by 1-based day number.
    pub fn day(&self, number: usize) -> Option<&DayPlan> {
        number.checked_sub(1).and_then(|i| self.0.get(i))
    }
}

/// "Day 1".."Day 7" → meals cooked that day.
pub type InstructionSet = BTreeMap<String, MealSlotMap>;

/// A single grocery line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct GroceryItem {
    pub item: String,
    pub quantity: String,
}

/// Category name (model-chosen, e.g. "Vegetables") → items.
pub type GroceryList = BTreeMap<String, Vec<GroceryItem>>;

/// Label used as the instruction-set key for a 1-based day number.
pub fn day_label(number: usize) -> String {
    format!("Day {}", number)
}
