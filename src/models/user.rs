// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User aggregate and quiz profile.

use serde::{Deserialize, Serialize};
use std::fmt;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::{Validate, ValidationError};

use crate::models::history::MealHistory;
use crate::models::plan::{GroceryList, InstructionSet, WeeklyPlan};

/// User record stored in Firestore (document ID = encoded email).
///
/// Owns everything generated for the user; nothing is shared between users.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    #[serde(default = "default_subscription")]
    pub subscription: String,
    #[serde(default)]
    pub quiz_data: Option<QuizProfile>,
    /// Most recently generated plan
    #[serde(default)]
    pub meal_plan: Option<WeeklyPlan>,
    #[serde(default)]
    pub meal_history: MealHistory,
    /// Most recently generated instructions
    #[serde(default)]
    pub instructions: Option<InstructionSet>,
    /// Most recently generated grocery list
    #[serde(default)]
    pub grocery_list: Option<GroceryList>,
    pub created_at: String,
}

pub fn default_subscription() -> String {
    "free".to_string()
}

impl User {
    pub fn new(name: String, email: String, password_hash: String, now: &str) -> Self {
        Self {
            name,
            email,
            password_hash,
            subscription: default_subscription(),
            quiz_data: None,
            meal_plan: None,
            meal_history: MealHistory::default(),
            instructions: None,
            grocery_list: None,
            created_at: now.to_string(),
        }
    }
}

/// A meal occasion the user wants planned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum MealSlot {
    Breakfast,
    Lunch,
    Dinner,
}

impl MealSlot {
    pub fn as_str(&self) -> &'static str {
        match self {
            MealSlot::Breakfast => "Breakfast",
            MealSlot::Lunch => "Lunch",
            MealSlot::Dinner => "Dinner",
        }
    }
}

impl fmt::Display for MealSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum MealStyle {
    Vegan,
    Vegetarian,
    Balanced,
    Mediterranean,
    LowCarb,
    HighProtein,
    Keto,
    Paleo,
}

impl fmt::Display for MealStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MealStyle::Vegan => "vegan",
            MealStyle::Vegetarian => "vegetarian",
            MealStyle::Balanced => "balanced",
            MealStyle::Mediterranean => "mediterranean",
            MealStyle::LowCarb => "low-carb",
            MealStyle::HighProtein => "high-protein",
            MealStyle::Keto => "keto",
            MealStyle::Paleo => "paleo",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum SkillLevel {
    Basic,
    Intermediate,
    Expert,
}

impl fmt::Display for SkillLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SkillLevel::Basic => "basic",
            SkillLevel::Intermediate => "intermediate",
            SkillLevel::Expert => "expert",
        };
        f.write_str(s)
    }
}

/// Answers from the preference quiz. Read-only input to generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct QuizProfile {
    #[validate(length(max = 50))]
    pub gender: String,
    #[validate(length(max = 20))]
    pub age: String,
    #[validate(length(max = 20))]
    pub height: String,
    #[validate(length(max = 20))]
    pub weight: String,
    #[validate(length(max = 500))]
    pub reason: String,
    pub meal_type: MealStyle,
    pub skill_level: SkillLevel,
    /// Ordered, non-empty, no duplicates
    #[validate(custom(function = "validate_meal_slots"))]
    pub meals_per_day: Vec<MealSlot>,
    #[serde(default)]
    #[validate(length(max = 20))]
    pub restrictions: Vec<String>,
    #[serde(default)]
    #[validate(length(max = 20))]
    pub cuisine: Vec<String>,
}

impl QuizProfile {
    /// Slot names in configured order, as they appear in model output.
    pub fn slot_names(&self) -> Vec<String> {
        self.meals_per_day
            .iter()
            .map(|s| s.as_str().to_string())
            .collect()
    }
}

fn validate_meal_slots(slots: &[MealSlot]) -> Result<(), ValidationError> {
    if slots.is_empty() {
        return Err(ValidationError::new("meals_per_day_empty"));
    }
    let mut seen = Vec::with_capacity(slots.len());
    for slot in slots {
        if seen.contains(slot) {
            return Err(ValidationError::new("meals_per_day_duplicate"));
        }
        seen.push(*slot);
    }
    Ok(())
}
