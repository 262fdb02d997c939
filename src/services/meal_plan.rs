// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Meal plan, instructions and grocery list generation for a user.
//!
//! Flow for each kind:
//! 1. Check prerequisites (quiz answers, cached raw text)
//! 2. Run the retry driver with the kind's prompt and parser
//! 3. Reconcile the parsed value into the user's current data and history
//! 4. Persist only the changed fields
//! 5. Cache the raw text for the next dependent step

use chrono::NaiveDate;

use crate::db::{FirestoreDb, GeneratedFields};
use crate::error::AppError;
use crate::markdown::{parse_grocery, parse_instructions, parse_plan};
use crate::models::{
    GroceryList, InstructionSet, QuizProfile, UpsertOutcome, User, WeekFragment, WeeklyPlan,
};
use crate::services::generation::{
    grocery_prompt, instructions_prompt, plan_prompt, GenerationKind, RetryDriver,
};
use crate::services::session::{CachedText, SessionContext};

/// A freshly parsed generation result.
#[derive(Debug, Clone, PartialEq)]
pub enum Generation {
    Plan(WeeklyPlan),
    Instructions(InstructionSet),
    GroceryList(GroceryList),
}

/// Store `generation` as the user's current value and merge it into the
/// history record for `week`.
pub fn reconcile(user: &mut User, week: NaiveDate, generation: Generation) -> UpsertOutcome {
    let fragment = match generation {
        Generation::Plan(plan) => {
            user.meal_plan = Some(plan.clone());
            WeekFragment::plan(plan)
        }
        Generation::Instructions(instructions) => {
            user.instructions = Some(instructions.clone());
            WeekFragment::instructions(instructions)
        }
        Generation::GroceryList(list) => {
            user.grocery_list = Some(list.clone());
            WeekFragment::grocery_list(list)
        }
    };

    let outcome = user.meal_history.upsert(week, fragment);
    tracing::debug!(week = %week, ?outcome, "Reconciled week");
    outcome
}

/// Fields to persist after reconciling. History is skipped when untouched.
fn changed_fields(user: &User, kind: GenerationKind, outcome: UpsertOutcome) -> GeneratedFields<'_> {
    let mut fields = GeneratedFields {
        meal_history: (outcome != UpsertOutcome::Skipped).then_some(&user.meal_history),
        ..Default::default()
    };
    match kind {
        GenerationKind::Plan => fields.meal_plan = user.meal_plan.as_ref(),
        GenerationKind::Instructions => fields.instructions = user.instructions.as_ref(),
        GenerationKind::GroceryList => fields.grocery_list = user.grocery_list.as_ref(),
    }
    fields
}

/// Generates and stores meal data for a user.
#[derive(Clone)]
pub struct MealPlanService {
    db: FirestoreDb,
    driver: RetryDriver,
}

impl MealPlanService {
    pub fn new(db: FirestoreDb, driver: RetryDriver) -> Self {
        Self { db, driver }
    }

    async fn load_user(&self, email: &str) -> Result<User, AppError> {
        self.db
            .get_user(email)
            .await?
            .ok_or_else(|| AppError::NotFound("user".to_string()))
    }

    fn require_profile(user: &User) -> Result<QuizProfile, AppError> {
        user.quiz_data.clone().ok_or(AppError::MissingProfile)
    }

    async fn persist(
        &self,
        user: &User,
        kind: GenerationKind,
        outcome: UpsertOutcome,
    ) -> Result<(), AppError> {
        self.db
            .save_generated(&user.email, changed_fields(user, kind, outcome))
            .await
    }

    /// Generate a plan for `week` and cache its raw text in the session.
    pub async fn generate_plan(
        &self,
        email: &str,
        week: NaiveDate,
        session: &mut SessionContext,
    ) -> Result<WeeklyPlan, AppError> {
        let mut user = self.load_user(email).await?;
        let profile = Self::require_profile(&user)?;

        let generated = self
            .driver
            .generate(GenerationKind::Plan, &plan_prompt(&profile), |raw| {
                parse_plan(raw, &profile.meals_per_day)
            })
            .await?;

        let outcome = reconcile(&mut user, week, Generation::Plan(generated.value.clone()));
        self.persist(&user, GenerationKind::Plan, outcome).await?;

        session.plan = Some(CachedText {
            raw: generated.raw,
            week,
        });
        tracing::info!(email, week = %week, attempts = generated.attempts, "Meal plan generated");
        Ok(generated.value)
    }

    /// Generate instructions for the plan cached in the session.
    pub async fn generate_instructions(
        &self,
        email: &str,
        session: &mut SessionContext,
    ) -> Result<InstructionSet, AppError> {
        let cached = session
            .plan
            .clone()
            .ok_or_else(|| AppError::MissingDependency("meal plan".to_string()))?;

        let mut user = self.load_user(email).await?;
        let profile = Self::require_profile(&user)?;

        let generated = self
            .driver
            .generate(
                GenerationKind::Instructions,
                &instructions_prompt(&cached.raw),
                |raw| parse_instructions(raw, &profile.meals_per_day),
            )
            .await?;

        let outcome = reconcile(
            &mut user,
            cached.week,
            Generation::Instructions(generated.value.clone()),
        );
        self.persist(&user, GenerationKind::Instructions, outcome)
            .await?;

        session.instructions = Some(CachedText {
            raw: generated.raw,
            week: cached.week,
        });
        tracing::info!(email, week = %cached.week, attempts = generated.attempts, "Instructions generated");
        Ok(generated.value)
    }

    /// Generate a grocery list from the instructions cached in the session.
    pub async fn generate_grocery_list(
        &self,
        email: &str,
        week: NaiveDate,
        session: &SessionContext,
    ) -> Result<GroceryList, AppError> {
        let cached = session
            .instructions
            .as_ref()
            .ok_or_else(|| AppError::MissingDependency("instructions".to_string()))?;

        let mut user = self.load_user(email).await?;

        let generated = self
            .driver
            .generate(
                GenerationKind::GroceryList,
                &grocery_prompt(&cached.raw),
                parse_grocery,
            )
            .await?;

        let outcome = reconcile(
            &mut user,
            week,
            Generation::GroceryList(generated.value.clone()),
        );
        if outcome == UpsertOutcome::Skipped {
            tracing::warn!(email, week = %week, "No plan stored for week; grocery list kept as current only");
        }
        self.persist(&user, GenerationKind::GroceryList, outcome)
            .await?;

        tracing::info!(email, week = %week, attempts = generated.attempts, "Grocery list generated");
        Ok(generated.value)
    }
}
