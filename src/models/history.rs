// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Weekly meal history and fragment reconciliation.
//!
//! Plan, instructions and grocery list for a week are produced by separate
//! requests. Each request contributes a [`WeekFragment`] that is merged into
//! the single [`WeekRecord`] identified by the week's Monday.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::plan::{GroceryList, InstructionSet, WeeklyPlan};

/// Number of weeks kept in history.
pub const HISTORY_RETENTION: usize = 3;

/// Everything generated for one calendar week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct WeekRecord {
    /// Monday of the week (identity)
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub start_date: NaiveDate,
    pub plan: WeeklyPlan,
    #[serde(default)]
    pub instructions: Option<InstructionSet>,
    #[serde(default)]
    pub grocery_list: Option<GroceryList>,
}

/// Partial update for a week. `None` fields leave the record untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeekFragment {
    pub plan: Option<WeeklyPlan>,
    pub instructions: Option<InstructionSet>,
    pub grocery_list: Option<GroceryList>,
}

impl WeekFragment {
    pub fn plan(plan: WeeklyPlan) -> Self {
        Self {
            plan: Some(plan),
            ..Default::default()
        }
    }

    pub fn instructions(instructions: InstructionSet) -> Self {
        Self {
            instructions: Some(instructions),
            ..Default::default()
        }
    }

    pub fn grocery_list(grocery_list: GroceryList) -> Self {
        Self {
            grocery_list: Some(grocery_list),
            ..Default::default()
        }
    }
}

/// What an upsert did to the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// Merged into the existing record for the week
    Merged,
    /// Appended a new record for the week
    Inserted,
    /// No record for the week and the fragment has no plan to start one
    Skipped,
}

/// Week records in write order (oldest write first), at most
/// [`HISTORY_RETENTION`] entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MealHistory(Vec<WeekRecord>);

impl MealHistory {
    pub fn weeks(&self) -> &[WeekRecord] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, start_date: NaiveDate) -> Option<&WeekRecord> {
        self.0.iter().find(|w| w.start_date == start_date)
    }

    /// Merge `fragment` into the week keyed by `start_date`.
    ///
    /// Fields are merged independently so e.g. new instructions never
    /// replace the week's plan. A new plan counts as a fresh write of the
    /// week and moves its record to the back; instructions and grocery
    /// merges stay in place. New records go to the back and the front is
    /// evicted past the retention bound, so retention follows write order
    /// rather than calendar order.
    pub fn upsert(&mut self, start_date: NaiveDate, fragment: WeekFragment) -> UpsertOutcome {
        if let Some(pos) = self.0.iter().position(|w| w.start_date == start_date) {
            let WeekFragment {
                plan,
                instructions,
                grocery_list,
            } = fragment;
            let rewrites_plan = plan.is_some();
            let record = &mut self.0[pos];
            if let Some(plan) = plan {
                record.plan = plan;
            }
            if instructions.is_some() {
                record.instructions = instructions;
            }
            if grocery_list.is_some() {
                record.grocery_list = grocery_list;
            }
            if rewrites_plan {
                let record = self.0.remove(pos);
                self.0.push(record);
            }
            return UpsertOutcome::Merged;
        }

        let Some(plan) = fragment.plan else {
            return UpsertOutcome::Skipped;
        };

        self.0.push(WeekRecord {
            start_date,
            plan,
            instructions: fragment.instructions,
            grocery_list: fragment.grocery_list,
        });

        if self.0.len() > HISTORY_RETENTION {
            let excess = self.0.len() - HISTORY_RETENTION;
            self.0.drain(..excess);
        }

        UpsertOutcome::Inserted
    }

    /// Records sorted by week (for display). Storage order is unchanged.
    pub fn sorted_by_week(&self) -> Vec<WeekRecord> {
        let mut weeks = self.0.clone();
        weeks.sort_by_key(|w| w.start_date);
        weeks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::plan::{GroceryItem, MealSlotMap};

    fn monday(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn make_plan(dinner: &str) -> WeeklyPlan {
        let day: MealSlotMap = [("Dinner".to_string(), dinner.to_string())].into();
        WeeklyPlan(vec![day; 7])
    }

    fn make_grocery() -> GroceryList {
        [(
            "Vegetables".to_string(),
            vec![GroceryItem {
                item: "Carrot".to_string(),
                quantity: "2".to_string(),
            }],
        )]
        .into()
    }

    #[test]
    fn test_upsert_inserts_new_week() {
        let mut history = MealHistory::default();
        let outcome = history.upsert(monday(1), WeekFragment::plan(make_plan("Soup")));

        assert_eq!(outcome, UpsertOutcome::Inserted);
        assert_eq!(history.len(), 1);
        assert_eq!(history.get(monday(1)).unwrap().plan, make_plan("Soup"));
    }

    #[test]
    fn test_upsert_merges_fields_independently() {
        let mut history = MealHistory::default();
        history.upsert(monday(1), WeekFragment::plan(make_plan("Soup")));

        let outcome = history.upsert(monday(1), WeekFragment::grocery_list(make_grocery()));

        assert_eq!(outcome, UpsertOutcome::Merged);
        let week = history.get(monday(1)).unwrap();
        assert_eq!(week.plan, make_plan("Soup"), "Plan must survive merge");
        assert_eq!(week.grocery_list, Some(make_grocery()));
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_upsert_is_idempotent() {
        let mut history = MealHistory::default();
        history.upsert(monday(1), WeekFragment::plan(make_plan("Soup")));
        history.upsert(monday(1), WeekFragment::grocery_list(make_grocery()));
        let before = history.clone();

        history.upsert(monday(1), WeekFragment::grocery_list(make_grocery()));
        assert_eq!(history, before);
    }

    #[test]
    fn test_upsert_without_plan_for_unknown_week_is_skipped() {
        let mut history = MealHistory::default();
        let outcome = history.upsert(monday(8), WeekFragment::grocery_list(make_grocery()));

        assert_eq!(outcome, UpsertOutcome::Skipped);
        assert!(history.is_empty());
    }

    #[test]
    fn test_retention_evicts_oldest_write() {
        let mut history = MealHistory::default();
        // Written out of calendar order: week of the 29th first.
        for day in [29, 1, 8, 15] {
            history.upsert(monday(day), WeekFragment::plan(make_plan("Soup")));
            assert!(history.len() <= HISTORY_RETENTION);
        }

        let keys: Vec<NaiveDate> = history.weeks().iter().map(|w| w.start_date).collect();
        assert_eq!(keys, vec![monday(1), monday(8), monday(15)]);
    }

    #[test]
    fn test_plan_rewrite_counts_as_latest_write() {
        let mut history = MealHistory::default();
        for day in [1, 8, 15] {
            history.upsert(monday(day), WeekFragment::plan(make_plan("Soup")));
        }
        history.upsert(monday(1), WeekFragment::grocery_list(make_grocery()));

        let outcome = history.upsert(monday(1), WeekFragment::plan(make_plan("Stew")));
        assert_eq!(outcome, UpsertOutcome::Merged);
        assert_eq!(history.len(), 3);

        let rewritten = history.weeks().last().unwrap();
        assert_eq!(rewritten.start_date, monday(1));
        assert_eq!(rewritten.plan, make_plan("Stew"));
        assert_eq!(rewritten.grocery_list, Some(make_grocery()));

        // The oldest write is now the 8th, so it goes first.
        history.upsert(monday(22), WeekFragment::plan(make_plan("Soup")));
        let keys: Vec<NaiveDate> = history.weeks().iter().map(|w| w.start_date).collect();
        assert_eq!(keys, vec![monday(15), monday(1), monday(22)]);
    }

    #[test]
    fn test_non_plan_merge_keeps_position() {
        let mut history = MealHistory::default();
        for day in [1, 8, 15] {
            history.upsert(monday(day), WeekFragment::plan(make_plan("Soup")));
        }

        history.upsert(monday(1), WeekFragment::grocery_list(make_grocery()));
        history.upsert(monday(22), WeekFragment::plan(make_plan("Soup")));

        let keys: Vec<NaiveDate> = history.weeks().iter().map(|w| w.start_date).collect();
        assert_eq!(keys, vec![monday(8), monday(15), monday(22)]);
    }

    #[test]
    fn test_sorted_by_week() {
        let mut history = MealHistory::default();
        for day in [15, 1, 8] {
            history.upsert(monday(day), WeekFragment::plan(make_plan("Soup")));
        }

        let sorted: Vec<NaiveDate> = history.sorted_by_week().iter().map(|w| w.start_date).collect();
        assert_eq!(sorted, vec![monday(1), monday(8), monday(15)]);
        assert_eq!(history.weeks()[0].start_date, monday(15));
    }

    #[test]
    fn test_history_serializes_week_key_as_date() {
        let mut history = MealHistory::default();
        history.upsert(monday(1), WeekFragment::plan(make_plan("Soup")));

        let json = serde_json::to_value(&history).unwrap();
        assert_eq!(json[0]["startDate"], "2024-01-01");
        assert!(json[0]["groceryList"].is_null());
    }
}
