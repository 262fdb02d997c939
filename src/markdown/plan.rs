// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Weekly plan parser.
//!
//! Expected shape:
//!
//! ```text
//! ### Day 1:
//! * Breakfast: Oatmeal with berries
//! * Dinner: Lentil soup
//! ### Day 2:
//! ...
//! ```

use lazy_static::lazy_static;
use regex::Regex;

use super::ParseInvalid;
use crate::models::plan::{DayPlan, WeeklyPlan, DAYS_PER_WEEK};
use crate::models::MealSlot;

lazy_static! {
    static ref DAY_HEADER: Regex = Regex::new(r"### Day \d+:").unwrap();
    static ref MEAL_LINE: Regex = Regex::new(r"^\*\s*(.+?):\s*(.*)").unwrap();
}

/// Parse a 7-day plan where every day lists each of `expected_slots`.
///
/// The header number is ignored; position decides the day. Bullets for
/// slots outside `expected_slots` are dropped.
pub fn parse_plan(markdown: &str, expected_slots: &[MealSlot]) -> Result<WeeklyPlan, ParseInvalid> {
    let segments: Vec<&str> = DAY_HEADER
        .split(markdown)
        .filter(|s| !s.trim().is_empty())
        .collect();

    if segments.len() != DAYS_PER_WEEK {
        return Err(ParseInvalid::new(format!(
            "expected {} day sections, found {}",
            DAYS_PER_WEEK,
            segments.len()
        )));
    }

    segments
        .iter()
        .enumerate()
        .map(|(i, segment)| parse_day(segment, expected_slots, i + 1))
        .collect::<Result<Vec<_>, _>>()
        .map(WeeklyPlan)
}

fn parse_day(segment: &str, expected_slots: &[MealSlot], day: usize) -> Result<DayPlan, ParseInvalid> {
    let mut meals = DayPlan::new();

    for line in segment.lines().map(str::trim) {
        let Some(caps) = MEAL_LINE.captures(line) else {
            continue;
        };
        let slot = caps[1].trim();
        if expected_slots.iter().any(|s| s.as_str() == slot) {
            meals.insert(slot.to_string(), caps[2].trim().to_string());
        }
    }

    for slot in expected_slots {
        match meals.get(slot.as_str()) {
            Some(description) if !description.is_empty() => {}
            _ => {
                return Err(ParseInvalid::new(format!(
                    "day {} is missing {}",
                    day, slot
                )))
            }
        }
    }

    Ok(meals)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn week(days: usize, meals: &[(&str, &str)]) -> String {
        (1..=days)
            .map(|d| {
                let lines: Vec<String> = meals
                    .iter()
                    .map(|(slot, desc)| format!("* {}: {} {}", slot, desc, d))
                    .collect();
                format!("### Day {}:\n{}\n", d, lines.join("\n"))
            })
            .collect()
    }

    const ALL: [MealSlot; 3] = [MealSlot::Breakfast, MealSlot::Lunch, MealSlot::Dinner];

    #[test]
    fn test_parse_valid_plan() {
        let md = week(
            7,
            &[("Breakfast", "Oats"), ("Lunch", "Salad"), ("Dinner", "Soup")],
        );
        let plan = parse_plan(&md, &ALL).unwrap();

        assert_eq!(plan.days().len(), 7);
        for day in plan.days() {
            let keys: Vec<&str> = day.keys().map(String::as_str).collect();
            assert_eq!(keys, vec!["Breakfast", "Dinner", "Lunch"]);
        }
        assert_eq!(plan.day(3).unwrap()["Lunch"], "Salad 3");
    }

    #[test]
    fn test_wrong_day_count_is_invalid() {
        let md = week(6, &[("Dinner", "Soup")]);
        assert!(parse_plan(&md, &[MealSlot::Dinner]).is_err());

        let md = week(8, &[("Dinner", "Soup")]);
        assert!(parse_plan(&md, &[MealSlot::Dinner]).is_err());
    }

    #[test]
    fn test_missing_slot_on_one_day_is_invalid() {
        let mut md = week(6, &[("Lunch", "Salad"), ("Dinner", "Soup")]);
        md.push_str("### Day 7:\n* Lunch: Salad\n");

        let err = parse_plan(&md, &[MealSlot::Lunch, MealSlot::Dinner]).unwrap_err();
        assert!(err.0.contains("day 7"));
    }

    #[test]
    fn test_empty_description_counts_as_missing() {
        let mut md = week(6, &[("Dinner", "Soup")]);
        md.push_str("### Day 7:\n* Dinner:   \n");

        assert!(parse_plan(&md, &[MealSlot::Dinner]).is_err());
    }

    #[test]
    fn test_extra_bullets_are_ignored_and_dropped() {
        let md = week(7, &[("Dinner", "Soup"), ("Snack", "Apple")]);
        let plan = parse_plan(&md, &[MealSlot::Dinner]).unwrap();

        for day in plan.days() {
            assert_eq!(day.len(), 1);
            assert!(day.contains_key("Dinner"));
        }
    }

    #[test]
    fn test_preamble_text_breaks_day_count() {
        let md = format!("Here is your plan!\n{}", week(7, &[("Dinner", "Soup")]));
        assert!(parse_plan(&md, &[MealSlot::Dinner]).is_err());
    }

    #[test]
    fn test_leading_whitespace_before_first_header_is_ok() {
        let md = format!("\n\n  {}", week(7, &[("Dinner", "Soup")]));
        assert!(parse_plan(&md, &[MealSlot::Dinner]).is_ok());
    }

    #[test]
    fn test_description_keeps_text_after_second_colon() {
        let md = week(7, &[("Dinner", "Pasta: with basil")]);
        let plan = parse_plan(&md, &[MealSlot::Dinner]).unwrap();
        assert_eq!(plan.day(1).unwrap()["Dinner"], "Pasta: with basil 1");
    }
}
