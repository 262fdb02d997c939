// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Cooking instructions parser.
//!
//! ```text
//! - Day 1
//!   * Breakfast: Whisk the eggs.
//!     Fry for two minutes.
//!   * Dinner: ...
//! - Day 2
//! ```
//!
//! Lines that are neither day nor meal headers are continuation lines for the
//! open meal. Days may cover a subset of the slots.

use lazy_static::lazy_static;
use regex::Regex;

use super::ParseInvalid;
use crate::models::plan::{day_label, InstructionSet, MealSlotMap, DAYS_PER_WEEK};
use crate::models::MealSlot;

lazy_static! {
    static ref DAY_HEADER: Regex = Regex::new(r"(?i)^[-*]\s*Day\s+(\d+)").unwrap();
    static ref MEAL_HEADER: Regex = Regex::new(r"^\*\s*(.+?):\s*(.*)").unwrap();
}

/// Meal currently being collected.
struct OpenMeal {
    slot: String,
    lines: Vec<String>,
}

#[derive(Default)]
struct Builder {
    set: InstructionSet,
    day: Option<String>,
    meal: Option<OpenMeal>,
}

impl Builder {
    fn flush(&mut self) {
        let (Some(day), Some(meal)) = (self.day.as_ref(), self.meal.take()) else {
            return;
        };
        let text = meal.lines.join("\n").trim().to_string();
        if !text.is_empty() {
            self.set.entry(day.clone()).or_default().insert(meal.slot, text);
        }
    }

    fn open_day(&mut self, number: usize) {
        self.flush();
        let label = day_label(number);
        self.set.insert(label.clone(), MealSlotMap::new());
        self.day = Some(label);
    }

    fn open_meal(&mut self, slot: &str, first_line: &str) {
        self.flush();
        self.meal = Some(OpenMeal {
            slot: slot.to_string(),
            lines: vec![first_line.to_string()],
        });
    }

    fn continue_meal(&mut self, line: &str) {
        if let Some(meal) = self.meal.as_mut() {
            meal.lines.push(line.to_string());
        }
    }
}

/// Parse per-day cooking instructions; every slot used must be one of
/// `expected_slots`.
pub fn parse_instructions(
    markdown: &str,
    expected_slots: &[MealSlot],
) -> Result<InstructionSet, ParseInvalid> {
    let mut builder = Builder::default();

    for line in markdown.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if let Some(caps) = DAY_HEADER.captures(line) {
            let number: usize = caps[1]
                .parse()
                .map_err(|_| ParseInvalid::new(format!("bad day number: {}", line)))?;
            builder.open_day(number);
            continue;
        }

        if builder.day.is_none() {
            continue;
        }

        if let Some(caps) = MEAL_HEADER.captures(line) {
            builder.open_meal(caps[1].trim(), caps[2].trim());
        } else {
            builder.continue_meal(line);
        }
    }
    builder.flush();

    let set = builder.set;
    if set.len() != DAYS_PER_WEEK {
        return Err(ParseInvalid::new(format!(
            "expected {} days, found {}",
            DAYS_PER_WEEK,
            set.len()
        )));
    }
    for number in 1..=DAYS_PER_WEEK {
        if !set.contains_key(&day_label(number)) {
            return Err(ParseInvalid::new(format!("missing {}", day_label(number))));
        }
    }
    for (day, meals) in &set {
        if let Some(slot) = meals
            .keys()
            .find(|slot| !expected_slots.iter().any(|s| s.as_str() == slot.as_str()))
        {
            return Err(ParseInvalid::new(format!("{} has unexpected meal {}", day, slot)));
        }
    }

    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SLOTS: [MealSlot; 2] = [MealSlot::Lunch, MealSlot::Dinner];

    fn week_text() -> String {
        (1..=7)
            .map(|d| {
                format!(
                    "- Day {}\n  * Lunch: Chop the salad.\n    Dress it.\n  * Dinner: Simmer soup {}.\n",
                    d, d
                )
            })
            .collect()
    }

    #[test]
    fn test_parse_full_week() {
        let set = parse_instructions(&week_text(), &SLOTS).unwrap();

        assert_eq!(set.len(), 7);
        assert_eq!(set["Day 1"]["Lunch"], "Chop the salad.\nDress it.");
        assert_eq!(set["Day 7"]["Dinner"], "Simmer soup 7.");
    }

    #[test]
    fn test_day_may_cover_subset_of_slots() {
        let mut md = String::new();
        for d in 1..=6 {
            md.push_str(&format!("- Day {}\n* Lunch: Eat.\n* Dinner: Eat more.\n", d));
        }
        md.push_str("- Day 7\n* Dinner: Leftovers.\n");

        let set = parse_instructions(&md, &SLOTS).unwrap();
        assert_eq!(set["Day 7"].len(), 1);
        assert!(!set["Day 7"].contains_key("Lunch"));
    }

    #[test]
    fn test_unexpected_slot_is_invalid() {
        let md = format!("{}* Breakfast: Toast.\n", week_text());
        let err = parse_instructions(&md, &SLOTS).unwrap_err();
        assert!(err.0.contains("Breakfast"));
    }

    #[test]
    fn test_six_days_is_invalid() {
        let md: String = (1..=6)
            .map(|d| format!("- Day {}\n* Dinner: Soup.\n", d))
            .collect();
        assert!(parse_instructions(&md, &SLOTS).is_err());
    }

    #[test]
    fn test_repeated_day_does_not_count_twice() {
        let mut md: String = (1..=6)
            .map(|d| format!("- Day {}\n* Dinner: Soup.\n", d))
            .collect();
        md.push_str("- Day 6\n* Dinner: Stew.\n");

        assert!(parse_instructions(&md, &SLOTS).is_err());
    }

    #[test]
    fn test_repeated_day_header_resets_day() {
        let mut md = week_text();
        md.push_str("- Day 3\n* Dinner: Pizza.\n");

        let set = parse_instructions(&md, &SLOTS).unwrap();
        assert_eq!(set["Day 3"].len(), 1);
        assert_eq!(set["Day 3"]["Dinner"], "Pizza.");
    }

    #[test]
    fn test_day_numbers_outside_week_are_invalid() {
        let md: String = (2..=8)
            .map(|d| format!("- Day {}\n* Dinner: Soup.\n", d))
            .collect();
        assert!(parse_instructions(&md, &SLOTS).is_err());
    }

    #[test]
    fn test_text_before_first_day_is_ignored() {
        let md = format!("Here you go!\n* Lunch: not a day yet\n{}", week_text());
        let set = parse_instructions(&md, &SLOTS).unwrap();
        assert_eq!(set.len(), 7);
    }

    #[test]
    fn test_case_insensitive_day_header_with_star() {
        let md: String = (1..=7)
            .map(|d| format!("* DAY {}\n* Dinner: Soup.\n", d))
            .collect();
        let set = parse_instructions(&md, &SLOTS).unwrap();
        assert!(set.contains_key("Day 4"));
    }

    #[test]
    fn test_meal_with_text_on_following_lines() {
        let md: String = (1..=7)
            .map(|d| format!("- Day {}\n* Dinner:\n1. Boil water.\n2. Add pasta.\n", d))
            .collect();
        let set = parse_instructions(&md, &SLOTS).unwrap();
        assert_eq!(set["Day 2"]["Dinner"], "1. Boil water.\n2. Add pasta.");
    }

    #[test]
    fn test_empty_meal_is_not_stored() {
        let md: String = (1..=7)
            .map(|d| format!("- Day {}\n* Lunch:\n* Dinner: Soup.\n", d))
            .collect();
        let set = parse_instructions(&md, &SLOTS).unwrap();
        assert!(!set["Day 1"].contains_key("Lunch"));
    }
}
