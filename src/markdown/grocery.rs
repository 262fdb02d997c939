// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Grocery list parser.
//!
//! Every non-blank line must be either a category header (`### Name:`) or an
//! item (`* Name (quantity)`). Anything else rejects the whole list.

use lazy_static::lazy_static;
use regex::Regex;

use super::ParseInvalid;
use crate::models::plan::{GroceryItem, GroceryList};

lazy_static! {
    static ref CATEGORY_HEADER: Regex = Regex::new(r"^###\s+([^:]+):").unwrap();
    static ref ITEM_LINE: Regex = Regex::new(r"^\*\s+(.+?)\s*\(([^)]+)\)$").unwrap();
}

pub fn parse_grocery(markdown: &str) -> Result<GroceryList, ParseInvalid> {
    let mut list = GroceryList::new();
    let mut current: Option<String> = None;

    for line in markdown.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if let Some(caps) = CATEGORY_HEADER.captures(line) {
            let category = caps[1].trim();
            if category.is_empty() {
                return Err(ParseInvalid::new("empty category name"));
            }
            if let Some(prev) = current.take() {
                ensure_not_empty(&list, &prev)?;
            }
            list.insert(category.to_string(), Vec::new());
            current = Some(category.to_string());
            continue;
        }

        if let Some(caps) = ITEM_LINE.captures(line) {
            let Some(category) = current.as_ref() else {
                return Err(ParseInvalid::new(format!(
                    "item before any category: {}",
                    line
                )));
            };
            let item = caps[1].trim();
            let quantity = caps[2].trim();
            if item.is_empty() || quantity.is_empty() {
                return Err(ParseInvalid::new(format!("empty item or quantity: {}", line)));
            }
            list.entry(category.clone()).or_default().push(GroceryItem {
                item: item.to_string(),
                quantity: quantity.to_string(),
            });
            continue;
        }

        return Err(ParseInvalid::new(format!("unexpected line: {}", line)));
    }

    match current {
        Some(last) => ensure_not_empty(&list, &last)?,
        None => return Err(ParseInvalid::new("no categories")),
    }

    Ok(list)
}

fn ensure_not_empty(list: &GroceryList, category: &str) -> Result<(), ParseInvalid> {
    if !list.get(category).is_some_and(|items| !items.is_empty()) {
        return Err(ParseInvalid::new(format!("category {} has no items", category)));
    }
    Ok(())
}
