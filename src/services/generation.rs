// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Bounded retry generation.
//!
//! Each attempt sends the same prompt, trims the reply and runs the parser
//! for the requested kind. The first reply that parses wins. Provider errors
//! and parse failures are logged and consume an attempt; neither escapes.

use std::fmt;
use std::sync::Arc;

use crate::markdown::ParseInvalid;
use crate::models::QuizProfile;
use crate::services::llm::{ChatMessage, ChatModel, ChatRequest};

/// What is being generated. Selects prompt, sampling and parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationKind {
    Plan,
    Instructions,
    GroceryList,
}

impl GenerationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationKind::Plan => "meal plan",
            GenerationKind::Instructions => "instructions",
            GenerationKind::GroceryList => "grocery list",
        }
    }

    /// Fixed sampling settings for this kind.
    pub fn sampling(&self) -> SamplingParams {
        match self {
            GenerationKind::Plan => SamplingParams {
                system: "You are a helpful meal planning assistant.",
                temperature: 0.7,
                top_p: 0.9,
                max_tokens: 2500,
            },
            GenerationKind::Instructions => SamplingParams {
                system: "You are a structured meal instruction generator.",
                temperature: 0.5,
                top_p: 0.9,
                max_tokens: 5000,
            },
            GenerationKind::GroceryList => SamplingParams {
                system: "You are a helpful assistant that creates structured grocery lists from weekly meal plans.",
                temperature: 0.4,
                top_p: 0.9,
                max_tokens: 3000,
            },
        }
    }

    /// Wrap `prompt` into a complete request for this kind.
    pub fn request(&self, prompt: &str) -> ChatRequest {
        let params = self.sampling();
        ChatRequest {
            messages: vec![ChatMessage::system(params.system), ChatMessage::user(prompt)],
            temperature: params.temperature,
            top_p: params.top_p,
            max_tokens: params.max_tokens,
        }
    }
}

impl fmt::Display for GenerationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingParams {
    pub system: &'static str,
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
}

/// Prompt for a 7-day plan built from quiz answers.
pub fn plan_prompt(profile: &QuizProfile) -> String {
    format!(
        "Hello,\n\
         I am a {gender}, age: {age}, height: {height}, weight: {weight} and my goals are {reason}.\n\
         My preferred meal type is {meal_type}, my cooking skills are {skill} level. \
         I have ({restrictions}) allergy, if the brackets are empty then I don't have any allergy.\n\
         My favorite cuisines are {cuisine}.\n\
         \n\
         Generate a full 7-day meal plan for {slots} for me.\n\
         Don't send any extra text at all and the output should be in the following manner:\n\
         ### Day X: (X being 1 to 7)\n\
         * Breakfast/Lunch/Dinner: <meal>\n",
        gender = profile.gender,
        age = profile.age,
        height = profile.height,
        weight = profile.weight,
        reason = profile.reason,
        meal_type = profile.meal_type,
        skill = profile.skill_level,
        restrictions = profile.restrictions.join(", "),
        cuisine = profile.cuisine.join(", "),
        slots = profile.slot_names().join(", "),
    )
}

/// Prompt for cooking instructions covering a previously generated plan.
pub fn instructions_prompt(raw_plan: &str) -> String {
    format!(
        "The user has a 7-day meal plan formatted in markdown. For each day's meals, \
         provide detailed but concise step-by-step cooking instructions.\n\
         \n\
         Return the instructions in this format exactly:\n\
         - Day 1\n\
         \x20 * Breakfast: [step-by-step instructions]\n\
         \x20 * Lunch: [step-by-step instructions]\n\
         \x20 * Dinner: [step-by-step instructions]\n\
         - Day 2\n\
         \x20 ...\n\
         (Only include the meals listed in the plan. If a day only has Lunch and Dinner, include just those.)\n\
         \n\
         Here is the meal plan:\n\
         \n\
         {raw_plan}\n"
    )
}

/// Prompt for a grocery list derived from previously generated instructions.
pub fn grocery_prompt(raw_instructions: &str) -> String {
    format!(
        "I have the following 7-day meal plan's preparation instructions in markdown format. \
         Please analyze the plan and generate a grocery list.\n\
         \n\
         {raw_instructions}\n\
         \n\
         Do not send any extra text apart from the grocery list. Return the grocery list in the following format:\n\
         ### Category: (category being vegetables, spices, grains etc.)\n\
         * item (quantity)\n"
    )
}

/// A successful generation: trimmed raw text plus its parsed value.
#[derive(Debug, Clone, PartialEq)]
pub struct Generated<T> {
    pub raw: String,
    pub value: T,
    /// 1-based attempt that produced the value
    pub attempts: u32,
}

/// Every attempt failed to produce parseable output.
#[derive(Debug, Clone, thiserror::Error)]
#[error("could not generate the {kind} after {attempts} attempts")]
pub struct GenerationFailed {
    pub kind: GenerationKind,
    pub attempts: u32,
    /// Last text the model returned, for diagnostics only
    pub last_raw: Option<String>,
}

/// Sequential retry loop around a [`ChatModel`].
#[derive(Clone)]
pub struct RetryDriver {
    model: Arc<dyn ChatModel>,
    max_attempts: u32,
}

impl RetryDriver {
    /// `max_attempts` below 1 is treated as 1.
    pub fn new(model: Arc<dyn ChatModel>, max_attempts: u32) -> Self {
        Self {
            model,
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Call the model until `parse` accepts a reply or attempts run out.
    pub async fn generate<T, F>(
        &self,
        kind: GenerationKind,
        prompt: &str,
        parse: F,
    ) -> Result<Generated<T>, GenerationFailed>
    where
        F: Fn(&str) -> Result<T, ParseInvalid>,
    {
        let request = kind.request(prompt);
        let mut last_raw = None;

        for attempt in 1..=self.max_attempts {
            let raw = match self.model.complete(&request).await {
                Ok(text) => text.trim().to_string(),
                Err(e) => {
                    tracing::warn!(kind = %kind, attempt, error = %e, "Model call failed");
                    continue;
                }
            };

            match parse(&raw) {
                Ok(value) => {
                    tracing::info!(kind = %kind, attempt, "Generation succeeded");
                    return Ok(Generated {
                        raw,
                        value,
                        attempts: attempt,
                    });
                }
                Err(e) => {
                    tracing::warn!(kind = %kind, attempt, error = %e, "Model output rejected");
                    last_raw = Some(raw);
                }
            }
        }

        tracing::error!(
            kind = %kind,
            attempts = self.max_attempts,
            "Generation failed after all attempts"
        );
        if let Some(raw) = &last_raw {
            tracing::debug!(kind = %kind, raw = %raw, "Last rejected output");
        }

        Err(GenerationFailed {
            kind,
            attempts: self.max_attempts,
            last_raw,
        })
    }
}
