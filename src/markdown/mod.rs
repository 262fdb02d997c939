// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strict parsers for model-generated markdown.
//!
//! Each parser either returns a fully validated value or [`ParseInvalid`].
//! Malformed input is never repaired: the caller retries the generation
//! instead.

pub mod grocery;
pub mod instructions;
pub mod plan;

pub use grocery::parse_grocery;
pub use instructions::parse_instructions;
pub use plan::parse_plan;

/// Raw text did not match the expected grammar.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid markdown: {0}")]
pub struct ParseInvalid(pub String);

impl ParseInvalid {
    pub(crate) fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}
