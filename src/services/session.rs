// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-session cache of raw model output.
//!
//! Instructions are generated from the raw plan text and the grocery list
//! from the raw instructions text, so both are kept between requests of the
//! same session. Entries live in memory only and go away on logout or expiry.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, NaiveDate, Utc};
use dashmap::DashMap;
use ring::rand::{SecureRandom, SystemRandom};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::error::AppError;

/// Raw model text and the week it was generated for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedText {
    pub raw: String,
    pub week: NaiveDate,
}

/// Intermediate state for one login session.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub plan: Option<CachedText>,
    pub instructions: Option<CachedText>,
    pub expires_at: DateTime<Utc>,
}

impl SessionContext {
    pub fn new(expires_at: DateTime<Utc>) -> Self {
        Self {
            plan: None,
            instructions: None,
            expires_at,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

pub type SharedSession = Arc<Mutex<SessionContext>>;

/// All live sessions, keyed by session id.
///
/// Each session has its own lock so a long generation for one user never
/// blocks another.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<DashMap<String, SharedSession>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fresh, empty session.
    pub fn start(&self, session_id: &str, expires_at: DateTime<Utc>) -> SharedSession {
        let context = Arc::new(Mutex::new(SessionContext::new(expires_at)));
        self.sessions
            .insert(session_id.to_string(), context.clone());
        context
    }

    /// Context for a session, creating an empty one if this instance has not
    /// seen the session yet (e.g. after a restart).
    pub fn context(&self, session_id: &str, expires_at: DateTime<Utc>) -> SharedSession {
        self.sessions
            .entry(session_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(SessionContext::new(expires_at))))
            .clone()
    }

    pub fn end(&self, session_id: &str) -> bool {
        self.sessions.remove(session_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Drop expired sessions. Sessions currently locked by a request are
    /// kept until the next sweep.
    pub fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, ctx| match ctx.try_lock() {
            Ok(guard) => !guard.is_expired(now),
            Err(_) => true,
        });
        let purged = before.saturating_sub(self.sessions.len());
        if purged > 0 {
            tracing::debug!(purged, "Purged expired sessions");
        }
        purged
    }
}

/// Random, URL-safe session identifier.
pub fn new_session_id() -> Result<String, AppError> {
    let mut bytes = [0u8; 24];
    SystemRandom::new()
        .fill(&mut bytes)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("failed to generate session id")))?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}
