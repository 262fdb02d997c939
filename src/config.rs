// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Secrets (the JWT key and the model provider key) are read once at startup
//! and never hard-coded.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// GCP project ID
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    /// Session token lifetime
    pub session_ttl: Duration,
    /// OpenAI-compatible completion endpoint
    pub llm_base_url: String,
    pub llm_model: String,
    pub llm_timeout: Duration,
    pub db_timeout: Duration,
    /// Model calls per generation before giving up (at least 1)
    pub max_generation_attempts: u32,

    // --- Secrets ---
    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    pub llm_api_key: String,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            frontend_url: "http://localhost:3001".to_string(),
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            session_ttl: Duration::from_secs(60 * 60),
            llm_base_url: "http://127.0.0.1:9/v1".to_string(),
            llm_model: "test-model".to_string(),
            llm_timeout: Duration::from_secs(5),
            db_timeout: Duration::from_secs(5),
            max_generation_attempts: 3,
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            llm_api_key: "test_llm_key".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables (and `.env` if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3001".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: parse_or("PORT", 8080),
            session_ttl: Duration::from_secs(parse_or::<u64>("SESSION_TTL_MINUTES", 60) * 60),
            llm_base_url: env::var("LLM_BASE_URL")
                .unwrap_or_else(|_| "https://api.groq.com/openai/v1".to_string()),
            llm_model: env::var("LLM_MODEL").unwrap_or_else(|_| "llama3-8b-8192".to_string()),
            llm_timeout: Duration::from_secs(parse_or("LLM_TIMEOUT_SECS", 60)),
            db_timeout: Duration::from_secs(parse_or("DB_TIMEOUT_SECS", 10)),
            max_generation_attempts: parse_or::<u32>("MAX_GENERATION_ATTEMPTS", 3).max(1),

            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
            llm_api_key: env::var("LLM_API_KEY")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("LLM_API_KEY"))?,
        })
    }
}

/// Parse an optional variable, falling back to `default` when unset or invalid.
fn parse_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    // Single test so env mutations don't race with each other.
    #[test]
    fn test_config_from_env() {
        env::remove_var("LLM_API_KEY");
        env::set_var("JWT_SIGNING_KEY", "test_jwt_key_32_bytes_minimum!!");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::Missing("LLM_API_KEY"))
        ));

        env::set_var("LLM_API_KEY", " gsk_test \n");
        env::set_var("MAX_GENERATION_ATTEMPTS", "0");
        env::set_var("SESSION_TTL_MINUTES", "not-a-number");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.llm_api_key, "gsk_test");
        assert_eq!(config.max_generation_attempts, 1);
        assert_eq!(config.session_ttl, Duration::from_secs(3600));
        assert_eq!(config.port, 8080);
        assert_eq!(config.llm_model, "llama3-8b-8192");
    }

    #[test]
    fn test_default_is_usable_for_tests() {
        let config = Config::default();
        assert!(config.jwt_signing_key.len() >= 31);
        assert_eq!(config.max_generation_attempts, 3);
    }
}
