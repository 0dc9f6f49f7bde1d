// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

/// Production API base.
pub const DEFAULT_API_URL: &str = "https://recycle-market-be.vercel.app/api";
/// Directory holding durable local state (the persisted session).
pub const DEFAULT_STATE_DIR: &str = ".recycle-market";
/// Indonesian calling code; sellers enter local numbers like `0812...`.
pub const DEFAULT_COUNTRY_CODE: &str = "62";

/// Client configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL every endpoint path is resolved against (no trailing slash)
    pub api_url: String,
    /// Where the persisted identity lives
    pub state_dir: PathBuf,
    /// Calling code used when formatting seller phone numbers
    pub country_code: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let api_url = normalize_api_url(
            &env::var("RECYCLE_MARKET_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
        )?;

        Ok(Self {
            api_url,
            state_dir: env::var("RECYCLE_MARKET_STATE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_STATE_DIR)),
            country_code: env::var("RECYCLE_MARKET_COUNTRY_CODE")
                .ok()
                .map(|v| v.trim().trim_start_matches('+').to_string())
                .filter(|v| !v.is_empty() && v.chars().all(|c| c.is_ascii_digit()))
                .unwrap_or_else(|| DEFAULT_COUNTRY_CODE.to_string()),
        })
    }

    /// Fixed offline config for tests.
    pub fn test_default() -> Self {
        Self {
            api_url: "http://127.0.0.1:9/api".to_string(),
            state_dir: env::temp_dir().join("recycle-market-test"),
            country_code: DEFAULT_COUNTRY_CODE.to_string(),
        }
    }
}

fn normalize_api_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid {
            name: "RECYCLE_MARKET_API_URL",
            reason: "must not be empty".to_string(),
        });
    }
    Ok(trimmed.to_string())
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}
