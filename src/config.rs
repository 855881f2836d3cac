// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Configuration for the submission gate service.

use serde::{Deserialize, Serialize};

use crate::limiter::RateLimitConfig;

/// Service configuration, env-overridable in `main`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address (default: 0.0.0.0:8080)
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Single origin allowed by CORS (default: http://localhost:5173)
    #[serde(default = "default_allowed_origin")]
    pub allowed_origin: String,

    /// Oracle credential. Absent ⇒ verification unconditionally fails
    /// and search degrades to local keyword mode.
    #[serde(default, skip_serializing)]
    pub oracle_api_key: Option<String>,

    /// Rate limit classes
    #[serde(default)]
    pub limits: LimitsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    #[serde(default = "RateLimitConfig::submission")]
    pub submission: RateLimitConfig,

    #[serde(default = "RateLimitConfig::verification")]
    pub verification: RateLimitConfig,

    #[serde(default = "RateLimitConfig::api_general")]
    pub api_general: RateLimitConfig,
}

fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_allowed_origin() -> String {
    "http://localhost:5173".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            allowed_origin: default_allowed_origin(),
            oracle_api_key: None,
            limits: LimitsConfig::default(),
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            submission: RateLimitConfig::submission(),
            verification: RateLimitConfig::verification(),
            api_general: RateLimitConfig::api_general(),
        }
    }
}

impl Config {
    /// Load from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let mut config = Config {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| default_bind_addr()),
            allowed_origin: std::env::var("ALLOWED_ORIGIN")
                .unwrap_or_else(|_| default_allowed_origin()),
            oracle_api_key: std::env::var("OPENROUTER_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
            limits: LimitsConfig::default(),
        };

        if let Some(max) = env_u32("SUBMISSION_MAX_REQUESTS") {
            config.limits.submission.max_requests = max;
        }
        if let Some(max) = env_u32("VERIFICATION_MAX_REQUESTS") {
            config.limits.verification.max_requests = max;
        }
        if let Some(max) = env_u32("API_MAX_REQUESTS") {
            config.limits.api_general.max_requests = max;
        }

        config
    }
}

fn env_u32(key: &str) -> Option<u32> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}
