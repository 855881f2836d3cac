// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Fixed-window rate limiting over a shared key/value store.
//!
//! One `{count, start_ms}` record per (class, identifier) pair, keyed
//! `"<prefix>:<identifier>"`. The window resets the instant `now -
//! start_ms >= window_ms` — a hard reset, not a rolling decay. Expiry
//! on increment is refreshed to the *remaining* window so a busy key
//! never extends its own window.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::error::Result;
use crate::storage::KvStore;

/// Limits for one limiter class.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub window_ms: u64,
}

impl RateLimitConfig {
    /// Submissions: 3 per 24 hours.
    pub fn submission() -> Self {
        Self {
            max_requests: 3,
            window_ms: 24 * 60 * 60 * 1000,
        }
    }

    /// Verification calls: 10 per hour.
    pub fn verification() -> Self {
        Self {
            max_requests: 10,
            window_ms: 60 * 60 * 1000,
        }
    }

    /// General API: 100 per minute.
    pub fn api_general() -> Self {
        Self {
            max_requests: 100,
            window_ms: 60 * 1000,
        }
    }
}

/// Stored window record, serialized as JSON in the KV store.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct WindowRecord {
    count: u32,
    start_ms: u64,
}

/// Outcome of a rate limit check.
#[derive(Debug, Clone, Serialize)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub remaining: u32,
    pub reset_at_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_secs: Option<u64>,
}

/// Fixed-window rate limiter for one class of requests.
///
/// Stateless between calls: every decision is a single get-then-put
/// against the store, safe to run from many concurrent instances.
pub struct RateLimiter {
    store: Arc<dyn KvStore>,
    config: RateLimitConfig,
    prefix: &'static str,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn KvStore>, config: RateLimitConfig, prefix: &'static str) -> Self {
        Self {
            store,
            config,
            prefix,
        }
    }

    pub fn submission(store: Arc<dyn KvStore>) -> Self {
        Self::new(store, RateLimitConfig::submission(), "submit")
    }

    pub fn verification(store: Arc<dyn KvStore>) -> Self {
        Self::new(store, RateLimitConfig::verification(), "verify")
    }

    pub fn api_general(store: Arc<dyn KvStore>) -> Self {
        Self::new(store, RateLimitConfig::api_general(), "api")
    }

    pub fn config(&self) -> RateLimitConfig {
        self.config
    }

    fn key(&self, identifier: &str) -> String {
        format!("{}:{}", self.prefix, identifier)
    }

    fn now_ms() -> u64 {
        chrono::Utc::now().timestamp_millis().max(0) as u64
    }

    /// Check and consume one unit of budget for `identifier`.
    pub async fn check(&self, identifier: &str) -> Result<RateLimitDecision> {
        self.check_at(identifier, Self::now_ms()).await
    }

    /// Window-boundary logic with an explicit clock, exercised directly
    /// by tests.
    pub async fn check_at(&self, identifier: &str, now_ms: u64) -> Result<RateLimitDecision> {
        let key = self.key(identifier);
        let record = self.read_record(&key).await?;

        let fresh = match record {
            None => true,
            Some(ref rec) => now_ms.saturating_sub(rec.start_ms) >= self.config.window_ms,
        };

        if fresh {
            // First request in a new window (or hard reset of an expired one)
            let rec = WindowRecord {
                count: 1,
                start_ms: now_ms,
            };
            self.write_record(&key, &rec, self.config.window_ms).await?;
            return Ok(RateLimitDecision {
                allowed: true,
                remaining: self.config.max_requests.saturating_sub(1),
                reset_at_ms: now_ms + self.config.window_ms,
                retry_after_secs: None,
            });
        }

        let rec = record.expect("live window checked above");
        let reset_at_ms = rec.start_ms + self.config.window_ms;

        if rec.count >= self.config.max_requests {
            let retry_after_secs = reset_at_ms.saturating_sub(now_ms).div_ceil(1000);
            debug!(key = %key, count = rec.count, retry_after_secs, "Rate limit exceeded");
            return Ok(RateLimitDecision {
                allowed: false,
                remaining: 0,
                reset_at_ms,
                retry_after_secs: Some(retry_after_secs),
            });
        }

        let updated = WindowRecord {
            count: rec.count + 1,
            start_ms: rec.start_ms,
        };
        let remaining_window_ms = reset_at_ms.saturating_sub(now_ms);
        self.write_record(&key, &updated, remaining_window_ms).await?;

        Ok(RateLimitDecision {
            allowed: true,
            remaining: self.config.max_requests.saturating_sub(updated.count),
            reset_at_ms,
            retry_after_secs: None,
        })
    }

    /// Mirror of the decision logic without consuming budget.
    pub async fn status(&self, identifier: &str) -> Result<RateLimitDecision> {
        self.status_at(identifier, Self::now_ms()).await
    }

    pub async fn status_at(&self, identifier: &str, now_ms: u64) -> Result<RateLimitDecision> {
        let key = self.key(identifier);
        let record = self.read_record(&key).await?;

        let live = match record {
            Some(ref rec) => now_ms.saturating_sub(rec.start_ms) < self.config.window_ms,
            None => false,
        };

        if !live {
            return Ok(RateLimitDecision {
                allowed: true,
                remaining: self.config.max_requests,
                reset_at_ms: now_ms + self.config.window_ms,
                retry_after_secs: None,
            });
        }

        let rec = record.expect("live window checked above");
        let reset_at_ms = rec.start_ms + self.config.window_ms;
        let allowed = rec.count < self.config.max_requests;

        Ok(RateLimitDecision {
            allowed,
            remaining: self.config.max_requests.saturating_sub(rec.count),
            reset_at_ms,
            retry_after_secs: if allowed {
                None
            } else {
                Some(reset_at_ms.saturating_sub(now_ms).div_ceil(1000))
            },
        })
    }

    /// Unconditionally forget the identifier's window.
    pub async fn reset(&self, identifier: &str) -> Result<()> {
        self.store.delete(&self.key(identifier)).await
    }

    async fn read_record(&self, key: &str) -> Result<Option<WindowRecord>> {
        let raw = self.store.get(key).await?;
        // A corrupt record is treated as absent rather than wedging the key
        Ok(raw.and_then(|json| serde_json::from_str(&json).ok()))
    }

    async fn write_record(&self, key: &str, rec: &WindowRecord, ttl_ms: u64) -> Result<()> {
        let json = serde_json::to_string(rec)
            .map_err(|e| crate::error::GateError::Internal(e.to_string()))?;
        self.store.put(key, json, ttl_ms.div_ceil(1000)).await
    }
}
