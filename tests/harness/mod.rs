// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Shared test harness: pipeline builders, scripted oracles, request
//! generators, and attack metrics.

#![allow(dead_code)]

pub mod attacks;
pub mod generators;
pub mod metrics;

use async_trait::async_trait;
use base64::Engine;
use std::sync::Arc;

use submission_gate::limiter::{RateLimitConfig, RateLimiter};
use submission_gate::oracle::{ChatOracle, ChatRequest, OracleError};
use submission_gate::storage::{KvStore, MemoryStore};
use submission_gate::submission::{SubmissionPipeline, SubmissionRequest};
use submission_gate::validator::{UrlPolicy, UrlValidator};
use submission_gate::verifier::IdentityVerifier;

/// Oracle that replies with a fixed string (or a transport error).
pub struct ScriptedOracle {
    pub reply: Option<String>,
}

impl ScriptedOracle {
    /// Approves any claimed username by echoing it back as extracted.
    pub fn approving(username: &str) -> Self {
        Self {
            reply: Some(format!(
                r#"{{"username":"{username}","confidence":0.92,"verified":true,"reason":"handle visible in profile header"}}"#
            )),
        }
    }

    pub fn rejecting(reason: &str) -> Self {
        Self {
            reply: Some(format!(
                r#"{{"username":null,"confidence":0.1,"verified":false,"reason":"{reason}"}}"#
            )),
        }
    }

    pub fn unavailable() -> Self {
        Self { reply: None }
    }
}

#[async_trait]
impl ChatOracle for ScriptedOracle {
    async fn complete(&self, _request: ChatRequest) -> Result<String, OracleError> {
        self.reply
            .clone()
            .ok_or_else(|| OracleError::Transport("oracle unavailable".to_string()))
    }
}

/// Store wrapper that records every key written, for asserting what
/// the pipeline did (the KV trait has no scan).
pub struct RecordingStore {
    inner: MemoryStore,
    pub puts: tokio::sync::Mutex<Vec<String>>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryStore::new(),
            puts: tokio::sync::Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl KvStore for RecordingStore {
    async fn get(&self, key: &str) -> submission_gate::Result<Option<String>> {
        self.inner.get(key).await
    }

    async fn put(&self, key: &str, value: String, ttl_secs: u64) -> submission_gate::Result<()> {
        self.puts.lock().await.push(key.to_string());
        self.inner.put(key, value, ttl_secs).await
    }

    async fn delete(&self, key: &str) -> submission_gate::Result<()> {
        self.inner.delete(key).await
    }
}

/// Build a pipeline over the given store and oracle with the standard
/// limit classes.
pub fn build_pipeline(store: Arc<dyn KvStore>, oracle: Arc<dyn ChatOracle>) -> SubmissionPipeline {
    build_pipeline_with_limits(
        store,
        Some(oracle),
        RateLimitConfig::submission(),
        RateLimitConfig::verification(),
    )
}

pub fn build_pipeline_with_limits(
    store: Arc<dyn KvStore>,
    oracle: Option<Arc<dyn ChatOracle>>,
    submission: RateLimitConfig,
    verification: RateLimitConfig,
) -> SubmissionPipeline {
    SubmissionPipeline::new(
        UrlValidator::new(UrlPolicy::default()),
        RateLimiter::new(store.clone(), submission, "submit"),
        RateLimiter::new(store.clone(), verification, "verify"),
        IdentityVerifier::new(oracle),
        store,
    )
}

/// A well-formed submission from `username` that passes every local gate.
pub fn valid_request(username: &str) -> SubmissionRequest {
    SubmissionRequest {
        app_name: "Budget Buddy".to_string(),
        summary: "Track shared expenses with friends and settle up without awkward spreadsheet math involved"
            .to_string(),
        tags: vec!["finance".to_string(), "tools".to_string()],
        creator: username.to_string(),
        category: "Productivity & Tools".to_string(),
        source_url: format!("https://github.com/{username}"),
        language: "en".to_string(),
        screenshot: encoded_screenshot(),
        screenshot_type: "image/png".to_string(),
    }
}

pub fn encoded_screenshot() -> String {
    base64::engine::general_purpose::STANDARD.encode([0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a])
}
