// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Submission Gate
//!
//! This crate turns an untrusted (screenshot, claimed-identity,
//! source-URL) triple into an admit/reject decision for a community
//! app directory:
//!
//! - Input sanitization and file hygiene for every submitted field
//! - Source URL allow/block listing with malicious-pattern screening
//! - Per-identifier fixed-window rate limiting over a shared KV store
//! - Screenshot identity verification through a vision oracle
//! - An orchestrator that sequences the stages and maps every failure
//!   to a typed, stable-coded error

pub mod config;
pub mod error;
pub mod handlers;
pub mod limiter;
pub mod oracle;
pub mod sanitizer;
pub mod search;
pub mod storage;
pub mod submission;
pub mod validator;
pub mod verifier;

pub use config::Config;
pub use error::{GateError, Result};
pub use limiter::{RateLimitConfig, RateLimitDecision, RateLimiter};
pub use storage::{KvStore, MemoryStore};
pub use submission::{SubmissionPipeline, SubmissionRecord, SubmissionRequest};
pub use validator::{usernames_match, UrlPolicy, UrlValidator};
pub use verifier::{IdentityVerifier, Screenshot, VerificationResult};
