// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Submission orchestration.
//!
//! Sequences the gate stages, short-circuiting on the first failure:
//! required fields, sanitization gates, source URL validation, both
//! rate-limit classes, then the costly identity verification, and
//! finally persistence of the pending record. Nothing is retried here;
//! a failed submission must be resubmitted whole.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{GateError, Result};
use crate::limiter::RateLimiter;
use crate::sanitizer;
use crate::storage::KvStore;
use crate::validator::{usernames_match, UrlValidator};
use crate::verifier::{IdentityVerifier, Screenshot, VerificationResult};

/// Pending records are parked this long for review before expiring.
const SUBMISSION_TTL_SECS: u64 = 30 * 24 * 60 * 60;

/// Raw inbound submission. Every field is required; absence is a
/// validation error before any external call is made.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmissionRequest {
    #[serde(default)]
    pub app_name: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub creator: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub source_url: String,
    #[serde(default)]
    pub language: String,
    /// Base64-encoded screenshot bytes.
    #[serde(default)]
    pub screenshot: String,
    #[serde(default)]
    pub screenshot_type: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Pending,
    Approved,
    Rejected,
}

/// Admitted record handed to the external review/storage lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub id: String,
    pub app_name: String,
    pub summary: String,
    pub tags: Vec<String>,
    pub creator: String,
    pub category: String,
    pub source_url: String,
    pub language: String,
    pub verification: VerificationResult,
    pub status: SubmissionStatus,
    pub submitted_at: DateTime<Utc>,
    /// Hashed caller identifier, never a raw IP.
    pub submitter: String,
}

/// What an admitted caller gets back.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionReceipt {
    pub submission_id: String,
    pub verification: VerificationResult,
}

/// The submission gate pipeline.
pub struct SubmissionPipeline {
    url_validator: UrlValidator,
    submission_limiter: RateLimiter,
    verification_limiter: RateLimiter,
    verifier: IdentityVerifier,
    store: Arc<dyn KvStore>,
}

impl SubmissionPipeline {
    pub fn new(
        url_validator: UrlValidator,
        submission_limiter: RateLimiter,
        verification_limiter: RateLimiter,
        verifier: IdentityVerifier,
        store: Arc<dyn KvStore>,
    ) -> Self {
        Self {
            url_validator,
            submission_limiter,
            verification_limiter,
            verifier,
            store,
        }
    }

    /// Run the full gate for one submission. `identifier` is the
    /// already-hashed caller identity used for rate limiting.
    pub async fn submit(
        &self,
        request: SubmissionRequest,
        identifier: &str,
    ) -> Result<SubmissionReceipt> {
        check_required(&request)?;

        // Sanitize before anything external sees the fields
        let app_name = sanitizer::sanitize_app_name(&request.app_name);
        let summary = sanitizer::sanitize_summary(&request.summary);
        let creator = sanitizer::sanitize_creator(&request.creator);
        let tags = sanitizer::sanitize_tags(&request.tags);

        if app_name.is_empty() {
            return Err(GateError::MissingField("app_name"));
        }
        if creator.is_empty() {
            return Err(GateError::MissingField("creator"));
        }
        if tags.is_empty() {
            return Err(GateError::InvalidInput("At least one tag is required".to_string()));
        }
        if !sanitizer::valid_summary_word_count(&summary) {
            return Err(GateError::InvalidInput("Summary must be 10-20 words".to_string()));
        }
        if !sanitizer::valid_category(&request.category) {
            return Err(GateError::InvalidInput("Invalid category".to_string()));
        }
        if !sanitizer::valid_language(&request.language) {
            return Err(GateError::InvalidInput("Invalid language".to_string()));
        }

        let screenshot = decode_screenshot(&request.screenshot, &request.screenshot_type)?;

        let url_result = self.url_validator.validate(&request.source_url);
        if !url_result.valid {
            return Err(map_url_error(url_result.error.as_deref()));
        }

        // Cheap checks done; spend rate-limit budget before the oracle
        let decision = self.submission_limiter.check(identifier).await?;
        if !decision.allowed {
            return Err(GateError::RateLimitExceeded {
                retry_after_secs: decision.retry_after_secs.unwrap_or(0),
            });
        }

        let decision = self.verification_limiter.check(identifier).await?;
        if !decision.allowed {
            return Err(GateError::RateLimitExceeded {
                retry_after_secs: decision.retry_after_secs.unwrap_or(0),
            });
        }

        // The claimed handle is the one cited by the source link when
        // the platform exposes it, otherwise the creator field
        let claimed = url_result
            .username
            .clone()
            .unwrap_or_else(|| creator.clone());

        let verification = self
            .verifier
            .verify(&screenshot, &claimed, &request.source_url)
            .await;
        drop(screenshot); // image is consumed here, never persisted

        apply_verdict(&verification, &claimed)?;

        let record = SubmissionRecord {
            id: Uuid::new_v4().to_string(),
            app_name,
            summary,
            tags,
            creator,
            category: request.category,
            source_url: request.source_url,
            language: request.language,
            verification: verification.clone(),
            status: SubmissionStatus::Pending,
            submitted_at: Utc::now(),
            submitter: identifier.to_string(),
        };

        let json = serde_json::to_string(&record)
            .map_err(|e| GateError::Internal(e.to_string()))?;
        self.store
            .put(&format!("submission:{}", record.id), json, SUBMISSION_TTL_SECS)
            .await?;

        info!(
            submission_id = %record.id,
            confidence = verification.confidence,
            "Submission admitted as pending"
        );

        Ok(SubmissionReceipt {
            submission_id: record.id,
            verification,
        })
    }

    /// Verification-only entry point (the pre-submit probe the client
    /// UI uses). Consumes verification-class budget only.
    pub async fn verify_only(
        &self,
        screenshot: Screenshot,
        claimed_username: &str,
        source_url: &str,
        identifier: &str,
    ) -> Result<VerificationResult> {
        if !sanitizer::valid_image_type(&screenshot.content_type) {
            return Err(GateError::InvalidFileType(screenshot.content_type.clone()));
        }
        if !sanitizer::valid_image_size(screenshot.data.len()) {
            return Err(GateError::FileTooLarge {
                max_bytes: sanitizer::MAX_SCREENSHOT_BYTES,
            });
        }

        let url_result = self.url_validator.validate(source_url);
        if !url_result.valid {
            return Err(map_url_error(url_result.error.as_deref()));
        }

        let decision = self.verification_limiter.check(identifier).await?;
        if !decision.allowed {
            return Err(GateError::RateLimitExceeded {
                retry_after_secs: decision.retry_after_secs.unwrap_or(0),
            });
        }

        Ok(self
            .verifier
            .verify(&screenshot, claimed_username, source_url)
            .await)
    }
}

fn check_required(request: &SubmissionRequest) -> Result<()> {
    if request.app_name.trim().is_empty() {
        return Err(GateError::MissingField("app_name"));
    }
    if request.summary.trim().is_empty() {
        return Err(GateError::MissingField("summary"));
    }
    if request.creator.trim().is_empty() {
        return Err(GateError::MissingField("creator"));
    }
    if request.category.trim().is_empty() {
        return Err(GateError::MissingField("category"));
    }
    if request.source_url.trim().is_empty() {
        return Err(GateError::MissingField("source_url"));
    }
    if request.language.trim().is_empty() {
        return Err(GateError::MissingField("language"));
    }
    if request.screenshot.is_empty() {
        return Err(GateError::MissingField("screenshot"));
    }
    Ok(())
}

fn decode_screenshot(encoded: &str, content_type: &str) -> Result<Screenshot> {
    use base64::Engine;

    if !sanitizer::valid_image_type(content_type) {
        return Err(GateError::InvalidFileType(content_type.to_string()));
    }

    let data = base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|_| GateError::UploadFailed("screenshot is not valid base64".to_string()))?;

    if !sanitizer::valid_image_size(data.len()) {
        return Err(GateError::FileTooLarge {
            max_bytes: sanitizer::MAX_SCREENSHOT_BYTES,
        });
    }

    Ok(Screenshot {
        content_type: content_type.to_string(),
        data,
    })
}

fn map_url_error(error: Option<&str>) -> GateError {
    match error {
        Some("URL contains suspicious patterns") => GateError::MaliciousUrl,
        Some(msg) if msg.starts_with("Domain") => GateError::DomainNotAllowed(msg.to_string()),
        _ => GateError::InvalidUrl,
    }
}

/// Verdict policy: the oracle's `verified` flag is advisory and can
/// only reject; admission additionally requires the pipeline's own
/// username comparison to pass.
fn apply_verdict(verification: &VerificationResult, claimed: &str) -> Result<()> {
    if !verification.verified {
        let reason = verification
            .reason
            .clone()
            .unwrap_or_else(|| "screenshot does not verify the claimed identity".to_string());
        debug!(reason = %reason, "Verification rejected by oracle");
        return Err(GateError::VerificationFailed(reason));
    }

    match &verification.extracted_username {
        None => Err(GateError::ScreenshotUnclear),
        Some(extracted) if !usernames_match(claimed, extracted) => {
            debug!(claimed = %claimed, extracted = %extracted, "Username mismatch");
            Err(GateError::UsernameMismatch)
        }
        Some(_) => Ok(()),
    }
}
