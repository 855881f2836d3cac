// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Error types for the submission gate.
//!
//! Every pipeline stage maps its failure into one of these variants;
//! nothing propagates past the orchestrator as an untyped fault. The
//! string codes are stable and part of the API response contract.

use thiserror::Error;

/// Gate error taxonomy, one variant per rejectable stage outcome.
#[derive(Debug, Error, Clone)]
pub enum GateError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid file type: {0}")]
    InvalidFileType(String),

    #[error("File exceeds maximum size of {max_bytes} bytes")]
    FileTooLarge { max_bytes: usize },

    #[error("Invalid URL format")]
    InvalidUrl,

    #[error("URL contains suspicious patterns")]
    MaliciousUrl,

    #[error("Domain not allowed: {0}")]
    DomainNotAllowed(String),

    #[error("Rate limit exceeded, retry in {retry_after_secs}s")]
    RateLimitExceeded { retry_after_secs: u64 },

    #[error("Verification failed: {0}")]
    VerificationFailed(String),

    #[error("Screenshot username does not match claimed username")]
    UsernameMismatch,

    #[error("Could not read a username from the screenshot")]
    ScreenshotUnclear,

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl GateError {
    /// Stable machine-readable code for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingField(_) => "MISSING_REQUIRED_FIELD",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::InvalidFileType(_) => "INVALID_FILE_TYPE",
            Self::FileTooLarge { .. } => "FILE_TOO_LARGE",
            Self::InvalidUrl => "INVALID_URL",
            Self::MaliciousUrl => "MALICIOUS_URL",
            Self::DomainNotAllowed(_) => "DOMAIN_NOT_ALLOWED",
            Self::RateLimitExceeded { .. } => "RATE_LIMIT_EXCEEDED",
            Self::VerificationFailed(_) => "VERIFICATION_FAILED",
            Self::UsernameMismatch => "USERNAME_MISMATCH",
            Self::ScreenshotUnclear => "SCREENSHOT_UNCLEAR",
            Self::UploadFailed(_) => "UPLOAD_FAILED",
            Self::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Retry delay in seconds, present only for rate-limit rejections.
    pub fn retry_after_secs(&self) -> Option<u64> {
        match self {
            Self::RateLimitExceeded { retry_after_secs } => Some(*retry_after_secs),
            _ => None,
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, GateError>;
