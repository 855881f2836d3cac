// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP handlers for the submission gate service.
//!
//! Thin layer over the pipeline: hash the caller identity, spend
//! general-API budget, run the requested stage, and render typed
//! errors as the JSON envelope the clients expect. Raw oracle text and
//! raw IPs never appear in a response.

use axum::{
    extract::{ConnectInfo, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::GateError;
use crate::limiter::{RateLimitDecision, RateLimiter};
use crate::sanitizer::hash_identifier;
use crate::search::{CatalogApp, SearchHit, SearchService};
use crate::submission::{SubmissionPipeline, SubmissionReceipt, SubmissionRequest};
use crate::validator::UrlValidator;
use crate::verifier::{Screenshot, VerificationResult};

/// Shared application state.
pub struct AppState {
    pub pipeline: SubmissionPipeline,
    pub api_limiter: RateLimiter,
    pub submission_limiter: RateLimiter,
    pub url_validator: UrlValidator,
    pub search: SearchService,
    pub catalog: Vec<CatalogApp>,
    pub config: Config,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_secs: Option<u64>,
}

impl IntoResponse for GateError {
    fn into_response(self) -> Response {
        let status = match &self {
            GateError::MissingField(_)
            | GateError::InvalidInput(_)
            | GateError::InvalidFileType(_)
            | GateError::FileTooLarge { .. }
            | GateError::InvalidUrl
            | GateError::MaliciousUrl
            | GateError::DomainNotAllowed(_)
            | GateError::UploadFailed(_) => StatusCode::BAD_REQUEST,
            GateError::RateLimitExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
            GateError::VerificationFailed(_)
            | GateError::UsernameMismatch
            | GateError::ScreenshotUnclear => StatusCode::UNPROCESSABLE_ENTITY,
            GateError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            GateError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = ErrorResponse {
            error: self.to_string(),
            code: self.code(),
            retry_after_secs: self.retry_after_secs(),
        };

        match self.retry_after_secs() {
            Some(secs) => (status, [("Retry-After", secs.to_string())], Json(body)).into_response(),
            None => (status, Json(body)).into_response(),
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "submission-gate",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// =============================================================================
// /api/submit
// =============================================================================

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub success: bool,
    pub submission_id: String,
    pub verification: VerificationResult,
    pub message: &'static str,
}

pub async fn submit(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(request): Json<SubmissionRequest>,
) -> Result<Json<SubmitResponse>, GateError> {
    let identifier = hash_identifier(&addr.ip().to_string());
    debug!(identifier = %identifier, app_name = %request.app_name, "Submission received");

    consume_api_budget(&state, &identifier).await?;

    let SubmissionReceipt {
        submission_id,
        verification,
    } = state.pipeline.submit(request, &identifier).await?;

    info!(submission_id = %submission_id, "Submission accepted for review");

    Ok(Json(SubmitResponse {
        success: true,
        submission_id,
        verification,
        message: "Submission received! Your app will be reviewed shortly.",
    }))
}

// =============================================================================
// /api/verify
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub claimed_username: String,
    pub source_url: String,
    /// Base64-encoded screenshot bytes.
    pub screenshot: String,
    pub screenshot_type: String,
}

pub async fn verify(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(request): Json<VerifyRequest>,
) -> Result<Json<VerificationResult>, GateError> {
    use base64::Engine;

    let identifier = hash_identifier(&addr.ip().to_string());
    consume_api_budget(&state, &identifier).await?;

    let data = base64::engine::general_purpose::STANDARD
        .decode(request.screenshot.trim())
        .map_err(|_| GateError::UploadFailed("screenshot is not valid base64".to_string()))?;

    let screenshot = Screenshot {
        content_type: request.screenshot_type,
        data,
    };

    let result = state
        .pipeline
        .verify_only(
            screenshot,
            &request.claimed_username,
            &request.source_url,
            &identifier,
        )
        .await?;

    Ok(Json(result))
}

// =============================================================================
// /api/validate-url
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct ValidateUrlRequest {
    pub url: String,
}

pub async fn validate_url(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(request): Json<ValidateUrlRequest>,
) -> Result<Response, GateError> {
    let identifier = hash_identifier(&addr.ip().to_string());
    consume_api_budget(&state, &identifier).await?;

    Ok(Json(state.url_validator.validate(&request.url)).into_response())
}

// =============================================================================
// /api/search
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub results: Vec<SearchHit>,
}

pub async fn search(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, GateError> {
    let identifier = hash_identifier(&addr.ip().to_string());
    consume_api_budget(&state, &identifier).await?;

    let results = state.search.search(&request.query, &state.catalog).await;
    Ok(Json(SearchResponse { results }))
}

// =============================================================================
// /api/limits
// =============================================================================

#[derive(Debug, Serialize)]
pub struct LimitsResponse {
    pub submission: RateLimitDecision,
}

/// Non-mutating view of the caller's submission budget.
pub async fn limits(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> Result<Json<LimitsResponse>, GateError> {
    let identifier = hash_identifier(&addr.ip().to_string());
    let submission = state.submission_limiter.status(&identifier).await?;
    Ok(Json(LimitsResponse { submission }))
}

async fn consume_api_budget(state: &AppState, identifier: &str) -> Result<(), GateError> {
    let decision = state.api_limiter.check(identifier).await?;
    if !decision.allowed {
        return Err(GateError::RateLimitExceeded {
            retry_after_secs: decision.retry_after_secs.unwrap_or(0),
        });
    }
    Ok(())
}
