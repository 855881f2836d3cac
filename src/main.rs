// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Submission Gate Service
//!
//! HTTP gate in front of a community app directory. Validates,
//! rate-limits, and identity-verifies submissions before they reach
//! review/storage.
//!
//! ## Configuration
//!
//! Loaded from environment variables:
//!
//! - `BIND_ADDR`: server bind address (default: 0.0.0.0:8080)
//! - `ALLOWED_ORIGIN`: single CORS origin (default: http://localhost:5173)
//! - `OPENROUTER_API_KEY`: oracle credential; when absent, verification
//!   always fails closed and search runs in local keyword mode
//! - `SUBMISSION_MAX_REQUESTS`, `VERIFICATION_MAX_REQUESTS`,
//!   `API_MAX_REQUESTS`: per-class limit overrides

use axum::{
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use submission_gate::{
    config::Config,
    handlers::{self, AppState},
    limiter::RateLimiter,
    oracle::{ChatOracle, OpenRouterOracle},
    search::SearchService,
    storage::{KvStore, MemoryStore},
    submission::SubmissionPipeline,
    validator::{UrlPolicy, UrlValidator},
    verifier::IdentityVerifier,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let config = Config::from_env();
    info!(
        bind_addr = %config.bind_addr,
        allowed_origin = %config.allowed_origin,
        oracle_configured = config.oracle_api_key.is_some(),
        submission_limit = config.limits.submission.max_requests,
        "Starting submission gate"
    );

    let oracle: Option<Arc<dyn ChatOracle>> = match &config.oracle_api_key {
        Some(key) => Some(Arc::new(
            OpenRouterOracle::new(key)
                .with_site_url(&config.allowed_origin)
                .with_app_name("Vibe Hub"),
        )),
        None => {
            warn!("No oracle credential configured; verification will fail closed");
            None
        }
    };

    let memory_store = Arc::new(MemoryStore::new());
    let store: Arc<dyn KvStore> = memory_store.clone();

    let pipeline = SubmissionPipeline::new(
        UrlValidator::new(UrlPolicy::default()),
        RateLimiter::new(store.clone(), config.limits.submission, "submit"),
        RateLimiter::new(store.clone(), config.limits.verification, "verify"),
        IdentityVerifier::new(oracle.clone()),
        store.clone(),
    );

    let state = Arc::new(AppState {
        pipeline,
        api_limiter: RateLimiter::new(store.clone(), config.limits.api_general, "api"),
        submission_limiter: RateLimiter::new(store.clone(), config.limits.submission, "submit"),
        url_validator: UrlValidator::new(UrlPolicy::default()),
        search: SearchService::new(oracle),
        catalog: Vec::new(),
        config: config.clone(),
    });

    // Reclaim expired store entries periodically
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        loop {
            interval.tick().await;
            memory_store.sweep().await;
        }
    });

    let cors = CorsLayer::new()
        .allow_origin(config.allowed_origin.parse::<HeaderValue>()?)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
        ]);

    let app = Router::new()
        .route("/health", get(handlers::health))
        .route("/healthz", get(handlers::health))
        .route("/api/submit", post(handlers::submit))
        .route("/api/verify", post(handlers::verify))
        .route("/api/validate-url", post(handlers::validate_url))
        .route("/api/search", post(handlers::search))
        .route("/api/limits", get(handlers::limits))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr: SocketAddr = config.bind_addr.parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "Server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
