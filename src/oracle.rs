// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Chat-completion oracle transport.
//!
//! The oracle is an external vision-capable model behind an
//! OpenRouter-style `/chat/completions` endpoint. Its replies are
//! adversarial by assumption: the JSON we asked for may arrive wrapped
//! in prose or markdown fences, so extraction scans for the first
//! balanced object/array rather than parsing the whole string.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

const OPENROUTER_API_URL: &str = "https://openrouter.ai/api/v1";

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("no API credential configured")]
    MissingCredential,

    #[error("oracle transport error: {0}")]
    Transport(String),

    #[error("oracle API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("no content in oracle response")]
    EmptyResponse,
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: Vec<ContentPart>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum ContentPart {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "image_url")]
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
pub struct ImageUrl {
    pub url: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

// =============================================================================
// Oracle trait + OpenRouter implementation
// =============================================================================

/// One bounded network call, no internal retries. Returns the first
/// choice's message content verbatim.
#[async_trait]
pub trait ChatOracle: Send + Sync {
    async fn complete(&self, request: ChatRequest) -> Result<String, OracleError>;
}

pub struct OpenRouterOracle {
    api_key: String,
    http: reqwest::Client,
    site_url: Option<String>,
    app_name: Option<String>,
}

impl OpenRouterOracle {
    pub fn new(api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            http: reqwest::Client::new(),
            site_url: None,
            app_name: None,
        }
    }

    pub fn with_site_url(mut self, url: &str) -> Self {
        self.site_url = Some(url.to_string());
        self
    }

    pub fn with_app_name(mut self, name: &str) -> Self {
        self.app_name = Some(name.to_string());
        self
    }

    fn headers(&self) -> Result<HeaderMap, OracleError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.api_key))
                .map_err(|e| OracleError::Transport(e.to_string()))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(ref url) = self.site_url {
            if let Ok(val) = HeaderValue::from_str(url) {
                headers.insert("HTTP-Referer", val);
            }
        }
        if let Some(ref name) = self.app_name {
            if let Ok(val) = HeaderValue::from_str(name) {
                headers.insert("X-Title", val);
            }
        }

        Ok(headers)
    }
}

#[async_trait]
impl ChatOracle for OpenRouterOracle {
    async fn complete(&self, request: ChatRequest) -> Result<String, OracleError> {
        let url = format!("{OPENROUTER_API_URL}/chat/completions");

        debug!(model = %request.model, "Oracle chat request");

        let response = self
            .http
            .post(&url)
            .headers(self.headers()?)
            .json(&request)
            .send()
            .await
            .map_err(|e| OracleError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(OracleError::Api { status, body });
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| OracleError::Transport(e.to_string()))?;

        chat.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(OracleError::EmptyResponse)
    }
}

// =============================================================================
// Embedded-JSON extraction
// =============================================================================

/// Strip markdown code fences from a response.
fn strip_code_fences(response: &str) -> &str {
    response
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

/// Locate the first balanced `{...}` substring and return it.
///
/// Brace counting skips string literals and escapes, so prose like
/// `Sure! {"verified":true} thanks` yields just the object.
pub fn extract_json_object(content: &str) -> Option<&str> {
    extract_balanced(strip_code_fences(content), '{', '}')
}

/// Locate the first balanced `[...]` substring and return it.
pub fn extract_json_array(content: &str) -> Option<&str> {
    extract_balanced(strip_code_fences(content), '[', ']')
}

fn extract_balanced(content: &str, open: char, close: char) -> Option<&str> {
    let start = content.find(open)?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in content[start..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            c if c == open && !in_string => depth += 1,
            c if c == close && !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&content[start..start + offset + c.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}
