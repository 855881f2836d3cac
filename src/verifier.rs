// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Screenshot identity verification via the vision oracle.
//!
//! The verifier never fails loudly: a missing credential, a transport
//! error, or an unparseable oracle reply all come back as an
//! unverified result with a human-readable reason. The encoded image
//! lives only for the duration of the call and is never stored or
//! logged.

use base64::Engine;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

use crate::oracle::{
    extract_json_object, ChatMessage, ChatOracle, ChatRequest, ContentPart, ImageUrl,
};

const VERIFIER_MODEL: &str = "google/gemini-2.0-flash-exp:free";

/// A screenshot as received from the submitter.
#[derive(Debug, Clone)]
pub struct Screenshot {
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Outcome of one verification attempt. Produced once, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationResult {
    pub verified: bool,
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extracted_username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl VerificationResult {
    fn unverified(reason: impl Into<String>) -> Self {
        Self {
            verified: false,
            confidence: 0.0,
            extracted_username: None,
            reason: Some(reason.into()),
        }
    }
}

/// What the oracle is asked to return.
#[derive(Debug, Deserialize)]
struct OracleVerdict {
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    confidence: f64,
    #[serde(default)]
    verified: bool,
    #[serde(default)]
    reason: Option<String>,
}

/// Identity verifier over a chat oracle. The oracle is optional:
/// without one, every attempt degrades to an unverified result.
pub struct IdentityVerifier {
    oracle: Option<Arc<dyn ChatOracle>>,
}

impl IdentityVerifier {
    pub fn new(oracle: Option<Arc<dyn ChatOracle>>) -> Self {
        Self { oracle }
    }

    /// Verify that the screenshot shows the claimed username.
    pub async fn verify(
        &self,
        screenshot: &Screenshot,
        claimed_username: &str,
        source_url: &str,
    ) -> VerificationResult {
        let Some(oracle) = &self.oracle else {
            return VerificationResult::unverified("API key not configured");
        };

        let request = build_request(screenshot, claimed_username, source_url);

        let content = match oracle.complete(request).await {
            Ok(content) => content,
            Err(err) => {
                info!(error = %err, "Verification transport failure");
                return VerificationResult::unverified(err.to_string());
            }
        };

        let Some(json) = extract_json_object(&content) else {
            debug!("No JSON object in oracle verification reply");
            return VerificationResult::unverified("Could not parse AI response");
        };

        let verdict: OracleVerdict = match serde_json::from_str(json) {
            Ok(v) => v,
            Err(_) => {
                debug!("Malformed JSON object in oracle verification reply");
                return VerificationResult::unverified("Could not parse AI response");
            }
        };

        VerificationResult {
            verified: verdict.verified,
            confidence: verdict.confidence.clamp(0.0, 1.0),
            extracted_username: verdict.username.filter(|u| !u.trim().is_empty()),
            reason: verdict.reason,
        }
    }
}

fn build_request(screenshot: &Screenshot, claimed_username: &str, source_url: &str) -> ChatRequest {
    let prompt = format!(
        "Analyze this screenshot and extract the username/account name visible in the image.\n\
         Look for profile names, @handles, or account identifiers.\n\
         The user claims their username is: \"{claimed_username}\"\n\
         The source URL is: {source_url}\n\n\
         Return ONLY a JSON object with this structure:\n\
         {{\n\
           \"username\": \"extracted username from image\",\n\
           \"confidence\": 0.0-1.0,\n\
           \"verified\": true/false,\n\
           \"reason\": \"brief explanation\"\n\
         }}\n\n\
         Compare the extracted username with the claimed username (case-insensitive, ignore @ prefix).\n\
         Set verified to true only if they match."
    );

    let encoded = base64::engine::general_purpose::STANDARD.encode(&screenshot.data);
    let data_uri = format!("data:{};base64,{}", screenshot.content_type, encoded);

    ChatRequest {
        model: VERIFIER_MODEL.to_string(),
        messages: vec![ChatMessage {
            role: "user",
            content: vec![
                ContentPart::Text { text: prompt },
                ContentPart::ImageUrl {
                    image_url: ImageUrl { url: data_uri },
                },
            ],
        }],
        temperature: 0.3,
        max_tokens: 500,
    }
}
