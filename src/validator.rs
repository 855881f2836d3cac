// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Source URL validation and malicious-link screening.
//!
//! The screen runs against the raw string before parsing: a string
//! that the URL parser would choke on must still be pattern-checked.
//! Order of checks is fixed and the first failure wins.

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;
use tracing::debug;
use url::Url;

static SUSPICIOUS_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"^\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}", // bare IP literal
        r"(?i)^data:",
        r"(?i)^javascript:",
        r"(?i)^file:",
        r"(?i)<script",
        r"(?i)on\w+=",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Configuration for URL validation.
#[derive(Debug, Clone)]
pub struct UrlPolicy {
    /// Root domains accepted for source links (exact or dot-suffix match)
    pub allowed_domains: Vec<String>,
    /// Substrings that block a domain outright (shorteners, lookalikes)
    pub blocked_domains: Vec<String>,
}

impl Default for UrlPolicy {
    fn default() -> Self {
        Self {
            allowed_domains: vec![
                "threads.net".to_string(),
                "github.com".to_string(),
                "twitter.com".to_string(),
                "x.com".to_string(),
            ],
            blocked_domains: vec!["bit.ly".to_string(), "tinyurl.com".to_string()],
        }
    }
}

/// Outcome of validating a source URL. Derived per call, never stored.
#[derive(Debug, Clone, Serialize)]
pub struct UrlValidation {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl UrlValidation {
    fn reject(error: impl Into<String>) -> Self {
        Self {
            valid: false,
            domain: None,
            username: None,
            error: Some(error.into()),
        }
    }
}

/// Source URL validator.
pub struct UrlValidator {
    policy: UrlPolicy,
}

impl UrlValidator {
    pub fn new(policy: UrlPolicy) -> Self {
        Self { policy }
    }

    /// Validate a source URL string.
    ///
    /// Check order: emptiness, raw-string suspicious patterns, parse,
    /// scheme, blocklist, allowlist, then username extraction.
    pub fn validate(&self, url_string: &str) -> UrlValidation {
        if url_string.trim().is_empty() {
            return UrlValidation::reject("URL is required");
        }

        for pattern in SUSPICIOUS_PATTERNS.iter() {
            if pattern.is_match(url_string) {
                debug!(url = %url_string, "Suspicious pattern in URL");
                return UrlValidation::reject("URL contains suspicious patterns");
            }
        }

        let url = match Url::parse(url_string) {
            Ok(u) => u,
            Err(_) => return UrlValidation::reject("Invalid URL format"),
        };

        if !matches!(url.scheme(), "http" | "https") {
            return UrlValidation::reject("Only HTTP/HTTPS protocols are allowed");
        }

        let domain = match url.host_str() {
            Some(host) => host.to_lowercase(),
            None => return UrlValidation::reject("Invalid URL format"),
        };

        for blocked in &self.policy.blocked_domains {
            if domain.contains(blocked.as_str()) {
                debug!(domain = %domain, blocked = %blocked, "Blocked domain");
                return UrlValidation::reject("Domain is blocked");
            }
        }

        let allowed = self.policy.allowed_domains.iter().any(|root| {
            domain == *root || domain.ends_with(&format!(".{root}"))
        });
        if !allowed {
            return UrlValidation::reject(format!(
                "Domain not allowed. Allowed domains: {}",
                self.policy.allowed_domains.join(", ")
            ));
        }

        let username = extract_username(&domain, url.path());

        UrlValidation {
            valid: true,
            domain: Some(domain),
            username,
            error: None,
        }
    }
}

impl Default for UrlValidator {
    fn default() -> Self {
        Self::new(UrlPolicy::default())
    }
}

/// Extract the platform username from an allowed URL's path.
///
/// GitHub/Twitter/X use the first path segment; Threads strips an
/// optional leading `@`. Allowed domains without a known platform
/// shape yield no username.
fn extract_username(domain: &str, path: &str) -> Option<String> {
    let first_segment = path.trim_start_matches('/').split('/').next()?;
    if first_segment.is_empty() {
        return None;
    }

    if domain == "github.com" || domain.ends_with(".github.com") {
        return Some(first_segment.to_string());
    }
    if domain == "threads.net" || domain.ends_with(".threads.net") {
        return Some(first_segment.trim_start_matches('@').to_string());
    }
    if domain == "twitter.com"
        || domain.ends_with(".twitter.com")
        || domain == "x.com"
        || domain.ends_with(".x.com")
    {
        return Some(first_segment.to_string());
    }

    None
}

/// Normalize a username for comparison: lowercase, strip a single
/// leading `@`, trim.
pub fn normalize_username(username: &str) -> String {
    username
        .trim()
        .trim_start_matches('@')
        .to_lowercase()
        .trim()
        .to_string()
}

/// Case-insensitive, `@`-prefix-insensitive match. Two empty or
/// whitespace-only usernames never match.
pub fn usernames_match(a: &str, b: &str) -> bool {
    let a = normalize_username(a);
    let b = normalize_username(b);
    !a.is_empty() && !b.is_empty() && a == b
}
