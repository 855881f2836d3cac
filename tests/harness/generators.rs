// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Deterministic request generators for abuse simulations.

use submission_gate::sanitizer::hash_identifier;
use submission_gate::submission::SubmissionRequest;

use super::valid_request;

/// Distinct hashed caller identifiers.
pub fn identifiers(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| hash_identifier(&format!("198.51.100.{}", i % 256)))
        .collect()
}

/// Source URLs that should clear the allowlist.
pub fn allowed_urls(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| format!("https://github.com/maker{i}"))
        .collect()
}

/// Source URLs that must be screened or rejected.
pub fn hostile_urls() -> Vec<String> {
    vec![
        "javascript:alert(document.cookie)".to_string(),
        "data:text/html,<script>fetch('//evil')</script>".to_string(),
        "file:///etc/shadow".to_string(),
        "203.0.113.66/phish".to_string(),
        "https://bit.ly/31337".to_string(),
        "https://evilgithub.com/legit-looking".to_string(),
        "https://github.com.attacker.net/user".to_string(),
        "https://github.com/a?onload=steal()".to_string(),
    ]
}

/// A submission whose text fields carry injection payloads.
pub fn injected_request(username: &str) -> SubmissionRequest {
    let mut request = valid_request(username);
    request.app_name = "<script>alert(1)</script>My App".to_string();
    request.summary = "A javascript:void app that does many onclick=hack things for people who like eleven words"
        .to_string();
    request.tags = vec!["<img onerror=x>".to_string(), "ok".to_string()];
    request
}

/// A submission with every text field oversized.
pub fn oversized_request(username: &str) -> SubmissionRequest {
    let mut request = valid_request(username);
    request.app_name = "N".repeat(10_000);
    request.tags = (0..50).map(|i| format!("tag{i}").repeat(40)).collect();
    request
}
