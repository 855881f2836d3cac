// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Untrusted-input hygiene for submission fields.
//!
//! Everything here is a pure, total function: any input, including
//! oversized or garbage text, comes back as a safe (possibly empty)
//! value. Stripping is a best-effort pre-filter, not a security
//! boundary — rendered output must still go through [`escape_html`].

use regex::Regex;
use std::sync::LazyLock;
use uuid::Uuid;

static JS_PROTOCOL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)javascript:").unwrap());
static EVENT_HANDLER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)on\w+=").unwrap());
static WHITESPACE_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

pub const MAX_NAME_LEN: usize = 100;
pub const MAX_SUMMARY_LEN: usize = 200;
pub const MAX_CREATOR_LEN: usize = 100;
pub const MAX_TAG_LEN: usize = 50;
pub const MAX_TAGS: usize = 2;
pub const MAX_SCREENSHOT_BYTES: usize = 5 * 1024 * 1024;

pub const ALLOWED_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp"];

const VALID_CATEGORIES: &[&str] = &[
    "Productivity & Tools",
    "Design & Creative",
    "AI & Experimental",
    "Lifestyle & Niche",
];

const VALID_LANGUAGES: &[&str] = &["en", "zh-TW", "zh-CN"];

/// Strip angle brackets, `javascript:` protocol and inline event
/// handlers, then trim. Protocol/handler stripping runs before any
/// caller-side truncation so a clamp can never re-expose a split token.
///
/// Stripping repeats until the text stops changing: removing one token
/// can splice its surroundings into a fresh one (`javajavascript:script:`
/// loses the inner token and becomes `javascript:`), so a single pass
/// would hand back text the sanitizer itself still rejects.
pub fn sanitize_text(input: &str) -> String {
    let mut stripped: String = input.chars().filter(|c| *c != '<' && *c != '>').collect();
    loop {
        let pass = JS_PROTOCOL_RE.replace_all(&stripped, "").into_owned();
        let pass = EVENT_HANDLER_RE.replace_all(&pass, "").into_owned();
        if pass == stripped {
            break;
        }
        stripped = pass;
    }
    stripped.trim().to_string()
}

/// Entity-escape for HTML rendering. Distinct from [`sanitize_text`]:
/// this preserves content, the other removes it. Do not compose them.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '/' => out.push_str("&#x2F;"),
            _ => out.push(c),
        }
    }
    out
}

/// Truncate to at most `max_chars` characters at a char boundary,
/// then collapse internal whitespace runs to a single space.
fn clamp_and_collapse(input: &str, max_chars: usize) -> String {
    let clamped: String = input.chars().take(max_chars).collect();
    WHITESPACE_RUN_RE.replace_all(&clamped, " ").trim().to_string()
}

pub fn sanitize_app_name(name: &str) -> String {
    clamp_and_collapse(&sanitize_text(name), MAX_NAME_LEN)
}

pub fn sanitize_summary(summary: &str) -> String {
    clamp_and_collapse(&sanitize_text(summary), MAX_SUMMARY_LEN)
}

pub fn sanitize_creator(name: &str) -> String {
    clamp_and_collapse(&sanitize_text(name), MAX_CREATOR_LEN)
}

/// Sanitize and clamp tags; at most two survive, later tags are
/// silently dropped rather than rejected.
pub fn sanitize_tags(tags: &[String]) -> Vec<String> {
    tags.iter()
        .map(|tag| {
            sanitize_text(tag)
                .chars()
                .take(MAX_TAG_LEN)
                .collect::<String>()
        })
        .filter(|tag| !tag.is_empty())
        .take(MAX_TAGS)
        .collect()
}

/// Submission-acceptance gate: 10–20 whitespace-delimited words.
pub fn valid_summary_word_count(summary: &str) -> bool {
    let words = summary.split_whitespace().count();
    (10..=20).contains(&words)
}

pub fn valid_image_type(content_type: &str) -> bool {
    ALLOWED_IMAGE_TYPES.contains(&content_type)
}

/// Boundary is inclusive: a file of exactly 5 MiB is accepted.
pub fn valid_image_size(byte_len: usize) -> bool {
    byte_len <= MAX_SCREENSHOT_BYTES
}

pub fn valid_category(category: &str) -> bool {
    VALID_CATEGORIES.contains(&category)
}

pub fn valid_language(language: &str) -> bool {
    VALID_LANGUAGES.contains(&language)
}

/// Replace the caller-supplied stem with a UUID, keeping only a
/// lowercased extension. No caller text survives into the filename.
pub fn secure_filename(original: &str) -> String {
    let extension = original
        .rsplit('.')
        .next()
        .filter(|ext| !ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| ext.to_lowercase())
        .unwrap_or_else(|| "jpg".to_string());
    format!("{}.{}", Uuid::new_v4(), extension)
}

/// One-way FNV-1a fold of a caller identifier (IP or handle) into a
/// short hex token. Fairness-grade only, not cryptographic.
pub fn hash_identifier(raw: &str) -> String {
    let mut hash: u64 = 0xcbf29ce484222325;
    for byte in raw.as_bytes() {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x100000001b3);
    }
    format!("{hash:016x}")
}
