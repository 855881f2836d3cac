// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Attack pattern configurations for the submission gate.

/// Attack pattern configuration.
#[derive(Debug, Clone)]
pub struct AttackConfig {
    /// Total submissions to fire
    pub total_requests: usize,
    /// Distinct caller identifiers
    pub unique_identifiers: usize,
    /// Use hostile source URLs instead of allowed ones
    pub hostile_urls: bool,
    /// Carry injection payloads in text fields
    pub injected_fields: bool,
}

impl Default for AttackConfig {
    fn default() -> Self {
        Self {
            total_requests: 20,
            unique_identifiers: 1,
            hostile_urls: false,
            injected_fields: false,
        }
    }
}

impl AttackConfig {
    /// One caller hammering the submission endpoint.
    pub fn quota_exhaustion() -> Self {
        Self {
            total_requests: 30,
            unique_identifiers: 1,
            ..Default::default()
        }
    }

    /// Many callers, each within their own budget.
    pub fn distributed_submissions() -> Self {
        Self {
            total_requests: 60,
            unique_identifiers: 60,
            ..Default::default()
        }
    }

    /// Malicious link storm: every source URL is hostile.
    pub fn malicious_url_storm() -> Self {
        Self {
            total_requests: 40,
            unique_identifiers: 8,
            hostile_urls: true,
            ..Default::default()
        }
    }

    /// Script/handler payloads in every text field.
    pub fn injection_probe() -> Self {
        Self {
            total_requests: 10,
            unique_identifiers: 10,
            injected_fields: true,
            ..Default::default()
        }
    }
}
