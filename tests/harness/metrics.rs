// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Outcome accounting for attack simulations.

use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Admitted,
    RateLimited,
    ValidationRejected,
    VerificationRejected,
}

/// Per-simulation tallies.
#[derive(Debug, Default)]
pub struct AttackMetrics {
    outcomes: HashMap<Outcome, usize>,
    admitted_per_identifier: HashMap<String, usize>,
}

impl AttackMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, outcome: Outcome, identifier: &str) {
        *self.outcomes.entry(outcome).or_default() += 1;
        if outcome == Outcome::Admitted {
            *self
                .admitted_per_identifier
                .entry(identifier.to_string())
                .or_default() += 1;
        }
    }

    pub fn count(&self, outcome: Outcome) -> usize {
        self.outcomes.get(&outcome).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.outcomes.values().sum()
    }

    pub fn admitted(&self) -> usize {
        self.count(Outcome::Admitted)
    }

    /// Largest number of admissions any single identifier achieved.
    pub fn max_admitted_per_identifier(&self) -> usize {
        self.admitted_per_identifier
            .values()
            .copied()
            .max()
            .unwrap_or(0)
    }
}

impl fmt::Display for AttackMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "attack simulation: {} requests", self.total())?;
        writeln!(f, "  admitted:              {}", self.count(Outcome::Admitted))?;
        writeln!(f, "  rate limited:          {}", self.count(Outcome::RateLimited))?;
        writeln!(f, "  validation rejected:   {}", self.count(Outcome::ValidationRejected))?;
        writeln!(
            f,
            "  verification rejected: {}",
            self.count(Outcome::VerificationRejected)
        )
    }
}
