// crates/object-contract-core/src/gate.rs
// ============================================================================
// Module: Status Gate
// Description: Status-code policies applied to captured responses.
// Purpose: Fail fast on HTTP-level outcomes before any body is inspected.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Every step declares a [`StatusPolicy`]; the gate checks the captured status
//! against it before the body is decoded.
//! Invariants:
//! - A rejected status stops the case with `unexpected_status` at that step.
//! - Verification after delete admits only 404.

use std::fmt;

use serde::Serialize;

use crate::assertions::ContractAssertions;
use crate::capture::CapturedResponse;
use crate::error::ContractViolation;

/// Status expectation of a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusPolicy {
    /// Any 2xx status.
    Success,
    /// Exactly 404.
    NotFound,
}

impl StatusPolicy {
    /// Returns true when the status satisfies the policy.
    #[must_use]
    pub fn admits(self, status: u16) -> bool {
        match self {
            Self::Success => (200..=299).contains(&status),
            Self::NotFound => status == 404,
        }
    }

    /// Returns the status class label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "2xx",
            Self::NotFound => "404",
        }
    }
}

impl fmt::Display for StatusPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Gate applied to every captured response under the step's policy.
pub struct SuccessGate;

impl SuccessGate {
    /// Checks the captured status against the policy.
    ///
    /// # Errors
    ///
    /// Returns an `unexpected_status` [`ContractViolation`] when the status is
    /// outside the policy.
    pub fn check(
        policy: StatusPolicy,
        response: &CapturedResponse,
    ) -> Result<(), ContractViolation> {
        ContractAssertions::at(response.step()).status_is(policy, response.status())
    }
}
