// crates/object-contract-core/src/error.rs
// ============================================================================
// Module: Contract Errors
// Description: Failure taxonomy for lifecycle cases.
// Purpose: Separate transport failures from contract violations.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! A case ends in one of two ways short of passing. A [`ContractViolation`]
//! means the API answered but broke the contract; it always names the
//! predicate, the expected value, and the observed value. A transport failure
//! means no answer was obtained. Neither is retried or recovered.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::step::StepKind;
use crate::transport::TransportError;
use crate::value::DecodeError;

// ============================================================================
// SECTION: Violations
// ============================================================================

/// Classification of a contract violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// Status code outside the step's policy.
    UnexpectedStatus,
    /// Create succeeded without a usable `id`.
    MissingIdentifier,
    /// Body `id` differs from the identifier requested.
    IdentifierMismatch,
    /// A field differs from its expected value.
    FieldMismatch,
    /// Body carries no content.
    EmptyBody,
    /// Body could not be decoded into the shape the step needs.
    UndecodableBody,
}

impl ViolationKind {
    /// Returns the stable label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UnexpectedStatus => "unexpected_status",
            Self::MissingIdentifier => "missing_identifier",
            Self::IdentifierMismatch => "identifier_mismatch",
            Self::FieldMismatch => "field_mismatch",
            Self::EmptyBody => "empty_body",
            Self::UndecodableBody => "undecodable_body",
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Observed behavior deviated from the lifecycle contract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} at {step}: {predicate} expected {expected}, observed {actual}")]
pub struct ContractViolation {
    /// Classification.
    pub kind: ViolationKind,
    /// Step whose response violated the contract.
    pub step: StepKind,
    /// Predicate that failed.
    pub predicate: &'static str,
    /// Expected value or class.
    pub expected: String,
    /// Observed value.
    pub actual: String,
}

impl ContractViolation {
    /// Builds a violation.
    #[must_use]
    pub fn new(
        kind: ViolationKind,
        step: StepKind,
        predicate: &'static str,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            step,
            predicate,
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Builds the violation for a body that could not be decoded.
    #[must_use]
    pub fn undecodable(step: StepKind, error: &DecodeError) -> Self {
        let kind = match error {
            DecodeError::EmptyBody => ViolationKind::EmptyBody,
            _ => ViolationKind::UndecodableBody,
        };
        Self::new(kind, step, "decode_body", "json body", error.to_string())
    }
}

// ============================================================================
// SECTION: Case Errors
// ============================================================================

/// Reason a case stopped before passing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaseError {
    /// The HTTP layer could not complete the call.
    #[error("transport failure at {step}: {source}")]
    Transport {
        /// Step whose request failed.
        step: StepKind,
        /// Underlying transport error.
        #[source]
        source: TransportError,
    },
    /// The API answered but broke the contract.
    #[error(transparent)]
    Violation(#[from] ContractViolation),
}

impl CaseError {
    /// Returns the violation, if this is one.
    #[must_use]
    pub const fn violation(&self) -> Option<&ContractViolation> {
        match self {
            Self::Violation(violation) => Some(violation),
            Self::Transport {
                ..
            } => None,
        }
    }
}
