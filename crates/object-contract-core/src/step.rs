// crates/object-contract-core/src/step.rs
// ============================================================================
// Module: Lifecycle Steps
// Description: Labels for the individual HTTP steps of a lifecycle case.
// Purpose: Attribute diagnostics and violations to the step that produced them.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Labels for the HTTP exchanges of a case.

use std::fmt;

use serde::Serialize;

/// One HTTP exchange within a lifecycle case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    /// `GET /objects`.
    List,
    /// `POST /objects`.
    Create,
    /// `GET /objects/{id}`.
    Read,
    /// `PUT /objects/{id}`.
    Update,
    /// `DELETE /objects/{id}`.
    Delete,
    /// `GET /objects/{id}` after a delete, expected to be absent.
    VerifyDeleted,
}

impl StepKind {
    /// Returns the stable label used in diagnostics and reports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::VerifyDeleted => "verify_deleted",
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
