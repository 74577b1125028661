// crates/object-contract-core/src/assertions.rs
// ============================================================================
// Module: Contract Assertions
// Description: Predicates checked against decoded response bodies.
// Purpose: Report every mismatch with predicate, expected, and actual values.
// Dependencies: serde_json, crate::{error, value}
// ============================================================================

//! ## Overview
//! Each predicate is checkable on its own once a body is decoded. Failures
//! carry the step the body came from, so [`ContractAssertions`] is bound to a
//! step and every predicate hangs off it.

use serde_json::Value;

use crate::error::ContractViolation;
use crate::error::ViolationKind;
use crate::gate::StatusPolicy;
use crate::payload::ID_FIELD;
use crate::step::StepKind;
use crate::value::DecodedBody;
use crate::value::normalize_text;

/// Placeholder used for the observed side of empty bodies.
const EMPTY: &str = "<empty>";

/// Predicate set bound to the step whose response is being judged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContractAssertions {
    /// Step attributed on failure.
    step: StepKind,
}

impl ContractAssertions {
    /// Binds the predicates to a step.
    #[must_use]
    pub const fn at(step: StepKind) -> Self {
        Self {
            step,
        }
    }

    /// Body is present and not an empty value.
    ///
    /// # Errors
    ///
    /// Returns an `empty_body` violation for null, `""`, `[]`, or `{}`.
    pub fn non_empty_body(&self, body: &DecodedBody) -> Result<(), ContractViolation> {
        if body.is_empty() {
            let actual = normalize_text(body.value()).unwrap_or_else(|_| EMPTY.to_string());
            return Err(ContractViolation::new(
                ViolationKind::EmptyBody,
                self.step,
                "non_empty_body",
                "non-empty body",
                actual,
            ));
        }
        Ok(())
    }

    /// Body carries a non-null, non-empty `id`; returns it as text.
    ///
    /// # Errors
    ///
    /// Returns a `missing_identifier` violation otherwise.
    pub fn has_identifier(&self, body: &DecodedBody) -> Result<String, ContractViolation> {
        let missing = |actual: String| {
            ContractViolation::new(
                ViolationKind::MissingIdentifier,
                self.step,
                "has_identifier",
                "non-empty id",
                actual,
            )
        };
        let id = body.text_field(ID_FIELD).map_err(|err| missing(err.to_string()))?;
        if id.trim().is_empty() {
            return Err(missing(format!("id \"{id}\"")));
        }
        Ok(id)
    }

    /// Body `id`, normalized to text, equals `expected`.
    ///
    /// # Errors
    ///
    /// Returns an `identifier_mismatch` violation otherwise.
    pub fn identifier_matches(
        &self,
        body: &DecodedBody,
        expected: &str,
    ) -> Result<(), ContractViolation> {
        let actual = body.text_field(ID_FIELD).map_err(|err| {
            ContractViolation::new(
                ViolationKind::IdentifierMismatch,
                self.step,
                "identifier_matches",
                expected,
                err.to_string(),
            )
        })?;
        if actual != expected {
            return Err(ContractViolation::new(
                ViolationKind::IdentifierMismatch,
                self.step,
                "identifier_matches",
                expected,
                actual,
            ));
        }
        Ok(())
    }

    /// Named field equals `expected` after normalization.
    ///
    /// # Errors
    ///
    /// Returns a `field_mismatch` violation when the field is absent or
    /// differs.
    pub fn field_equals(
        &self,
        body: &DecodedBody,
        field: &str,
        expected: &Value,
    ) -> Result<(), ContractViolation> {
        let predicate = "field_equals";
        let expected_text = normalize_text(expected).map_err(|message| {
            ContractViolation::new(
                ViolationKind::UndecodableBody,
                self.step,
                predicate,
                format!("{field} comparable"),
                message,
            )
        })?;
        let mismatch = |actual: String| {
            ContractViolation::new(
                ViolationKind::FieldMismatch,
                self.step,
                predicate,
                format!("{field} = {expected_text}"),
                actual,
            )
        };
        let observed = body.field(field).map_err(|err| mismatch(err.to_string()))?;
        let actual_text = normalize_text(observed).map_err(mismatch)?;
        if actual_text != expected_text {
            return Err(mismatch(format!("{field} = {actual_text}")));
        }
        Ok(())
    }

    /// `body` carries exactly the fields of `reference`, each equal after
    /// normalization.
    ///
    /// # Errors
    ///
    /// Returns a `field_mismatch` violation for a changed, dropped, or added
    /// field, or `undecodable_body` when either body is not an object.
    pub fn same_fields(
        &self,
        body: &DecodedBody,
        reference: &DecodedBody,
    ) -> Result<(), ContractViolation> {
        let expected =
            reference.fields().map_err(|err| ContractViolation::undecodable(self.step, &err))?;
        for (field, value) in expected {
            self.field_equals(body, field, value)?;
        }
        let observed =
            body.fields().map_err(|err| ContractViolation::undecodable(self.step, &err))?;
        let added = observed.iter().find(|(field, _)| !expected.contains_key(field.as_str()));
        if let Some((field, value)) = added {
            let actual = normalize_text(value).unwrap_or_else(|message| message);
            return Err(ContractViolation::new(
                ViolationKind::FieldMismatch,
                self.step,
                "same_fields",
                format!("{field} absent"),
                format!("{field} = {actual}"),
            ));
        }
        Ok(())
    }

    /// Status falls in the expected class.
    ///
    /// # Errors
    ///
    /// Returns an `unexpected_status` violation otherwise.
    pub fn status_is(&self, expected: StatusPolicy, status: u16) -> Result<(), ContractViolation> {
        if expected.admits(status) {
            return Ok(());
        }
        Err(ContractViolation::new(
            ViolationKind::UnexpectedStatus,
            self.step,
            "status_is",
            expected.as_str(),
            status.to_string(),
        ))
    }
}
