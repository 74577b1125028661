// crates/object-contract-core/src/scenarios.rs
// ============================================================================
// Module: Contract Scenarios
// Description: The five canonical lifecycle cases.
// Purpose: Compose orchestrator steps and assertions into runnable cases.
// Dependencies: serde, serde_json, crate::{lifecycle, assertions, payload}
// ============================================================================

//! ## Overview
//! Each scenario creates and consumes its own object, so scenarios share no
//! state and may run concurrently against the same service. The flat
//! `{name, description}` payload is used where only `id` and `name` matter;
//! the update scenario uses the nested `{name, data}` variant so the full
//! replacement can be observed on `data` as well.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::assertions::ContractAssertions;
use crate::error::CaseError;
use crate::lifecycle::LifecycleOrchestrator;
use crate::payload::ObjectPayload;
use crate::step::StepKind;
use crate::value::DecodedBody;

// ============================================================================
// SECTION: Scenario Catalog
// ============================================================================

/// Canonical lifecycle case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    /// `GET /objects` succeeds with a non-empty listing.
    ListObjects,
    /// Create succeeds and echoes an `id` and the submitted name.
    CreateObject,
    /// A created object reads back under its own `id`, identically twice.
    ReadCreatedObject,
    /// A full replacement is echoed and persisted.
    UpdateObject,
    /// A deleted object reads back as 404.
    DeleteObject,
}

impl Scenario {
    /// Every scenario, in canonical order.
    pub const ALL: [Self; 5] = [
        Self::ListObjects,
        Self::CreateObject,
        Self::ReadCreatedObject,
        Self::UpdateObject,
        Self::DeleteObject,
    ];

    /// Returns the case name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ListObjects => "list_objects",
            Self::CreateObject => "create_object",
            Self::ReadCreatedObject => "read_created_object",
            Self::UpdateObject => "update_object",
            Self::DeleteObject => "delete_object",
        }
    }

    /// Returns a one-line description.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::ListObjects => "GET /objects returns 2xx and a non-empty body",
            Self::CreateObject => "POST /objects returns 2xx, an id, and the submitted name",
            Self::ReadCreatedObject => {
                "GET /objects/{id} after create returns the same id and fields on repeated reads"
            }
            Self::UpdateObject => {
                "PUT /objects/{id} echoes the replacement and a following read reflects it"
            }
            Self::DeleteObject => "DELETE /objects/{id} returns 2xx and a following read is 404",
        }
    }

    /// Looks up a scenario by case name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|scenario| scenario.name() == name.trim())
    }

    /// Runs the case to completion or to its first failure.
    ///
    /// # Errors
    ///
    /// Returns the [`CaseError`] that stopped the case.
    pub async fn run(self, orchestrator: &LifecycleOrchestrator) -> Result<(), CaseError> {
        match self {
            Self::ListObjects => list_objects(orchestrator).await,
            Self::CreateObject => create_object(orchestrator).await,
            Self::ReadCreatedObject => read_created_object(orchestrator).await,
            Self::UpdateObject => update_object(orchestrator).await,
            Self::DeleteObject => delete_object(orchestrator).await,
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// SECTION: Payloads
// ============================================================================

/// Flat payload used by the simple cases.
#[must_use]
pub fn sample_payload() -> ObjectPayload {
    ObjectPayload::described("Test Object", "This is a test object")
}

/// Nested payload with `color` and `capacity` data.
#[must_use]
pub fn device_payload(name: &str, color: &str, capacity: &str) -> ObjectPayload {
    let mut data = Map::new();
    data.insert("color".to_string(), Value::String(color.to_string()));
    data.insert("capacity".to_string(), Value::String(capacity.to_string()));
    ObjectPayload::with_data(name, data)
}

// ============================================================================
// SECTION: Cases
// ============================================================================

/// Listing succeeds and is non-empty.
async fn list_objects(orchestrator: &LifecycleOrchestrator) -> Result<(), CaseError> {
    let listing = orchestrator.list().await?;
    ContractAssertions::at(StepKind::List).non_empty_body(&listing)?;
    Ok(())
}

/// Create returns an identifier and the submitted fields.
async fn create_object(orchestrator: &LifecycleOrchestrator) -> Result<(), CaseError> {
    let payload = sample_payload();
    let (_context, created) = orchestrator.create(&payload).await?;
    assert_payload_fields(StepKind::Create, &created, &payload)
}

/// Reads after create match the identifier and are stable across reads.
async fn read_created_object(orchestrator: &LifecycleOrchestrator) -> Result<(), CaseError> {
    let payload = sample_payload();
    let (context, _created) = orchestrator.create(&payload).await?;
    let checks = ContractAssertions::at(StepKind::Read);

    let first = orchestrator.read(&context).await?;
    checks.identifier_matches(&first, context.id().as_str())?;
    assert_payload_fields(StepKind::Read, &first, &payload)?;

    let second = orchestrator.read(&context).await?;
    checks.identifier_matches(&second, context.id().as_str())?;
    checks.same_fields(&second, &first)?;
    Ok(())
}

/// Update fully replaces the object; the update response and a later read
/// both reflect the replacement rather than the original.
async fn update_object(orchestrator: &LifecycleOrchestrator) -> Result<(), CaseError> {
    let original = device_payload("Test Object", "Black", "64 GB");
    let replacement = device_payload("Updated Test Object", "Red", "128 GB");
    let (context, _created) = orchestrator.create(&original).await?;

    let updated = orchestrator.update(&context, &replacement).await?;
    assert_payload_fields(StepKind::Update, &updated, &replacement)?;

    let reread = orchestrator.read(&context).await?;
    ContractAssertions::at(StepKind::Read).identifier_matches(&reread, context.id().as_str())?;
    assert_payload_fields(StepKind::Read, &reread, &replacement)
}

/// Delete succeeds and the object is gone afterwards.
async fn delete_object(orchestrator: &LifecycleOrchestrator) -> Result<(), CaseError> {
    let (context, _created) = orchestrator.create(&sample_payload()).await?;
    orchestrator.delete_then_verify(context).await
}

/// Checks every asserted field of `payload` against `body`.
fn assert_payload_fields(
    step: StepKind,
    body: &DecodedBody,
    payload: &ObjectPayload,
) -> Result<(), CaseError> {
    let checks = ContractAssertions::at(step);
    for (field, expected) in payload.asserted_fields() {
        checks.field_equals(body, field, &expected)?;
    }
    Ok(())
}
