// crates/object-contract-core/src/lifecycle.rs
// ============================================================================
// Module: Lifecycle Orchestrator
// Description: Ordered create/read/update/delete steps for one case.
// Purpose: Thread the server-assigned identifier from step to step.
// Dependencies: crate::{capture, gate, assertions, transport}
// ============================================================================

//! ## Overview
//! Every step goes through one exchange: send, observe (diagnostic record),
//! gate (status policy), then decode. A step's request is only built once the
//! previous step returned, and the identifier only exists inside a
//! [`LifecycleContext`] minted from a create response. Deleting consumes the
//! context, so nothing can address the object afterwards except the
//! not-found verification inside the same call.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use crate::assertions::ContractAssertions;
use crate::capture::CapturedResponse;
use crate::capture::ResponseObserver;
use crate::diagnostics::DiagnosticSink;
use crate::error::CaseError;
use crate::error::ContractViolation;
use crate::gate::StatusPolicy;
use crate::gate::SuccessGate;
use crate::payload::ObjectId;
use crate::payload::ObjectPayload;
use crate::step::StepKind;
use crate::transport::ObjectRequest;
use crate::transport::ObjectTransport;
use crate::transport::TransportError;
use crate::value::DecodedBody;

// ============================================================================
// SECTION: Context
// ============================================================================

/// Per-case correlation state: the identifier returned by create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleContext {
    /// Server-assigned identifier.
    id: ObjectId,
}

impl LifecycleContext {
    /// Returns the identifier the case is operating on.
    #[must_use]
    pub const fn id(&self) -> &ObjectId {
        &self.id
    }
}

// ============================================================================
// SECTION: Orchestrator
// ============================================================================

/// Drives dependent requests for a single case.
pub struct LifecycleOrchestrator {
    /// Transport to the API under test.
    transport: Arc<dyn ObjectTransport>,
    /// Observer recording every response for this case.
    observer: ResponseObserver,
}

impl LifecycleOrchestrator {
    /// Creates an orchestrator whose diagnostics are attributed to `case`.
    #[must_use]
    pub fn new(
        case: impl Into<String>,
        transport: Arc<dyn ObjectTransport>,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Self {
        Self {
            transport,
            observer: ResponseObserver::new(case, sink),
        }
    }

    /// `GET /objects` under the success policy; returns the decoded listing.
    ///
    /// # Errors
    ///
    /// Returns [`CaseError`] on transport failure, non-2xx status, or an
    /// undecodable body.
    pub async fn list(&self) -> Result<DecodedBody, CaseError> {
        let captured =
            self.exchange(StepKind::List, ObjectRequest::list(), StatusPolicy::Success).await?;
        decode(captured)
    }

    /// `POST /objects`; mints the context from the returned `id`.
    ///
    /// # Errors
    ///
    /// Returns [`CaseError`] on transport failure, non-2xx status, an
    /// undecodable body, or a `missing_identifier` violation.
    pub async fn create(
        &self,
        payload: &ObjectPayload,
    ) -> Result<(LifecycleContext, DecodedBody), CaseError> {
        let captured = self
            .exchange(StepKind::Create, ObjectRequest::create(payload), StatusPolicy::Success)
            .await?;
        let body = decode(captured)?;
        let id = ContractAssertions::at(StepKind::Create).has_identifier(&body)?;
        let context = LifecycleContext {
            id: ObjectId::new(id),
        };
        Ok((context, body))
    }

    /// `GET /objects/{id}`; returns the decoded object for assertion.
    ///
    /// # Errors
    ///
    /// Returns [`CaseError`] on transport failure, non-2xx status, or an
    /// undecodable body.
    pub async fn read(&self, context: &LifecycleContext) -> Result<DecodedBody, CaseError> {
        let request = ObjectRequest::read(context.id.clone());
        let captured = self.exchange(StepKind::Read, request, StatusPolicy::Success).await?;
        decode(captured)
    }

    /// `PUT /objects/{id}` with a full replacement body.
    ///
    /// # Errors
    ///
    /// Returns [`CaseError`] on transport failure, non-2xx status, or an
    /// undecodable body.
    pub async fn update(
        &self,
        context: &LifecycleContext,
        payload: &ObjectPayload,
    ) -> Result<DecodedBody, CaseError> {
        let request = ObjectRequest::update(context.id.clone(), payload);
        let captured = self.exchange(StepKind::Update, request, StatusPolicy::Success).await?;
        decode(captured)
    }

    /// `DELETE /objects/{id}` under the success policy, then
    /// `GET /objects/{id}` under the not-found policy. Bodies are not decoded.
    ///
    /// # Errors
    ///
    /// Returns [`CaseError`] on transport failure or when either status is
    /// outside its policy.
    pub async fn delete_then_verify(&self, context: LifecycleContext) -> Result<(), CaseError> {
        let LifecycleContext {
            id,
        } = context;
        self.exchange(StepKind::Delete, ObjectRequest::delete(id.clone()), StatusPolicy::Success)
            .await?;
        self.exchange(StepKind::VerifyDeleted, ObjectRequest::read(id), StatusPolicy::NotFound)
            .await?;
        Ok(())
    }

    /// Sends one request, records the response, and applies the gate.
    async fn exchange(
        &self,
        step: StepKind,
        request: ObjectRequest,
        policy: StatusPolicy,
    ) -> Result<CapturedResponse, CaseError> {
        let raw = match self.transport.send(&request).await {
            Ok(raw) => raw,
            Err(source) => {
                if let TransportError::Body { status, .. } = &source {
                    self.observer.record_unread(step, &request, *status);
                }
                return Err(CaseError::Transport {
                    step,
                    source,
                });
            }
        };
        let captured = self.observer.observe(step, &request, raw);
        SuccessGate::check(policy, &captured)?;
        Ok(captured)
    }
}

/// Decodes a gated response, attributing failures to its step.
fn decode(captured: CapturedResponse) -> Result<DecodedBody, CaseError> {
    let step = captured.step();
    captured
        .into_decoded()
        .map_err(|err| CaseError::from(ContractViolation::undecodable(step, &err)))
}
