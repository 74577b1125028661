// crates/object-contract-core/src/capture.rs
// ============================================================================
// Module: Response Capture
// Description: Observer that records responses before they are judged.
// Purpose: Guarantee every failure is preceded by its full diagnostic record.
// Dependencies: crate::{diagnostics, value}
// ============================================================================

//! ## Overview
//! [`CapturedResponse`] has no public constructor: the only way to obtain one
//! is [`ResponseObserver::observe`], which emits the diagnostic record first.
//! The status gate and every assertion take a `CapturedResponse` or a body
//! decoded from one, so log-then-assert holds by construction.

use std::sync::Arc;
use std::sync::OnceLock;

use crate::diagnostics::DiagnosticSink;
use crate::diagnostics::ResponseDiagnostic;
use crate::diagnostics::ResponseDiagnosticParams;
use crate::step::StepKind;
use crate::transport::ObjectRequest;
use crate::transport::RawResponse;
use crate::value::DecodeError;
use crate::value::DecodedBody;

// ============================================================================
// SECTION: Captured Response
// ============================================================================

/// Response of one step, already recorded to diagnostics.
#[derive(Debug)]
pub struct CapturedResponse {
    /// Step that produced the response.
    step: StepKind,
    /// HTTP status code.
    status: u16,
    /// Body text; empty when absent or not UTF-8.
    body: String,
    /// Body decoded on first access.
    decoded: OnceLock<Result<DecodedBody, DecodeError>>,
}

impl CapturedResponse {
    /// Returns the step that produced the response.
    #[must_use]
    pub const fn step(&self) -> StepKind {
        self.step
    }

    /// Returns the HTTP status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Returns the recorded body text.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Decodes the body on first call and returns the cached result after.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] when the body is empty or not JSON.
    pub fn decoded(&self) -> Result<&DecodedBody, DecodeError> {
        self.decoded.get_or_init(|| DecodedBody::parse(&self.body)).as_ref().map_err(Clone::clone)
    }

    /// Consumes the response and returns its decoded body.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] when the body is empty or not JSON.
    pub fn into_decoded(self) -> Result<DecodedBody, DecodeError> {
        let Self {
            body,
            decoded,
            ..
        } = self;
        decoded.into_inner().unwrap_or_else(|| DecodedBody::parse(&body))
    }
}

// ============================================================================
// SECTION: Observer
// ============================================================================

/// Records each raw response for one case and wraps it for judgement.
#[derive(Clone)]
pub struct ResponseObserver {
    /// Case label attached to every record.
    case: String,
    /// Destination for diagnostic records.
    sink: Arc<dyn DiagnosticSink>,
}

impl ResponseObserver {
    /// Creates an observer for the named case.
    #[must_use]
    pub fn new(case: impl Into<String>, sink: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            case: case.into(),
            sink,
        }
    }

    /// Records a response whose status arrived but whose body could not be
    /// read, with an empty body.
    pub fn record_unread(&self, step: StepKind, request: &ObjectRequest, status: u16) {
        self.record(step, request, status, String::new());
    }

    /// Emits the diagnostic record for one response.
    fn record(&self, step: StepKind, request: &ObjectRequest, status: u16, body: String) {
        self.sink.record_response(&ResponseDiagnostic::new(ResponseDiagnosticParams {
            case: self.case.clone(),
            step,
            method: request.method,
            target: request.route.to_string(),
            status,
            body,
        }));
    }

    /// Records the response and returns it in captured form. Never fails.
    #[must_use]
    pub fn observe(
        &self,
        step: StepKind,
        request: &ObjectRequest,
        response: RawResponse,
    ) -> CapturedResponse {
        let body = String::from_utf8(response.body).unwrap_or_default();
        self.record(step, request, response.status, body.clone());
        CapturedResponse {
            step,
            status: response.status,
            body,
            decoded: OnceLock::new(),
        }
    }
}
