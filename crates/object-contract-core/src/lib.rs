// crates/object-contract-core/src/lib.rs
// ============================================================================
// Module: Object Contract Core
// Description: Lifecycle contract checks for a CRUD `/objects` HTTP API.
// Purpose: Drive create/read/update/delete cases and judge every response.
// Dependencies: reqwest, serde, serde_json, serde_jcs, tokio, thiserror, url
// ============================================================================

//! ## Overview
//! This crate exercises an `/objects` resource as a black box. Each case runs
//! on a [`LifecycleOrchestrator`] that threads the server-assigned identifier
//! through dependent requests, records every response with a
//! [`ResponseObserver`] before anything is judged, gates status codes with
//! [`SuccessGate`], and checks bodies with [`ContractAssertions`].
//! Invariants:
//! - A response is recorded to the diagnostic sink before its status or body
//!   is evaluated.
//! - Requests for one case are strictly sequential; cases share no state.
//! - Failures name the step, the predicate, the expected value, and the
//!   observed value.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod assertions;
pub mod capture;
pub mod diagnostics;
pub mod error;
pub mod gate;
pub mod lifecycle;
pub mod payload;
pub mod report;
pub mod runner;
pub mod scenarios;
pub mod step;
pub mod transport;
pub mod value;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use assertions::ContractAssertions;
pub use capture::CapturedResponse;
pub use capture::ResponseObserver;
pub use diagnostics::CaseDiagnostic;
pub use diagnostics::DiagnosticSink;
pub use diagnostics::FileDiagnosticSink;
pub use diagnostics::MemoryDiagnosticSink;
pub use diagnostics::NoopDiagnosticSink;
pub use diagnostics::ResponseDiagnostic;
pub use diagnostics::StderrDiagnosticSink;
pub use error::CaseError;
pub use error::ContractViolation;
pub use error::ViolationKind;
pub use gate::StatusPolicy;
pub use gate::SuccessGate;
pub use lifecycle::LifecycleContext;
pub use lifecycle::LifecycleOrchestrator;
pub use payload::ObjectId;
pub use payload::ObjectPayload;
pub use report::ReportError;
pub use report::write_suite_report;
pub use runner::CaseOutcome;
pub use runner::CaseReport;
pub use runner::ContractRunner;
pub use runner::RunMode;
pub use runner::SuiteReport;
pub use scenarios::Scenario;
pub use step::StepKind;
pub use transport::HttpMethod;
pub use transport::HttpObjectTransport;
pub use transport::ObjectRequest;
pub use transport::ObjectRoute;
pub use transport::ObjectTransport;
pub use transport::RawResponse;
pub use transport::TransportError;
pub use value::DecodeError;
pub use value::DecodedBody;
