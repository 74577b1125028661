// crates/object-contract-core/src/diagnostics.rs
// ============================================================================
// Module: Diagnostics
// Description: Structured diagnostic events and sinks for harness runs.
// Purpose: Emit every observed response as a JSON line before it is judged.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Every response the harness observes is recorded as a `response_observed`
//! event carrying the exact status and body text, and every finished case as a
//! `case_finished` event. Sinks are small so a run can route them
//! to stderr, an append-only file, memory, or nowhere.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

use crate::step::StepKind;
use crate::transport::HttpMethod;

// ============================================================================
// SECTION: Events
// ============================================================================

/// Diagnostic record of one observed HTTP response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseDiagnostic {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u64,
    /// Case that issued the request.
    pub case: String,
    /// Lifecycle step.
    pub step: StepKind,
    /// HTTP verb.
    pub method: HttpMethod,
    /// Route relative to the base URL.
    pub target: String,
    /// HTTP status code.
    pub status: u16,
    /// Full body text (empty when absent or not UTF-8).
    pub body: String,
}

/// Parameters for [`ResponseDiagnostic::new`].
pub struct ResponseDiagnosticParams {
    /// Case that issued the request.
    pub case: String,
    /// Lifecycle step.
    pub step: StepKind,
    /// HTTP verb.
    pub method: HttpMethod,
    /// Route relative to the base URL.
    pub target: String,
    /// HTTP status code.
    pub status: u16,
    /// Full body text.
    pub body: String,
}

impl ResponseDiagnostic {
    /// Creates a response event stamped with the current time.
    #[must_use]
    pub fn new(params: ResponseDiagnosticParams) -> Self {
        Self {
            event: "response_observed",
            timestamp_ms: now_millis(),
            case: params.case,
            step: params.step,
            method: params.method,
            target: params.target,
            status: params.status,
            body: params.body,
        }
    }
}

/// Diagnostic record of a finished case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaseDiagnostic {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u64,
    /// Case name.
    pub case: String,
    /// Outcome label (`passed`, `failed`, `errored`).
    pub outcome: &'static str,
    /// Failure message when the case did not pass.
    pub detail: Option<String>,
    /// Wall-clock duration in milliseconds.
    pub duration_ms: u64,
}

impl CaseDiagnostic {
    /// Creates a case event stamped with the current time.
    #[must_use]
    pub fn new(
        case: String,
        outcome: &'static str,
        detail: Option<String>,
        duration_ms: u64,
    ) -> Self {
        Self {
            event: "case_finished",
            timestamp_ms: now_millis(),
            case,
            outcome,
            detail,
            duration_ms,
        }
    }
}

/// Milliseconds since the Unix epoch, zero if the clock is before it.
pub(crate) fn now_millis() -> u64 {
    duration_millis(SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default())
}

/// Whole milliseconds in `duration`, saturating at `u64::MAX`.
///
/// Serialized timestamps stay `u64`: `serde_jcs` cannot emit `u128` fields.
pub(crate) fn duration_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Destination for harness diagnostics.
pub trait DiagnosticSink: Send + Sync {
    /// Record an observed response.
    fn record_response(&self, event: &ResponseDiagnostic);

    /// Record a finished case.
    fn record_case(&self, _event: &CaseDiagnostic) {}
}

/// Sink that logs JSON lines to stderr.
pub struct StderrDiagnosticSink;

impl DiagnosticSink for StderrDiagnosticSink {
    fn record_response(&self, event: &ResponseDiagnostic) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }

    fn record_case(&self, event: &CaseDiagnostic) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Sink that appends JSON lines to a file.
pub struct FileDiagnosticSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileDiagnosticSink {
    /// Opens the diagnostics file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }

    /// Writes one serialized line and flushes.
    fn append<T: Serialize>(&self, event: &T) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

impl DiagnosticSink for FileDiagnosticSink {
    fn record_response(&self, event: &ResponseDiagnostic) {
        self.append(event);
    }

    fn record_case(&self, event: &CaseDiagnostic) {
        self.append(event);
    }
}

/// No-op sink.
pub struct NoopDiagnosticSink;

impl DiagnosticSink for NoopDiagnosticSink {
    fn record_response(&self, _event: &ResponseDiagnostic) {}
}

/// Sink that keeps events in memory for later inspection.
#[derive(Default)]
pub struct MemoryDiagnosticSink {
    /// Recorded response events, in arrival order.
    responses: Mutex<Vec<ResponseDiagnostic>>,
    /// Recorded case events, in arrival order.
    cases: Mutex<Vec<CaseDiagnostic>>,
}

impl MemoryDiagnosticSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of the recorded response events.
    #[must_use]
    pub fn responses(&self) -> Vec<ResponseDiagnostic> {
        self.responses.lock().map_or_else(|_| Vec::new(), |entries| entries.clone())
    }

    /// Returns a snapshot of the recorded case events.
    #[must_use]
    pub fn cases(&self) -> Vec<CaseDiagnostic> {
        self.cases.lock().map_or_else(|_| Vec::new(), |entries| entries.clone())
    }
}

impl DiagnosticSink for MemoryDiagnosticSink {
    fn record_response(&self, event: &ResponseDiagnostic) {
        if let Ok(mut guard) = self.responses.lock() {
            guard.push(event.clone());
        }
    }

    fn record_case(&self, event: &CaseDiagnostic) {
        if let Ok(mut guard) = self.cases.lock() {
            guard.push(event.clone());
        }
    }
}
