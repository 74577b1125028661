// crates/object-contract-core/src/runner.rs
// ============================================================================
// Module: Contract Runner
// Description: Scenario registry and per-case execution with reporting.
// Purpose: Register cases, run them in isolation, and classify outcomes.
// Dependencies: serde, tokio, crate::{scenarios, lifecycle, diagnostics}
// ============================================================================

//! ## Overview
//! Every case gets a fresh [`LifecycleOrchestrator`], so no identifier leaks
//! from one case into another. A case either passes, fails on a contract
//! violation, or errors on a transport failure; a failing case never stops
//! the others. In concurrent mode each case runs on its own task.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tokio::task::JoinSet;

use crate::diagnostics::CaseDiagnostic;
use crate::diagnostics::DiagnosticSink;
use crate::diagnostics::duration_millis;
use crate::diagnostics::now_millis;
use crate::error::CaseError;
use crate::error::ViolationKind;
use crate::lifecycle::LifecycleOrchestrator;
use crate::scenarios::Scenario;
use crate::transport::ObjectTransport;

// ============================================================================
// SECTION: Reports
// ============================================================================

/// Result of one case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CaseOutcome {
    /// Every step and assertion held.
    Passed,
    /// The API broke the contract.
    Failed {
        /// Violation classification.
        kind: ViolationKind,
        /// Violation message with expected and actual values.
        message: String,
    },
    /// The case could not complete (transport failure or task abort).
    Errored {
        /// Error message.
        message: String,
    },
}

impl CaseOutcome {
    /// Returns the outcome label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed {
                ..
            } => "failed",
            Self::Errored {
                ..
            } => "errored",
        }
    }

    /// Returns the failure message, if any.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Passed => None,
            Self::Failed {
                message, ..
            }
            | Self::Errored {
                message,
            } => Some(message.as_str()),
        }
    }

    /// Returns true for [`CaseOutcome::Passed`].
    #[must_use]
    pub const fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }
}

impl From<Result<(), CaseError>> for CaseOutcome {
    fn from(result: Result<(), CaseError>) -> Self {
        match result {
            Ok(()) => Self::Passed,
            Err(CaseError::Violation(violation)) => Self::Failed {
                kind: violation.kind,
                message: violation.to_string(),
            },
            Err(err @ CaseError::Transport {
                ..
            }) => Self::Errored {
                message: err.to_string(),
            },
        }
    }
}

/// Report for one case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaseReport {
    /// Case name.
    pub case: String,
    /// Outcome.
    pub outcome: CaseOutcome,
    /// Start timestamp (milliseconds since epoch).
    pub started_at_ms: u64,
    /// Wall-clock duration in milliseconds.
    pub duration_ms: u64,
}

/// Report for a whole run, in registration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct SuiteReport {
    /// Case reports.
    pub cases: Vec<CaseReport>,
}

impl SuiteReport {
    /// Number of passed cases.
    #[must_use]
    pub fn passed(&self) -> usize {
        self.count("passed")
    }

    /// Number of failed cases.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.count("failed")
    }

    /// Number of errored cases.
    #[must_use]
    pub fn errored(&self) -> usize {
        self.count("errored")
    }

    /// Returns true when every case passed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.cases.iter().all(|case| case.outcome.is_passed())
    }

    /// Returns the report for a case name.
    #[must_use]
    pub fn case(&self, name: &str) -> Option<&CaseReport> {
        self.cases.iter().find(|case| case.case == name)
    }

    /// Counts cases with the given outcome label.
    fn count(&self, label: &str) -> usize {
        self.cases.iter().filter(|case| case.outcome.label() == label).count()
    }
}

// ============================================================================
// SECTION: Runner
// ============================================================================

/// Execution strategy across cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    /// One case after another.
    #[default]
    Sequential,
    /// Every case on its own task.
    Concurrent,
}

/// Registry of cases bound to one transport and one diagnostic sink.
#[derive(Clone)]
pub struct ContractRunner {
    /// Transport shared by all cases.
    transport: Arc<dyn ObjectTransport>,
    /// Sink shared by all cases.
    sink: Arc<dyn DiagnosticSink>,
    /// Registered cases, in registration order.
    scenarios: Vec<Scenario>,
}

impl ContractRunner {
    /// Creates a runner with no registered cases.
    #[must_use]
    pub fn new(transport: Arc<dyn ObjectTransport>, sink: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            transport,
            sink,
            scenarios: Vec::new(),
        }
    }

    /// Creates a runner with every canonical case registered.
    #[must_use]
    pub fn with_all_scenarios(
        transport: Arc<dyn ObjectTransport>,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Self {
        let mut runner = Self::new(transport, sink);
        for scenario in Scenario::ALL {
            runner.register(scenario);
        }
        runner
    }

    /// Registers a case; registering twice is a no-op.
    pub fn register(&mut self, scenario: Scenario) -> &mut Self {
        if !self.scenarios.contains(&scenario) {
            self.scenarios.push(scenario);
        }
        self
    }

    /// Returns the registered cases.
    #[must_use]
    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    /// Runs one case in isolation and reports it.
    pub async fn run_case(&self, scenario: Scenario) -> CaseReport {
        execute(Arc::clone(&self.transport), Arc::clone(&self.sink), scenario).await
    }

    /// Runs every registered case and reports them in registration order.
    pub async fn run_all(&self, mode: RunMode) -> SuiteReport {
        let cases = match mode {
            RunMode::Sequential => {
                let mut cases = Vec::with_capacity(self.scenarios.len());
                for scenario in &self.scenarios {
                    cases.push(self.run_case(*scenario).await);
                }
                cases
            }
            RunMode::Concurrent => self.run_concurrent().await,
        };
        SuiteReport {
            cases,
        }
    }

    /// Spawns each case on its own task and restores registration order.
    async fn run_concurrent(&self) -> Vec<CaseReport> {
        let mut tasks = JoinSet::new();
        for (index, scenario) in self.scenarios.iter().copied().enumerate() {
            let transport = Arc::clone(&self.transport);
            let sink = Arc::clone(&self.sink);
            tasks.spawn(async move { (index, execute(transport, sink, scenario).await) });
        }
        let mut slots: Vec<Option<CaseReport>> = vec![None; self.scenarios.len()];
        while let Some(joined) = tasks.join_next().await {
            if let Ok((index, report)) = joined
                && let Some(slot) = slots.get_mut(index)
            {
                *slot = Some(report);
            }
        }
        self.scenarios
            .iter()
            .zip(slots)
            .map(|(scenario, slot)| {
                slot.unwrap_or_else(|| CaseReport {
                    case: scenario.name().to_string(),
                    outcome: CaseOutcome::Errored {
                        message: "case task aborted before reporting".to_string(),
                    },
                    started_at_ms: now_millis(),
                    duration_ms: 0,
                })
            })
            .collect()
    }
}

/// Runs one case on a fresh orchestrator and records its outcome.
async fn execute(
    transport: Arc<dyn ObjectTransport>,
    sink: Arc<dyn DiagnosticSink>,
    scenario: Scenario,
) -> CaseReport {
    let started_at_ms = now_millis();
    let started = Instant::now();
    let orchestrator = LifecycleOrchestrator::new(scenario.name(), transport, Arc::clone(&sink));
    let outcome = CaseOutcome::from(scenario.run(&orchestrator).await);
    let duration_ms = duration_millis(started.elapsed());
    sink.record_case(&CaseDiagnostic::new(
        scenario.name().to_string(),
        outcome.label(),
        outcome.detail().map(ToString::to_string),
        duration_ms,
    ));
    CaseReport {
        case: scenario.name().to_string(),
        outcome,
        started_at_ms,
        duration_ms,
    }
}
