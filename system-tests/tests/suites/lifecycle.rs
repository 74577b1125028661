// system-tests/tests/suites/lifecycle.rs
// ============================================================================
// Module: Lifecycle Tests
// Description: Full contract runs against a compliant object API stub.
// Purpose: Validate pass paths, persistence, and diagnostic coverage over HTTP.
// Dependencies: system-tests helpers, object-contract-core
// ============================================================================

//! ## Overview
//! Full contract runs against a compliant object API stub.
//! Invariants:
//! - Every response the harness receives is recorded exactly once.
//! - Reports keep registration order in both run modes.

use std::error::Error;
use std::fs;
use std::sync::Arc;
use std::time::Duration;

use helpers::artifacts::TestReporter;
use helpers::harness::fetch_object;
use helpers::harness::run_suite;
use helpers::harness::runner_for;
use helpers::harness::stub_runner;
use helpers::object_stub::StubFault;
use helpers::object_stub::StubRequest;
use helpers::object_stub::spawn_object_stub;
use object_contract_core::FileDiagnosticSink;
use object_contract_core::RunMode;
use object_contract_core::Scenario;
use object_contract_core::SuiteReport;
use serde_json::Value;

use crate::helpers;

/// Upper bound for a full suite against the stub.
const SUITE_DEADLINE: Duration = Duration::from_secs(30);

/// Fails unless every case passed in canonical order.
fn ensure_all_passed(report: &SuiteReport) -> Result<(), String> {
    let names: Vec<&str> = report.cases.iter().map(|case| case.case.as_str()).collect();
    let expected: Vec<&str> = Scenario::ALL.iter().map(|scenario| scenario.name()).collect();
    if names != expected {
        return Err(format!("unexpected case order: {}", names.join(", ")));
    }
    for case in &report.cases {
        if !case.outcome.is_passed() {
            return Err(format!(
                "{} {}: {}",
                case.case,
                case.outcome.label(),
                case.outcome.detail().unwrap_or_default()
            ));
        }
    }
    Ok(())
}

/// Returns the identifier addressed by the first request with `method`.
fn addressed_id(requests: &[StubRequest], method: &str) -> Result<String, String> {
    requests
        .iter()
        .find(|request| request.method == method)
        .and_then(|request| request.path.strip_prefix("/objects/"))
        .map(str::to_string)
        .ok_or_else(|| format!("no {method} request reached the stub"))
}

#[tokio::test(flavor = "multi_thread")]
async fn compliant_api_passes_every_case() -> Result<(), Box<dyn Error>> {
    let mut reporter = TestReporter::new("compliant_api_passes_every_case")?;
    let run = stub_runner(StubFault::None)?;

    let report = run_suite(&run.runner, RunMode::Sequential, SUITE_DEADLINE).await?;
    reporter.artifacts().write_suite(&report)?;
    reporter.artifacts().write_json("stub_requests.json", &run.stub.requests())?;
    ensure_all_passed(&report)?;
    if !report.is_success() {
        return Err("suite should report success".into());
    }

    reporter.finish(
        "pass",
        vec!["all lifecycle cases passed sequentially".to_string()],
        vec![
            "summary.json".to_string(),
            "summary.md".to_string(),
            "stub_requests.json".to_string(),
            "suite/".to_string(),
        ],
    )?;
    drop(reporter);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_run_matches_sequential_outcomes() -> Result<(), Box<dyn Error>> {
    let mut reporter = TestReporter::new("concurrent_run_matches_sequential_outcomes")?;
    let run = stub_runner(StubFault::None)?;

    let report = run_suite(&run.runner, RunMode::Concurrent, SUITE_DEADLINE).await?;
    reporter.artifacts().write_suite(&report)?;
    ensure_all_passed(&report)?;

    let creates = run.stub.requests().iter().filter(|request| request.method == "POST").count();
    if creates != 4 {
        return Err(format!("expected one create per object case, saw {creates}").into());
    }

    reporter.finish(
        "pass",
        vec!["concurrent cases isolated their objects".to_string()],
        vec!["summary.json".to_string(), "summary.md".to_string(), "suite/".to_string()],
    )?;
    drop(reporter);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn update_is_persisted_server_side() -> Result<(), Box<dyn Error>> {
    let mut reporter = TestReporter::new("update_is_persisted_server_side")?;
    let run = stub_runner(StubFault::None)?;

    let case = run.runner.run_case(Scenario::UpdateObject).await;
    if !case.outcome.is_passed() {
        return Err(format!("update case did not pass: {}", case.outcome.label()).into());
    }
    let id = addressed_id(&run.stub.requests(), "PUT")?;
    let (status, body) = fetch_object(run.stub.base_url(), &id).await?;
    if status != 200 {
        return Err(format!("updated object read returned {status}").into());
    }
    if body.get("name").and_then(Value::as_str) != Some("Updated Test Object") {
        return Err(format!("name not replaced: {body}").into());
    }
    let data = body.get("data").ok_or("updated object lost its data")?;
    if data.get("color").and_then(Value::as_str) != Some("Red")
        || data.get("capacity").and_then(Value::as_str) != Some("128 GB")
    {
        return Err(format!("data not replaced: {data}").into());
    }

    reporter.finish(
        "pass",
        vec![format!("object {id} carries the replacement")],
        vec!["summary.json".to_string(), "summary.md".to_string()],
    )?;
    drop(reporter);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn delete_removes_object_server_side() -> Result<(), Box<dyn Error>> {
    let mut reporter = TestReporter::new("delete_removes_object_server_side")?;
    let run = stub_runner(StubFault::None)?;

    let case = run.runner.run_case(Scenario::DeleteObject).await;
    if !case.outcome.is_passed() {
        return Err(format!("delete case did not pass: {}", case.outcome.label()).into());
    }
    let id = addressed_id(&run.stub.requests(), "DELETE")?;
    if run.stub.contains(&id) {
        return Err(format!("object {id} still stored after delete").into());
    }
    let (status, _body) = fetch_object(run.stub.base_url(), &id).await?;
    if status != 404 {
        return Err(format!("deleted object read returned {status}").into());
    }

    reporter.finish(
        "pass",
        vec![format!("object {id} is gone")],
        vec!["summary.json".to_string(), "summary.md".to_string()],
    )?;
    drop(reporter);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn every_response_is_recorded_in_order() -> Result<(), Box<dyn Error>> {
    let mut reporter = TestReporter::new("every_response_is_recorded_in_order")?;
    let run = stub_runner(StubFault::None)?;

    let report = run_suite(&run.runner, RunMode::Sequential, SUITE_DEADLINE).await?;
    ensure_all_passed(&report)?;

    let requests = run.stub.requests();
    let responses = run.sink.responses();
    reporter.artifacts().write_json("diagnostics.json", &responses)?;
    if responses.len() != requests.len() {
        return Err(format!(
            "{} responses recorded for {} requests",
            responses.len(),
            requests.len()
        )
        .into());
    }
    for (request, response) in requests.iter().zip(&responses) {
        if request.method != response.method.as_str() || request.path != response.target {
            return Err(format!(
                "diagnostic {} {} does not match request {} {}",
                response.method, response.target, request.method, request.path
            )
            .into());
        }
    }
    let cases = run.sink.cases();
    if cases.len() != Scenario::ALL.len() || cases.iter().any(|case| case.outcome != "passed") {
        return Err("each case should finish with one passed event".into());
    }

    reporter.finish(
        "pass",
        vec![format!("{} responses recorded", responses.len())],
        vec![
            "summary.json".to_string(),
            "summary.md".to_string(),
            "diagnostics.json".to_string(),
        ],
    )?;
    drop(reporter);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn file_sink_writes_json_lines() -> Result<(), Box<dyn Error>> {
    let mut reporter = TestReporter::new("file_sink_writes_json_lines")?;
    let stub = spawn_object_stub(StubFault::None)?;
    let path = reporter.artifacts().diagnostics_path();
    let runner = runner_for(stub.base_url(), Arc::new(FileDiagnosticSink::new(&path)?))?;

    let report = run_suite(&runner, RunMode::Sequential, SUITE_DEADLINE).await?;
    ensure_all_passed(&report)?;

    let text = fs::read_to_string(&path)?;
    let mut observed = 0;
    let mut finished = 0;
    for line in text.lines() {
        let event: Value = serde_json::from_str(line)?;
        match event.get("event").and_then(Value::as_str) {
            Some("response_observed") => observed += 1,
            Some("case_finished") => finished += 1,
            other => {
                return Err(format!("unexpected event {}", other.unwrap_or("none")).into());
            }
        }
    }
    if observed != stub.requests().len() || finished != Scenario::ALL.len() {
        return Err(format!("observed {observed} responses and {finished} case events").into());
    }

    reporter.finish(
        "pass",
        vec![format!("{observed} response lines written")],
        vec![
            "summary.json".to_string(),
            "summary.md".to_string(),
            "diagnostics.jsonl".to_string(),
        ],
    )?;
    drop(reporter);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn suite_report_artifacts_are_written() -> Result<(), Box<dyn Error>> {
    let mut reporter = TestReporter::new("suite_report_artifacts_are_written")?;
    let run = stub_runner(StubFault::None)?;

    let report = run_suite(&run.runner, RunMode::Sequential, SUITE_DEADLINE).await?;
    let paths = reporter.artifacts().write_suite(&report)?;
    if paths.len() != 2 {
        return Err(format!("expected two report files, got {}", paths.len()).into());
    }
    let json: Value = serde_json::from_slice(&fs::read(&paths[0])?)?;
    let cases = json.get("cases").and_then(Value::as_array).ok_or("summary.json lacks cases")?;
    if cases.len() != Scenario::ALL.len() {
        return Err(format!("summary.json lists {} cases", cases.len()).into());
    }
    if cases.iter().any(|case| !case["started_at_ms"].is_u64() || !case["duration_ms"].is_u64()) {
        return Err("case timings should be plain JSON numbers".into());
    }
    let markdown = fs::read_to_string(&paths[1])?;
    if !markdown.contains("- Passed: 5") {
        return Err("summary.md totals missing".into());
    }

    reporter.finish(
        "pass",
        vec!["suite report rendered as json and markdown".to_string()],
        vec!["summary.json".to_string(), "summary.md".to_string(), "suite/".to_string()],
    )?;
    let summary: Value =
        serde_json::from_slice(&fs::read(reporter.artifacts().root().join("summary.json"))?)?;
    if summary["status"] != "pass" || !summary["duration_ms"].is_u64() {
        return Err(format!("test summary is malformed: {summary}").into());
    }
    drop(reporter);
    Ok(())
}
