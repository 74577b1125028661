// system-tests/tests/helpers/harness.rs
// ============================================================================
// Module: Contract Runner Harness
// Description: Wiring between the object stub and the contract runner.
// Purpose: Provide ready-to-run runners and out-of-band API checks.
// Dependencies: object-contract-core, reqwest, tokio, url
// ============================================================================

use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;

use object_contract_core::ContractRunner;
use object_contract_core::DiagnosticSink;
use object_contract_core::HttpObjectTransport;
use object_contract_core::MemoryDiagnosticSink;
use object_contract_core::RunMode;
use object_contract_core::SuiteReport;
use serde_json::Value;
use url::Url;

use super::object_stub::ObjectStubHandle;
use super::object_stub::StubFault;
use super::object_stub::spawn_object_stub;
use super::timeouts::STUB_REQUEST_TIMEOUT;
use super::timeouts::resolve_timeout;

/// Connect timeout used for loopback targets.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// A stub server with a runner pointed at it.
pub struct StubRun {
    /// Running stub; shuts down on drop.
    pub stub: ObjectStubHandle,
    /// In-memory diagnostics shared with the runner.
    pub sink: Arc<MemoryDiagnosticSink>,
    /// Runner with every canonical case registered.
    pub runner: ContractRunner,
}

/// Builds the HTTP transport for `base_url`.
pub fn http_transport(base_url: &str, timeout: Duration) -> Result<HttpObjectTransport, String> {
    let url = Url::parse(base_url).map_err(|err| format!("invalid base url {base_url}: {err}"))?;
    HttpObjectTransport::new(url, resolve_timeout(timeout)?, CONNECT_TIMEOUT)
        .map_err(|err| err.to_string())
}

/// Spawns a stub with `fault` and a runner whose diagnostics stay in memory.
pub fn stub_runner(fault: StubFault) -> Result<StubRun, String> {
    let stub = spawn_object_stub(fault)?;
    let sink = Arc::new(MemoryDiagnosticSink::new());
    let shared: Arc<dyn DiagnosticSink> = Arc::<MemoryDiagnosticSink>::clone(&sink);
    let runner = runner_for(stub.base_url(), shared)?;
    Ok(StubRun {
        stub,
        sink,
        runner,
    })
}

/// Builds a runner with every canonical case against `base_url`.
pub fn runner_for(base_url: &str, sink: Arc<dyn DiagnosticSink>) -> Result<ContractRunner, String> {
    let transport = http_transport(base_url, STUB_REQUEST_TIMEOUT)?;
    Ok(ContractRunner::with_all_scenarios(Arc::new(transport), sink))
}

/// Runs the suite, failing if it exceeds `deadline`.
pub async fn run_suite(
    runner: &ContractRunner,
    mode: RunMode,
    deadline: Duration,
) -> Result<SuiteReport, String> {
    let deadline = resolve_timeout(deadline)?;
    tokio::time::timeout(deadline, runner.run_all(mode))
        .await
        .map_err(|_| format!("suite did not finish within {} ms", deadline.as_millis()))
}

/// Returns a loopback base URL with nothing listening behind it.
pub fn unreachable_base_url() -> Result<String, String> {
    let listener =
        TcpListener::bind("127.0.0.1:0").map_err(|err| format!("bind failed: {err}"))?;
    let addr = listener.local_addr().map_err(|err| format!("local addr failed: {err}"))?;
    drop(listener);
    Ok(format!("http://{addr}"))
}

/// Fetches `GET /objects/{id}` outside the harness; returns status and body.
pub async fn fetch_object(base_url: &str, id: &str) -> Result<(u16, Value), String> {
    let url = format!("{}/objects/{id}", base_url.trim_end_matches('/'));
    let response = reqwest::Client::new()
        .get(&url)
        .timeout(STUB_REQUEST_TIMEOUT)
        .send()
        .await
        .map_err(|err| format!("GET {url} failed: {err}"))?;
    let status = response.status().as_u16();
    let body = response.json::<Value>().await.map_err(|err| format!("GET {url} body: {err}"))?;
    Ok((status, body))
}
