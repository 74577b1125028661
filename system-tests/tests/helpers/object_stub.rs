// system-tests/tests/helpers/object_stub.rs
// ============================================================================
// Module: Object API Stub
// Description: In-process `/objects` CRUD server for system-tests.
// Purpose: Exercise the harness over real HTTP with injectable faults.
// Dependencies: axum, serde_json, tokio
// ============================================================================

use std::collections::BTreeMap;
use std::net::TcpListener as StdTcpListener;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::thread;

use axum::Json;
use axum::Router;
use axum::body::Bytes;
use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;
use tokio::runtime::Builder;
use tokio::sync::oneshot;

/// Identifier of the object present before any test traffic.
pub const SEEDED_ID: &str = "1";
/// First identifier handed out by create.
const FIRST_CREATED_ID: u64 = 100;

/// Contract break the stub introduces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StubFault {
    /// Behaves as a compliant API.
    #[default]
    None,
    /// Create responses carry no `id`.
    OmitIdentifier,
    /// Create answers 500 and stores nothing.
    FailingCreate,
    /// Update echoes the replacement but keeps the old object.
    StaleUpdate,
    /// Delete answers 200 but keeps the object.
    IgnoreDelete,
    /// Reads answer with an `id` other than the one requested.
    MismatchedIdentifier,
    /// Every `id` is emitted as a JSON number.
    NumericIdentifiers,
    /// Listing answers `[]`.
    EmptyListing,
}

/// Recorded request metadata for stub calls.
#[derive(Clone, Debug, Serialize)]
pub struct StubRequest {
    /// HTTP verb.
    pub method: &'static str,
    /// Request path.
    pub path: String,
    /// Request body text (empty for bodiless verbs).
    pub body: String,
}

/// Stored objects plus the identifier sequence.
#[derive(Debug)]
struct ObjectStore {
    /// Objects keyed by text identifier; stored bodies include `id`.
    objects: BTreeMap<String, Map<String, Value>>,
    /// Next identifier to hand out.
    next_id: u64,
}

impl ObjectStore {
    /// Builds a store holding the seeded object.
    fn seeded() -> Self {
        let mut seeded = Map::new();
        seeded.insert("id".to_string(), Value::String(SEEDED_ID.to_string()));
        seeded.insert("name".to_string(), Value::String("Seeded Object".to_string()));
        seeded.insert("data".to_string(), json!({ "color": "Cloudy White" }));
        let mut objects = BTreeMap::new();
        objects.insert(SEEDED_ID.to_string(), seeded);
        Self {
            objects,
            next_id: FIRST_CREATED_ID,
        }
    }
}

/// Shared handler state.
#[derive(Clone)]
struct StubState {
    /// Injected fault.
    fault: StubFault,
    /// Object storage.
    store: Arc<Mutex<ObjectStore>>,
    /// Request log in arrival order.
    requests: Arc<Mutex<Vec<StubRequest>>>,
}

impl StubState {
    /// Appends a request to the log.
    fn record(&self, method: &'static str, path: String, body: &[u8]) {
        let entry = StubRequest {
            method,
            path,
            body: String::from_utf8_lossy(body).into_owned(),
        };
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).push(entry);
    }

    /// Renders a stored object, applying identifier faults.
    fn render(&self, object: &Map<String, Value>) -> Value {
        let mut rendered = object.clone();
        if self.fault == StubFault::NumericIdentifiers
            && let Some(number) =
                rendered.get("id").and_then(Value::as_str).and_then(|id| id.parse::<u64>().ok())
        {
            rendered.insert("id".to_string(), Value::from(number));
        }
        Value::Object(rendered)
    }
}

/// Handle for the stub object API server.
pub struct ObjectStubHandle {
    /// Base URL the harness should target.
    base_url: String,
    /// Graceful shutdown trigger.
    shutdown: Option<oneshot::Sender<()>>,
    /// Server thread.
    join: Option<thread::JoinHandle<()>>,
    /// Request log shared with the handlers.
    requests: Arc<Mutex<Vec<StubRequest>>>,
    /// Object storage shared with the handlers.
    store: Arc<Mutex<ObjectStore>>,
}

impl ObjectStubHandle {
    /// Returns the stub base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns captured requests.
    pub fn requests(&self) -> Vec<StubRequest> {
        self.requests.lock().map_or_else(|_| Vec::new(), |entries| entries.clone())
    }

    /// Returns true while the stub stores an object under `id`.
    pub fn contains(&self, id: &str) -> bool {
        self.store.lock().unwrap_or_else(PoisonError::into_inner).objects.contains_key(id)
    }

    /// Returns the stored object under `id`.
    pub fn object(&self, id: &str) -> Option<Map<String, Value>> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner).objects.get(id).cloned()
    }
}

impl Drop for ObjectStubHandle {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

/// Spawns a stub object API on an ephemeral loopback port.
pub fn spawn_object_stub(fault: StubFault) -> Result<ObjectStubHandle, String> {
    let listener = StdTcpListener::bind("127.0.0.1:0")
        .map_err(|err| format!("object stub bind failed: {err}"))?;
    listener
        .set_nonblocking(true)
        .map_err(|err| format!("object stub listener nonblocking failed: {err}"))?;
    let addr =
        listener.local_addr().map_err(|err| format!("object stub local addr failed: {err}"))?;
    let base_url = format!("http://{addr}");

    let requests = Arc::new(Mutex::new(Vec::new()));
    let store = Arc::new(Mutex::new(ObjectStore::seeded()));
    let state = StubState {
        fault,
        store: Arc::clone(&store),
        requests: Arc::clone(&requests),
    };
    let app = Router::new()
        .route("/objects", get(list_objects).post(create_object))
        .route("/objects/{id}", get(read_object).put(update_object).delete(delete_object))
        .with_state(state);
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let join = thread::spawn(move || {
        let Ok(runtime) = Builder::new_current_thread().enable_all().build() else {
            return;
        };
        runtime.block_on(async move {
            let Ok(listener) = tokio::net::TcpListener::from_std(listener) else {
                return;
            };
            let server = axum::serve(listener, app).with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            });
            let _ = server.await;
        });
    });
    Ok(ObjectStubHandle {
        base_url,
        shutdown: Some(shutdown_tx),
        join: Some(join),
        requests,
        store,
    })
}

// ============================================================================
// SECTION: Handlers
// ============================================================================

/// `GET /objects`.
async fn list_objects(State(state): State<StubState>) -> Response {
    state.record("GET", "/objects".to_string(), &[]);
    if state.fault == StubFault::EmptyListing {
        return Json(Value::Array(Vec::new())).into_response();
    }
    let listing: Vec<Value> = {
        let store = state.store.lock().unwrap_or_else(PoisonError::into_inner);
        store.objects.values().map(|object| state.render(object)).collect()
    };
    Json(Value::Array(listing)).into_response()
}

/// `POST /objects`.
async fn create_object(State(state): State<StubState>, body: Bytes) -> Response {
    state.record("POST", "/objects".to_string(), &body);
    if state.fault == StubFault::FailingCreate {
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, "object store unavailable");
    }
    let Some(mut object) = parse_object(&body) else {
        return error_response(StatusCode::BAD_REQUEST, "body must be a JSON object");
    };
    let stored = {
        let mut store = state.store.lock().unwrap_or_else(PoisonError::into_inner);
        let id = store.next_id.to_string();
        store.next_id += 1;
        object.insert("id".to_string(), Value::String(id.clone()));
        store.objects.insert(id, object.clone());
        object
    };
    let mut rendered = state.render(&stored);
    if state.fault == StubFault::OmitIdentifier
        && let Value::Object(map) = &mut rendered
    {
        map.remove("id");
    }
    Json(rendered).into_response()
}

/// `GET /objects/{id}`.
async fn read_object(State(state): State<StubState>, Path(id): Path<String>) -> Response {
    state.record("GET", format!("/objects/{id}"), &[]);
    let stored = {
        let store = state.store.lock().unwrap_or_else(PoisonError::into_inner);
        store.objects.get(&id).cloned()
    };
    let Some(object) = stored else {
        return not_found(&id);
    };
    let mut rendered = state.render(&object);
    if state.fault == StubFault::MismatchedIdentifier
        && let Value::Object(map) = &mut rendered
    {
        map.insert("id".to_string(), Value::String(format!("{id}-other")));
    }
    Json(rendered).into_response()
}

/// `PUT /objects/{id}`.
async fn update_object(
    State(state): State<StubState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Response {
    state.record("PUT", format!("/objects/{id}"), &body);
    let Some(mut replacement) = parse_object(&body) else {
        return error_response(StatusCode::BAD_REQUEST, "body must be a JSON object");
    };
    replacement.insert("id".to_string(), Value::String(id.clone()));
    {
        let mut store = state.store.lock().unwrap_or_else(PoisonError::into_inner);
        if !store.objects.contains_key(&id) {
            return not_found(&id);
        }
        if state.fault != StubFault::StaleUpdate {
            store.objects.insert(id, replacement.clone());
        }
    }
    Json(state.render(&replacement)).into_response()
}

/// `DELETE /objects/{id}`.
async fn delete_object(State(state): State<StubState>, Path(id): Path<String>) -> Response {
    state.record("DELETE", format!("/objects/{id}"), &[]);
    let existed = {
        let mut store = state.store.lock().unwrap_or_else(PoisonError::into_inner);
        if state.fault == StubFault::IgnoreDelete {
            store.objects.contains_key(&id)
        } else {
            store.objects.remove(&id).is_some()
        }
    };
    if !existed {
        return not_found(&id);
    }
    Json(json!({ "message": format!("Object with id = {id} has been deleted.") })).into_response()
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Decodes a request body as a JSON object, dropping any client-sent `id`.
fn parse_object(body: &[u8]) -> Option<Map<String, Value>> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(mut map)) => {
            map.remove("id");
            Some(map)
        }
        _ => None,
    }
}

/// 404 for an unknown identifier.
fn not_found(id: &str) -> Response {
    error_response(StatusCode::NOT_FOUND, &format!("Object with id={id} was not found."))
}

/// JSON error body with the given status.
fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
