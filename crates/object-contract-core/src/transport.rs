// crates/object-contract-core/src/transport.rs
// ============================================================================
// Module: Object Transport
// Description: HTTP transport seam for the objects resource API.
// Purpose: Issue one request per call against an explicitly configured base URL.
// Dependencies: async-trait, reqwest, serde, serde_json, url
// ============================================================================

//! ## Overview
//! The harness never owns connection handling. Requests are described as
//! [`ObjectRequest`] values and handed to an [`ObjectTransport`]; the
//! reqwest-backed [`HttpObjectTransport`] resolves them against the base URL it
//! was constructed with. Nothing here retries: a first-attempt failure is the
//! signal the harness exists to surface.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use percent_encoding::AsciiSet;
use percent_encoding::CONTROLS;
use percent_encoding::utf8_percent_encode;
use reqwest::Client;
use reqwest::Method;
use reqwest::header::ACCEPT;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::payload::ObjectId;
use crate::payload::ObjectPayload;

/// Path segment of the objects collection.
const COLLECTION_SEGMENT: &str = "objects";

/// Bytes escaped in a path segment; matches what `Url::path_segments_mut`
/// escapes when the identifier is pushed onto an `http(s)` base.
const SEGMENT_ESCAPES: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b'/')
    .add(b'\\')
    .add(b'%');

// ============================================================================
// SECTION: Requests
// ============================================================================

/// HTTP verbs used by the lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// GET.
    Get,
    /// POST.
    Post,
    /// PUT.
    Put,
    /// DELETE.
    Delete,
}

impl HttpMethod {
    /// Returns the verb text.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }

    /// Maps to the reqwest method.
    fn to_reqwest(self) -> Method {
        match self {
            Self::Get => Method::GET,
            Self::Post => Method::POST,
            Self::Put => Method::PUT,
            Self::Delete => Method::DELETE,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Target of a request relative to the base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectRoute {
    /// `/objects`.
    Collection,
    /// `/objects/{id}`.
    Item(ObjectId),
}

/// Renders the path as sent on the wire, with the identifier percent-encoded.
impl fmt::Display for ObjectRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Collection => write!(f, "/{COLLECTION_SEGMENT}"),
            Self::Item(id) => write!(
                f,
                "/{COLLECTION_SEGMENT}/{}",
                utf8_percent_encode(id.as_str(), SEGMENT_ESCAPES)
            ),
        }
    }
}

/// A single request against the objects resource.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectRequest {
    /// HTTP verb.
    pub method: HttpMethod,
    /// Route relative to the base URL.
    pub route: ObjectRoute,
    /// JSON body, sent as `application/json`.
    pub body: Option<Value>,
}

impl ObjectRequest {
    /// `GET /objects`.
    #[must_use]
    pub const fn list() -> Self {
        Self {
            method: HttpMethod::Get,
            route: ObjectRoute::Collection,
            body: None,
        }
    }

    /// `POST /objects` with the payload body.
    #[must_use]
    pub fn create(payload: &ObjectPayload) -> Self {
        Self {
            method: HttpMethod::Post,
            route: ObjectRoute::Collection,
            body: Some(payload.to_value()),
        }
    }

    /// `GET /objects/{id}`.
    #[must_use]
    pub fn read(id: ObjectId) -> Self {
        Self {
            method: HttpMethod::Get,
            route: ObjectRoute::Item(id),
            body: None,
        }
    }

    /// `PUT /objects/{id}` with a full replacement body.
    #[must_use]
    pub fn update(id: ObjectId, payload: &ObjectPayload) -> Self {
        Self {
            method: HttpMethod::Put,
            route: ObjectRoute::Item(id),
            body: Some(payload.to_value()),
        }
    }

    /// `DELETE /objects/{id}`.
    #[must_use]
    pub fn delete(id: ObjectId) -> Self {
        Self {
            method: HttpMethod::Delete,
            route: ObjectRoute::Item(id),
            body: None,
        }
    }
}

/// Status and body bytes of a completed exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw body bytes; possibly empty or non-UTF-8.
    pub body: Vec<u8>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// The HTTP layer could not complete a call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The transport could not be constructed.
    #[error("transport setup failed: {0}")]
    Setup(String),
    /// The request target could not be built.
    #[error("invalid request target: {0}")]
    Target(String),
    /// Connection, TLS, or timeout failure while sending.
    #[error("http request failed: {0}")]
    Send(String),
    /// A status arrived but the response body could not be read.
    #[error("response body read failed after status {status}: {message}")]
    Body {
        /// Status line received before the body failed.
        status: u16,
        /// Underlying read failure.
        message: String,
    },
}

// ============================================================================
// SECTION: Transport Trait
// ============================================================================

/// Sends object requests to the API under test.
#[async_trait]
pub trait ObjectTransport: Send + Sync {
    /// Sends one request and returns the raw response, whatever its status.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when no HTTP response was obtained.
    async fn send(&self, request: &ObjectRequest) -> Result<RawResponse, TransportError>;
}

// ============================================================================
// SECTION: HTTP Transport
// ============================================================================

/// reqwest-backed transport bound to one base URL.
#[derive(Debug, Clone)]
pub struct HttpObjectTransport {
    /// Base URL the `objects` routes are resolved against.
    base_url: Url,
    /// HTTP client configured with timeouts.
    client: Client,
}

impl HttpObjectTransport {
    /// Builds a transport with request and connect timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Setup`] when the base URL cannot carry path
    /// segments or the client cannot be built.
    pub fn new(
        base_url: Url,
        timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|err| TransportError::Setup(format!("failed to build http client: {err}")))?;
        Self::with_client(base_url, client)
    }

    /// Builds a transport from an existing reqwest client.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Setup`] when the base URL cannot carry path
    /// segments (for example `mailto:` URLs).
    pub fn with_client(base_url: Url, client: Client) -> Result<Self, TransportError> {
        if base_url.cannot_be_a_base() {
            return Err(TransportError::Setup(format!("base url {base_url} cannot be a base")));
        }
        Ok(Self {
            base_url,
            client,
        })
    }

    /// Resolves a route to an absolute URL, percent-encoding the identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Target`] when the base URL cannot carry path
    /// segments.
    pub fn resolve(&self, route: &ObjectRoute) -> Result<Url, TransportError> {
        let mut url = self.base_url.clone();
        url.set_query(None);
        url.set_fragment(None);
        {
            let mut segments = url.path_segments_mut().map_err(|()| {
                TransportError::Target(format!("base url {} cannot be a base", self.base_url))
            })?;
            segments.pop_if_empty().push(COLLECTION_SEGMENT);
            if let ObjectRoute::Item(id) = route {
                segments.push(id.as_str());
            }
        }
        Ok(url)
    }
}

#[async_trait]
impl ObjectTransport for HttpObjectTransport {
    async fn send(&self, request: &ObjectRequest) -> Result<RawResponse, TransportError> {
        let url = self.resolve(&request.route)?;
        let mut http_request = self
            .client
            .request(request.method.to_reqwest(), url)
            .header(ACCEPT, "application/json");
        if let Some(body) = &request.body {
            http_request = http_request.json(body);
        }
        let response =
            http_request.send().await.map_err(|err| TransportError::Send(err.to_string()))?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(|err| TransportError::Body {
            status,
            message: err.to_string(),
        })?;
        Ok(RawResponse {
            status,
            body: body.to_vec(),
        })
    }
}
