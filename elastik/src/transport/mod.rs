//! Transport
//!
//! Moves a built request over the wire. The [`Transport`] owns the node pool
//! and the [`Connection`]; every call runs through a request pipeline that
//! sniffs, pings, retries and audits:
//!
//! ```text
//! sniff on startup (once) → sniff on stale cluster
//!   → for node in pool view:
//!       ping if resurrected → call
//!         2xx / 4xx  → mark alive, return
//!         502/503/504, connection error → mark dead, sniff on fault, next node
//!   → max retries / max retry timeout / no nodes attempted
//! ```

mod audit;
mod clock;
mod connection;
mod metrics;
mod node;
mod pipeline;
mod pool;
mod sniff;

pub use audit::{Audit, AuditEvent};
pub use clock::{Clock, SystemClock};
pub use connection::{
    Connection, ConnectionError, ConnectionErrorKind, HttpConnection, InMemoryConnection,
};
pub use node::{dead_time, Node};
pub use pool::{NodePool, NodeView};
pub use sniff::{nodes_from_response, parse_publish_address, SNIFF_PATH};

use crate::error::{ElasticError, Result};
use crate::http::{HttpMethod, RequestParameters};
use crate::post_data::PostData;
use crate::response::{ApiCallDetails, ElasticResponse, ServerError};
use crate::settings::ConnectionSettings;
use pipeline::{CallData, RequestPipeline};
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::debug;
use url::Url;

/// One request against one node, as handed to a [`Connection`]
#[derive(Debug, Clone)]
pub struct RequestData {
    pub method: HttpMethod,
    /// Path without query string, always starting with `/`
    pub path: String,
    pub uri: Url,
    pub body: Option<Vec<u8>>,
    pub content_type: &'static str,
    /// Timeout for this request; the ping timeout for pings
    pub request_timeout: Duration,
    pub ping_timeout: Duration,
    pub headers: Vec<(String, String)>,
    pub basic_auth: Option<(String, String)>,
    pub api_key: Option<String>,
}

impl RequestData {
    pub fn port(&self) -> Option<u16> {
        self.uri.port_or_known_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
    pub headers: Vec<(String, String)>,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
            headers: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Gateway errors are worth retrying on another node
    pub fn is_retryable(&self) -> bool {
        matches!(self.status, 502 | 503 | 504)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Why the pipeline gave up on a call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineFailure {
    BadResponse,
    MaxRetriesReached,
    MaxTimeoutReached,
    NoNodesAttempted,
}

impl PipelineFailure {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineFailure::BadResponse => "bad_response",
            PipelineFailure::MaxRetriesReached => "max_retries_reached",
            PipelineFailure::MaxTimeoutReached => "max_timeout_reached",
            PipelineFailure::NoNodesAttempted => "no_nodes_attempted",
        }
    }
}

impl fmt::Display for PipelineFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error)]
#[error("{failure} on {} {}: {message}", .api_call.method, .api_call.uri)]
pub struct PipelineError {
    pub failure: PipelineFailure,
    pub message: String,
    pub api_call: ApiCallDetails,
}

impl PipelineError {
    pub fn audit_trail(&self) -> &[Audit] {
        &self.api_call.audit_trail
    }
}

/// Shared entry point for sending requests to the cluster
#[derive(Clone)]
pub struct Transport {
    settings: Arc<ConnectionSettings>,
    pool: Arc<NodePool>,
    connection: Arc<dyn Connection>,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transport")
            .field("pool", &self.pool)
            .finish_non_exhaustive()
    }
}

impl Transport {
    /// Transport over HTTP with the system clock
    pub fn new(settings: Arc<ConnectionSettings>) -> Result<Self> {
        let connection = Arc::new(HttpConnection::new()?);
        Ok(Self::with_connection(settings, connection, Arc::new(SystemClock)))
    }

    pub fn with_connection(
        settings: Arc<ConnectionSettings>,
        connection: Arc<dyn Connection>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let pool = Arc::new(NodePool::from_settings(&settings, clock.now()));
        metrics::set_pool_size(pool.node_count());
        Self {
            settings,
            pool,
            connection,
            clock,
        }
    }

    pub fn settings(&self) -> &Arc<ConnectionSettings> {
        &self.settings
    }

    pub fn pool(&self) -> &NodePool {
        &self.pool
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Send a request and read the body into `R`
    ///
    /// A body that cannot be read as `R` yields an invalid response carrying
    /// the parse error, not an `Err`.
    pub async fn request<R: DeserializeOwned>(
        &self,
        method: HttpMethod,
        path: &str,
        params: &RequestParameters,
        body: &PostData,
    ) -> Result<ElasticResponse<R>> {
        let query = self.query_string(params);
        let body_bytes = if body.is_empty() {
            None
        } else {
            Some(body.write(&self.settings)?)
        };

        debug!(method = %method, path = %path, "Sending request");
        let started = Instant::now();
        let call = CallData {
            method,
            path: path.to_string(),
            query,
            body: body_bytes,
            content_type: body.content_type(),
        };

        let pipeline = RequestPipeline::new(
            &self.settings,
            &self.pool,
            self.connection.as_ref(),
            self.clock.as_ref(),
        );
        let outcome = match pipeline.run(call).await {
            Ok(outcome) => outcome,
            Err(err) => {
                metrics::record_request_failure(method, err.failure.as_str());
                return Err(ElasticError::from(err));
            }
        };

        let status = outcome
            .api_call
            .status
            .map(|s| s.to_string())
            .unwrap_or_default();
        metrics::record_request(method, &status, started.elapsed());

        let response = read_response(outcome.api_call, &outcome.body);
        if self.settings.throw_exceptions && !response.is_valid() {
            return Err(response.into_error());
        }
        Ok(response)
    }

    fn query_string(&self, params: &RequestParameters) -> Option<String> {
        let mut merged = params.merged_with(&self.settings.query_string);
        if self.settings.pretty_json && merged.get("pretty").is_none() {
            merged.set("pretty", "true");
        }
        encode_query(merged.iter())
    }
}

/// `k=v&k2=v2`, keys with empty values are written bare
pub(crate) fn encode_query<'a>(pairs: impl Iterator<Item = (&'a str, &'a str)>) -> Option<String> {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    let mut any = false;
    for (key, value) in pairs {
        if value.is_empty() {
            serializer.append_key_only(key);
        } else {
            serializer.append_pair(key, value);
        }
        any = true;
    }
    any.then(|| serializer.finish())
}

fn read_response<R: DeserializeOwned>(mut api_call: ApiCallDetails, body: &[u8]) -> ElasticResponse<R> {
    if !api_call.success {
        let server_error = ServerError::from_bytes(body);
        return ElasticResponse::new(None, api_call, server_error);
    }

    let bytes: &[u8] = if body.iter().all(u8::is_ascii_whitespace) {
        b"null"
    } else {
        body
    };
    match serde_json::from_slice::<R>(bytes) {
        Ok(parsed) => ElasticResponse::new(Some(parsed), api_call, None),
        Err(e) => {
            api_call.success = false;
            api_call.original_error = Some(e.to_string());
            ElasticResponse::new(None, api_call, None)
        }
    }
}
