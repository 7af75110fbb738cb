use super::audit::{Audit, AuditEvent};
use super::clock::Clock;
use super::connection::{Connection, ConnectionError};
use super::metrics;
use super::node::Node;
use super::pool::NodePool;
use super::sniff::{nodes_from_response, sniff_query, SNIFF_PATH};
use super::{encode_query, PipelineError, PipelineFailure, RawResponse, RequestData};
use crate::http::HttpMethod;
use crate::response::{ApiCallDetails, NodesInfoResponse};
use crate::settings::{self, ConnectionSettings};
use chrono::{DateTime, Utc};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Fraction of the retry timeout after which no further node is tried
const TIMEOUT_MARGIN: f64 = 0.98;

pub(crate) struct CallData {
    pub method: HttpMethod,
    pub path: String,
    pub query: Option<String>,
    pub body: Option<Vec<u8>>,
    pub content_type: &'static str,
}

pub(crate) struct CallOutcome {
    pub api_call: ApiCallDetails,
    pub body: Vec<u8>,
}

/// State of one logical call while it walks the pool
pub(crate) struct RequestPipeline<'a> {
    settings: &'a ConnectionSettings,
    pool: &'a NodePool,
    connection: &'a dyn Connection,
    clock: &'a dyn Clock,
    started: DateTime<Utc>,
    audit_trail: Vec<Audit>,
    retried: usize,
    sniffed_on_fault: bool,
}

impl<'a> RequestPipeline<'a> {
    pub fn new(
        settings: &'a ConnectionSettings,
        pool: &'a NodePool,
        connection: &'a dyn Connection,
        clock: &'a dyn Clock,
    ) -> Self {
        Self {
            settings,
            pool,
            connection,
            clock,
            started: clock.now(),
            audit_trail: Vec::new(),
            retried: 0,
            sniffed_on_fault: false,
        }
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    fn elapsed(&self) -> Duration {
        (self.now() - self.started).to_std().unwrap_or_default()
    }

    fn is_taking_too_long(&self) -> bool {
        let timeout = self.settings.effective_max_retry_timeout();
        self.elapsed() >= timeout.mul_f64(TIMEOUT_MARGIN)
    }

    fn audit(&mut self, event: AuditEvent, node: Option<&Url>, started: DateTime<Utc>) {
        let ended = self.now();
        self.audit_trail
            .push(Audit::new(event, node, started).ended_at(ended));
    }

    fn audit_error(&mut self, event: AuditEvent, node: &Url, started: DateTime<Utc>, error: &str) {
        let ended = self.now();
        self.audit_trail.push(
            Audit::new(event, Some(node), started)
                .ended_at(ended)
                .with_exception(error),
        );
    }

    #[allow(clippy::too_many_arguments)]
    fn request_data(
        &self,
        node: &Node,
        method: HttpMethod,
        path: &str,
        query: Option<&str>,
        body: Option<Vec<u8>>,
        content_type: &'static str,
        timeout: Duration,
    ) -> Result<RequestData, ConnectionError> {
        let uri = node_uri(&node.uri, path, query)
            .map_err(|e| ConnectionError::other(format!("invalid uri for {}: {}", node.uri, e)))?;
        Ok(RequestData {
            method,
            path: path.to_string(),
            uri,
            body,
            content_type,
            request_timeout: timeout,
            ping_timeout: self.settings.ping_timeout,
            headers: self.settings.headers.clone(),
            basic_auth: self.settings.basic_auth.clone(),
            api_key: self.settings.api_key.clone(),
        })
    }

    /// Run the call; `Err` when no node produced a usable answer
    pub async fn run(mut self, call: CallData) -> Result<CallOutcome, PipelineError> {
        self.sniff_on_startup().await;
        self.sniff_on_stale_cluster().await;

        let max_retries = self.settings.effective_max_retries(self.pool.node_count());
        let mut last_uri: Option<Url> = None;
        let mut last_status: Option<u16> = None;
        let mut last_error: Option<String> = None;
        let mut timed_out = false;

        'views: loop {
            let view = self.pool.create_view(self.now());
            if view.all_nodes_dead {
                let now = self.now();
                self.audit(AuditEvent::AllNodesDead, None, now);
            }

            let mut refreshed = false;
            for node in view.nodes {
                if self.is_taking_too_long() {
                    timed_out = true;
                    break 'views;
                }
                if self.retried > max_retries {
                    break 'views;
                }
                if self.retried > 0 {
                    metrics::record_retry();
                }
                self.retried += 1;
                last_uri = Some(node.uri.clone());

                if !node.is_alive {
                    let now = self.now();
                    self.audit(AuditEvent::Resurrection, Some(&node.uri), now);
                }

                if let Err(e) = self.ping(&node).await {
                    last_error = Some(e);
                    self.mark_dead(&node);
                    if self.sniff_on_connection_fault().await {
                        refreshed = true;
                        break;
                    }
                    continue;
                }

                let started = self.now();
                let result = match self.request_data(
                    &node,
                    call.method,
                    &call.path,
                    call.query.as_deref(),
                    call.body.clone(),
                    call.content_type,
                    self.settings.request_timeout,
                ) {
                    Ok(request) => self.connection.request(&request).await,
                    Err(e) => Err(e),
                };

                match result {
                    Ok(raw) if !raw.is_retryable() => {
                        let event = if raw.is_success() {
                            AuditEvent::HealthyResponse
                        } else {
                            AuditEvent::BadRequest
                        };
                        self.audit(event, Some(&node.uri), started);
                        self.pool.mark_alive(&node.uri);
                        return Ok(self.finish(&call, &node.uri, raw));
                    }
                    Ok(raw) => {
                        let error = format!("node returned status {}", raw.status);
                        self.audit_error(AuditEvent::BadResponse, &node.uri, started, &error);
                        last_status = Some(raw.status);
                        last_error = Some(error);
                    }
                    Err(e) => {
                        let error = e.to_string();
                        self.audit_error(AuditEvent::BadResponse, &node.uri, started, &error);
                        last_status = None;
                        last_error = Some(error);
                    }
                }

                self.mark_dead(&node);
                if self.sniff_on_connection_fault().await {
                    refreshed = true;
                    break;
                }
            }

            if !refreshed {
                break;
            }
        }

        let now = self.now();
        let failure = if timed_out {
            self.audit(AuditEvent::MaxTimeoutReached, None, now);
            PipelineFailure::MaxTimeoutReached
        } else if self.retried == 0 {
            self.audit(AuditEvent::NoNodesAttempted, None, now);
            PipelineFailure::NoNodesAttempted
        } else if max_retries > 0 && self.retried > max_retries {
            self.audit(AuditEvent::MaxRetriesReached, None, now);
            PipelineFailure::MaxRetriesReached
        } else {
            PipelineFailure::BadResponse
        };

        let message = match failure {
            PipelineFailure::MaxTimeoutReached => format!(
                "retry timeout of {:?} reached after {} attempt(s)",
                self.settings.effective_max_retry_timeout(),
                self.retried
            ),
            PipelineFailure::NoNodesAttempted => "no nodes were attempted".to_string(),
            _ => last_error.unwrap_or_else(|| "no usable response".to_string()),
        };
        warn!(failure = %failure, attempts = self.retried, "Request failed: {}", message);

        let base = last_uri
            .or_else(|| self.settings.nodes.first().cloned())
            .unwrap_or_else(settings::default_node);
        let uri = node_uri(&base, &call.path, call.query.as_deref()).unwrap_or(base);
        let mut api_call = ApiCallDetails::new(call.method, uri);
        api_call.status = last_status;
        api_call.original_error = Some(message.clone());
        api_call.audit_trail = self.audit_trail;
        if self.settings.disable_direct_streaming {
            api_call.request_body = call.body;
        }

        Err(PipelineError {
            failure,
            message,
            api_call,
        })
    }

    fn finish(&mut self, call: &CallData, node: &Url, raw: RawResponse) -> CallOutcome {
        let uri = node_uri(node, &call.path, call.query.as_deref()).unwrap_or_else(|_| node.clone());
        let mut api_call = ApiCallDetails::new(call.method, uri);
        api_call.status = Some(raw.status);
        api_call.success = raw.is_success();
        api_call.audit_trail = std::mem::take(&mut self.audit_trail);
        api_call.deprecation_warnings = raw
            .headers
            .iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case("warning"))
            .map(|(_, v)| v.clone())
            .collect();
        if self.settings.disable_direct_streaming {
            api_call.request_body = call.body.clone();
            api_call.response_body = Some(raw.body.clone());
        }
        debug!(status = raw.status, uri = %api_call.uri, "Request completed");

        CallOutcome {
            api_call,
            body: raw.body,
        }
    }

    fn mark_dead(&self, node: &Node) {
        let dead_until = self.pool.mark_dead(
            &node.uri,
            self.now(),
            self.settings.dead_timeout,
            self.settings.max_dead_timeout,
        );
        if let Some(until) = dead_until {
            warn!(node = %node.uri, dead_until = %until, "Marking node dead");
            metrics::record_node_dead(node.uri.as_str());
        }
    }

    async fn ping(&mut self, node: &Node) -> Result<(), String> {
        if self.settings.disable_pings || !self.pool.supports_pinging() || !node.is_resurrected {
            return Ok(());
        }

        let started = self.now();
        let timeout = self.settings.ping_timeout;
        let result = match self.request_data(node, HttpMethod::Head, "/", None, None, "application/json", timeout) {
            Ok(request) => self.connection.request(&request).await.map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };
        let result = result.and_then(|raw| {
            if raw.is_success() {
                Ok(())
            } else {
                Err(format!("ping returned status {}", raw.status))
            }
        });

        metrics::record_ping(result.is_ok());
        match &result {
            Ok(()) => self.audit(AuditEvent::PingSuccess, Some(&node.uri), started),
            Err(e) => {
                debug!(node = %node.uri, error = %e, "Ping failed");
                self.audit_error(AuditEvent::PingFailure, &node.uri, started, e);
            }
        }
        result
    }

    async fn sniff_on_startup(&mut self) {
        if !self.settings.sniff_on_startup || !self.pool.supports_reseeding() {
            return;
        }
        if !self.pool.claim_startup_sniff() {
            return;
        }
        let now = self.now();
        self.audit(AuditEvent::SniffOnStartup, None, now);
        if !self.sniff("startup").await {
            warn!("Sniff on startup failed, continuing with seed nodes");
        }
    }

    async fn sniff_on_stale_cluster(&mut self) {
        if !self.pool.supports_reseeding() {
            return;
        }
        let Some(lifespan) = self.settings.sniff_lifespan else {
            return;
        };
        if !self.pool.is_stale(self.now(), lifespan) {
            return;
        }
        let now = self.now();
        self.audit(AuditEvent::SniffOnStaleCluster, None, now);
        self.sniff("stale_cluster").await;
    }

    /// At most once per call; `true` when the pool was reseeded
    async fn sniff_on_connection_fault(&mut self) -> bool {
        if !self.settings.sniff_on_connection_fault
            || !self.pool.supports_reseeding()
            || self.sniffed_on_fault
        {
            return false;
        }
        self.sniffed_on_fault = true;
        let now = self.now();
        self.audit(AuditEvent::SniffOnFail, None, now);
        self.sniff("connection_fault").await
    }

    /// Ask nodes for the cluster state until one answers; `true` when reseeded
    async fn sniff(&mut self, trigger: &str) -> bool {
        let view = self.pool.create_view(self.now());
        let timeout = self.settings.sniff_timeout;
        let query = sniff_query(timeout);
        let query = encode_query(query.iter().map(|(k, v)| (k.as_str(), v.as_str())));

        for node in view.nodes {
            let started = self.now();
            let result = match self.request_data(
                &node,
                HttpMethod::Get,
                SNIFF_PATH,
                query.as_deref(),
                None,
                "application/json",
                timeout,
            ) {
                Ok(request) => self.connection.request(&request).await.map_err(|e| e.to_string()),
                Err(e) => Err(e.to_string()),
            };
            let nodes = result.and_then(|raw| read_sniff_response(&raw, node.uri.scheme()));

            metrics::record_sniff(trigger, nodes.is_ok());
            match nodes {
                Ok(nodes) => {
                    self.audit(AuditEvent::SniffSuccess, Some(&node.uri), started);
                    info!(node = %node.uri, nodes = nodes.len(), "Sniffed cluster state");
                    let now = self.now();
                    self.pool.reseed(nodes, now);
                    metrics::set_pool_size(self.pool.node_count());
                    return true;
                }
                Err(e) => {
                    warn!(node = %node.uri, error = %e, "Sniff failed");
                    self.audit_error(AuditEvent::SniffFailure, &node.uri, started, &e);
                }
            }
        }
        false
    }
}

fn read_sniff_response(raw: &RawResponse, scheme: &str) -> Result<Vec<Node>, String> {
    if !raw.is_success() {
        return Err(format!("sniff returned status {}", raw.status));
    }
    let response: NodesInfoResponse =
        serde_json::from_slice(&raw.body).map_err(|e| format!("unreadable sniff response: {}", e))?;
    let nodes = nodes_from_response(&response, scheme);
    if nodes.is_empty() {
        return Err("sniff returned no usable nodes".to_string());
    }
    Ok(nodes)
}

/// Node base url joined with an absolute path and optional query
pub(crate) fn node_uri(node: &Url, path: &str, query: Option<&str>) -> Result<Url, url::ParseError> {
    let mut uri = node.as_str().trim_end_matches('/').to_string();
    if !path.starts_with('/') {
        uri.push('/');
    }
    uri.push_str(path);
    if let Some(query) = query.filter(|q| !q.is_empty()) {
        uri.push('?');
        uri.push_str(query);
    }
    Url::parse(&uri)
}
