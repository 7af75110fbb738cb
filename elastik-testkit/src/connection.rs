//! Connection answering from a [`VirtualCluster`]
//!
//! Every request is classified as a sniff, a ping or a client call and
//! matched against that kind's rules: port specific rules first, then the
//! first general rule, else the default success answer.

use crate::clock::TestableClock;
use crate::cluster::{VirtualCluster, VirtualNode};
use crate::rule::{FailWith, Rule, Times};
use async_trait::async_trait;
use elastik::transport::{Connection, ConnectionError, RawResponse, RequestData, SNIFF_PATH};
use elastik::HttpMethod;
use parking_lot::RwLock;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Default)]
struct PortState {
    called: AtomicU32,
    pinged: AtomicU32,
    sniffed: AtomicU32,
    successes: AtomicU32,
    failures: AtomicU32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CallKind {
    Sniff,
    Ping,
    ClientCall,
}

impl CallKind {
    fn of(request: &RequestData) -> Self {
        if request.path.starts_with(SNIFF_PATH) {
            CallKind::Sniff
        } else if request.path == "/" && request.method == HttpMethod::Head {
            CallKind::Ping
        } else {
            CallKind::ClientCall
        }
    }
}

#[derive(Debug)]
struct ClusterState {
    cluster: VirtualCluster,
    ports: HashMap<u16, Arc<PortState>>,
}

impl ClusterState {
    fn new(cluster: VirtualCluster) -> Self {
        let ports = port_states(&cluster.nodes);
        Self { cluster, ports }
    }
}

fn port_states(nodes: &[VirtualNode]) -> HashMap<u16, Arc<PortState>> {
    nodes.iter().map(|n| (n.port, Arc::default())).collect()
}

/// In-memory connection scripted by rules
#[derive(Debug)]
pub struct VirtualClusterConnection {
    state: RwLock<ClusterState>,
    clock: Arc<TestableClock>,
}

impl VirtualClusterConnection {
    pub fn new(cluster: VirtualCluster, clock: Arc<TestableClock>) -> Self {
        Self {
            state: RwLock::new(ClusterState::new(cluster)),
            clock,
        }
    }

    /// Replace the whole cluster and reset every counter
    pub fn update_cluster(&self, cluster: VirtualCluster) {
        *self.state.write() = ClusterState::new(cluster);
    }

    pub fn ports(&self) -> Vec<u16> {
        self.state.read().cluster.nodes.iter().map(|n| n.port).collect()
    }

    pub fn called(&self, port: u16) -> u32 {
        self.counter(port, |s| &s.called)
    }

    pub fn pinged(&self, port: u16) -> u32 {
        self.counter(port, |s| &s.pinged)
    }

    pub fn sniffed(&self, port: u16) -> u32 {
        self.counter(port, |s| &s.sniffed)
    }

    pub fn successes(&self, port: u16) -> u32 {
        self.counter(port, |s| &s.successes)
    }

    pub fn failures(&self, port: u16) -> u32 {
        self.counter(port, |s| &s.failures)
    }

    fn counter(&self, port: u16, f: impl Fn(&PortState) -> &AtomicU32) -> u32 {
        self.state
            .read()
            .ports
            .get(&port)
            .map_or(0, |s| f(s).load(Ordering::SeqCst))
    }

    fn port_state(&self, port: u16) -> Option<Arc<PortState>> {
        self.state.read().ports.get(&port).cloned()
    }

    fn rules(&self, kind: CallKind) -> Vec<Rule> {
        let state = self.state.read();
        match kind {
            CallKind::Sniff => state.cluster.sniff_rules.clone(),
            CallKind::Ping => state.cluster.ping_rules.clone(),
            CallKind::ClientCall => state.cluster.client_call_rules.clone(),
        }
    }

    fn handle(
        &self,
        kind: CallKind,
        request: &RequestData,
        port: u16,
        port_state: &PortState,
    ) -> Result<RawResponse, ConnectionError> {
        let rules = self.rules(kind);
        let Some(rule) = select_rule(&rules, port) else {
            return Ok(RawResponse::new(200, self.success_body(kind, None)));
        };

        if let Some(takes) = rule.takes {
            let timeout = request.request_timeout;
            self.clock.advance(takes.min(timeout));
            if takes > timeout {
                return Err(ConnectionError::timeout(format!(
                    "request timed out after {:?}: call configured to take {:?} while the timeout was {:?}",
                    takes.min(timeout),
                    takes,
                    timeout
                )));
            }
        }

        let succeed = match rule.times {
            Times::Always => rule.succeeds,
            Times::Count(n) if rule.succeeds => n >= port_state.successes.load(Ordering::SeqCst),
            Times::Count(n) => n < port_state.failures.load(Ordering::SeqCst),
        };

        if succeed {
            port_state.successes.fetch_add(1, Ordering::SeqCst);
            if let (CallKind::Sniff, Some(cluster)) = (kind, &rule.new_cluster) {
                debug!(port, nodes = cluster.nodes.len(), "Virtual cluster changes shape");
                self.update_cluster(cluster.as_ref().clone());
            }
            Ok(RawResponse::new(200, self.success_body(kind, Some(rule))))
        } else {
            port_state.failures.fetch_add(1, Ordering::SeqCst);
            match &rule.fail_with {
                None => Err(ConnectionError::connect(format!("virtual node {} refused the call", port))),
                Some(FailWith::Error(message)) => Err(ConnectionError::connect(message.clone())),
                Some(FailWith::Status(status)) => {
                    let status = if (200..300).contains(status) { 502 } else { *status };
                    Ok(RawResponse::new(status, call_response(Some(rule))))
                }
            }
        }
    }

    fn success_body(&self, kind: CallKind, rule: Option<&Rule>) -> Vec<u8> {
        match kind {
            CallKind::ClientCall => call_response(rule),
            CallKind::Ping => Vec::new(),
            CallKind::Sniff => sniff_response(&self.state.read().cluster).to_string().into_bytes(),
        }
    }
}

#[async_trait]
impl Connection for VirtualClusterConnection {
    async fn request(&self, request: &RequestData) -> Result<RawResponse, ConnectionError> {
        let port = request
            .port()
            .ok_or_else(|| ConnectionError::connect(format!("no port in {}", request.uri)))?;
        let port_state = self
            .port_state(port)
            .ok_or_else(|| ConnectionError::connect(format!("no virtual node listens on port {}", port)))?;

        let kind = CallKind::of(request);
        let counter = match kind {
            CallKind::Sniff => &port_state.sniffed,
            CallKind::Ping => &port_state.pinged,
            CallKind::ClientCall => &port_state.called,
        };
        counter.fetch_add(1, Ordering::SeqCst);

        self.handle(kind, request, port, &port_state)
    }
}

fn select_rule(rules: &[Rule], port: u16) -> Option<&Rule> {
    rules
        .iter()
        .find(|r| r.on_port == Some(port))
        .or_else(|| rules.iter().find(|r| r.on_port.is_none()))
}

fn call_response(rule: Option<&Rule>) -> Vec<u8> {
    match rule.and_then(|r| r.return_response.clone()) {
        Some(body) => body,
        None => default_response().to_string().into_bytes(),
    }
}

/// Root node info every unscripted client call gets
pub fn default_response() -> Value {
    json!({
        "name": "Razor Fist",
        "cluster_name": "elasticsearch-test-cluster",
        "version": {
            "number": "2.0.0",
            "build_hash": "af1dc6d8099487755c3143c931665b709de3c764",
            "build_timestamp": "2015-07-07T11:28:47Z",
            "build_snapshot": true,
            "lucene_version": "5.2.1"
        },
        "tagline": "You Know, for Search"
    })
}

/// Nodes info document describing the cluster's current nodes
pub fn sniff_response(cluster: &VirtualCluster) -> Value {
    let host = cluster
        .publish_address_override
        .as_deref()
        .unwrap_or("127.0.0.1");

    let mut nodes = Map::new();
    for node in &cluster.nodes {
        let fqdn = if cluster.sniff_returns_fqdn {
            format!("fqdn{}/", node.port)
        } else {
            String::new()
        };
        let name = format!("SniffNode{}", node.port);

        let mut roles = Vec::new();
        if node.master_eligible {
            roles.push("master");
        }
        if node.holds_data {
            roles.push("data");
        }

        let mut settings = Map::new();
        settings.insert("cluster.name".to_string(), json!("elasticsearch"));
        settings.insert("node.name".to_string(), json!(name));

        let mut info = Map::new();
        info.insert("name".to_string(), json!(name));
        info.insert(
            "transport_address".to_string(),
            json!(format!("127.0.0.1:{}", u32::from(node.port) + 1000)),
        );
        info.insert("host".to_string(), json!(format!("{}{}", fqdn, host)));
        info.insert("ip".to_string(), json!("127.0.0.1"));
        info.insert("version".to_string(), json!("2.0.0"));
        info.insert("roles".to_string(), json!(roles));
        if node.http_enabled {
            info.insert(
                "http".to_string(),
                json!({
                    "bound_address": [format!("{}127.0.0.1:{}", fqdn, node.port)],
                    "publish_address": format!("{}{}:{}", fqdn, host, node.port),
                }),
            );
        } else {
            settings.insert("http.enabled".to_string(), json!(false));
        }
        info.insert("settings".to_string(), Value::Object(settings));

        nodes.insert(node_id(node.port), Value::Object(info));
    }

    json!({
        "cluster_name": "elasticsearch-test-cluster",
        "nodes": nodes,
    })
}

/// Stable id that sorts like the port
fn node_id(port: u16) -> String {
    Uuid::from_u128(u128::from(port)).to_string()
}
