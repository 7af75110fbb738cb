//! Turning a nodes info document into pool nodes

use super::node::Node;
use crate::response::{NodeInfo, NodesInfoResponse};
use serde_json::Value;
use std::time::Duration;
use url::Url;

pub const SNIFF_PATH: &str = "/_nodes/http,settings";

/// Query string of a sniff request, e.g. `flat_settings&timeout=2s`
pub fn sniff_query(timeout: Duration) -> Vec<(String, String)> {
    vec![
        ("flat_settings".to_string(), String::new()),
        ("timeout".to_string(), format_timeout(timeout)),
    ]
}

/// Elasticsearch time unit notation
pub fn format_timeout(timeout: Duration) -> String {
    let millis = timeout.as_millis();
    if millis % 1000 == 0 {
        format!("{}s", millis / 1000)
    } else {
        format!("{}ms", millis)
    }
}

/// Split `host/ip:port` or `ip:port` into the host to dial and its port
pub fn parse_publish_address(address: &str) -> Option<(String, u16)> {
    let (fqdn, rest) = match address.split_once('/') {
        Some((fqdn, rest)) => (Some(fqdn), rest),
        None => (None, address),
    };
    let (ip, port) = rest.rsplit_once(':')?;
    let port = port.parse().ok()?;
    let host = match fqdn {
        Some(fqdn) if !fqdn.is_empty() => fqdn,
        _ => ip,
    };
    if host.is_empty() {
        return None;
    }
    Some((host.to_string(), port))
}

/// Nodes from a sniff response, dropping dedicated masters and nodes without http
pub fn nodes_from_response(response: &NodesInfoResponse, scheme: &str) -> Vec<Node> {
    let mut ids: Vec<&String> = response.nodes.keys().collect();
    ids.sort();

    ids.into_iter()
        .filter_map(|id| {
            let info = &response.nodes[id];
            let node = node_from_info(id, info, scheme)?;
            (!node.is_master_only() && node.http_enabled).then_some(node)
        })
        .collect()
}

fn node_from_info(id: &str, info: &NodeInfo, scheme: &str) -> Option<Node> {
    let http = info.http.as_ref()?;
    let (host, port) = parse_publish_address(&http.publish_address)?;
    let uri = Url::parse(&format!("{}://{}:{}", scheme, host, port)).ok()?;

    let mut node = Node::new(uri);
    node.id = Some(id.to_string());
    node.name = info.name.clone();
    node.http_enabled = info.http_enabled();
    node.settings = info.settings.clone();
    if info.roles.is_empty() {
        node.master_eligible = flat_flag(info.settings.as_ref(), "node.master");
        node.holds_data = flat_flag(info.settings.as_ref(), "node.data");
    } else {
        node.master_eligible = info.master_eligible();
        node.holds_data = info.holds_data();
    }
    Some(node)
}

/// Boolean node setting, true when absent
fn flat_flag(settings: Option<&Value>, key: &str) -> bool {
    match settings.and_then(|s| s.get(key)) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s != "false",
        _ => true,
    }
}
