//! Transport metrics
//!
//! Prometheus-compatible counters and histograms for calls, node deaths,
//! sniffs and pings.

use crate::http::HttpMethod;
use std::time::Duration;

/// Record a finished call
pub fn record_request(method: HttpMethod, status: &str, duration: Duration) {
    metrics::counter!(
        "elastik_requests_total",
        "method" => method.as_str(),
        "status" => status.to_string(),
    )
    .increment(1);

    metrics::histogram!(
        "elastik_request_duration_seconds",
        "method" => method.as_str(),
    )
    .record(duration.as_secs_f64());
}

/// Record a call the pipeline gave up on
pub fn record_request_failure(method: HttpMethod, failure: &str) {
    metrics::counter!(
        "elastik_request_failures_total",
        "method" => method.as_str(),
        "failure" => failure.to_string(),
    )
    .increment(1);
}

/// Record a node being marked dead
pub fn record_node_dead(node: &str) {
    metrics::counter!(
        "elastik_node_deaths_total",
        "node" => node.to_string(),
    )
    .increment(1);
}

pub fn record_retry() {
    metrics::counter!("elastik_retries_total").increment(1);
}

/// Record a sniff attempt
pub fn record_sniff(trigger: &str, success: bool) {
    metrics::counter!(
        "elastik_sniffs_total",
        "trigger" => trigger.to_string(),
        "status" => if success { "ok" } else { "error" },
    )
    .increment(1);
}

/// Record a ping attempt
pub fn record_ping(success: bool) {
    metrics::counter!(
        "elastik_pings_total",
        "status" => if success { "ok" } else { "error" },
    )
    .increment(1);
}

/// Update the number of nodes in the pool
pub fn set_pool_size(count: usize) {
    metrics::gauge!("elastik_pool_nodes").set(count as f64);
}
