//! Running calls against a virtual cluster and asserting their audit trail

use crate::cluster::VirtualizedCluster;
use elastik::transport::{Audit, AuditEvent, PipelineError};
use elastik::{ApiCallDetails, ElasticError};
use std::fmt::Write;
use std::time::Duration;

/// Expected audit: an event, optionally on a given port
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuditExpectation {
    pub event: AuditEvent,
    pub port: Option<u16>,
}

impl AuditExpectation {
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    fn matches(&self, audit: &Audit) -> bool {
        audit.event == self.event && self.port.map_or(true, |p| audit.port() == Some(p))
    }
}

pub fn audit(event: AuditEvent) -> AuditExpectation {
    AuditExpectation { event, port: None }
}

/// Panics with both trails when `trail` does not follow `expected`
pub fn assert_audit_trail(trail: &[Audit], expected: &[AuditExpectation]) {
    let matches = trail.len() == expected.len() && trail.iter().zip(expected).all(|(a, e)| e.matches(a));
    if !matches {
        panic!(
            "audit trail mismatch\nexpected:\n{}actual:\n{}",
            describe_expected(expected),
            describe_trail(trail)
        );
    }
}

fn describe_expected(expected: &[AuditExpectation]) -> String {
    let mut out = String::new();
    for e in expected {
        match e.port {
            Some(port) => writeln!(out, "  {} on {}", e.event, port),
            None => writeln!(out, "  {}", e.event),
        }
        .ok();
    }
    out
}

fn describe_trail(trail: &[Audit]) -> String {
    let mut out = String::new();
    for audit in trail {
        writeln!(out, "  {}", audit).ok();
    }
    out
}

/// Drives root node info calls through a virtual cluster
#[derive(Debug)]
pub struct Auditor {
    cluster: VirtualizedCluster,
}

impl Auditor {
    pub fn new(cluster: VirtualizedCluster) -> Self {
        Self { cluster }
    }

    pub fn cluster(&self) -> &VirtualizedCluster {
        &self.cluster
    }

    /// Move the cluster's clock forward between calls
    pub fn advance(&self, by: Duration) -> &Self {
        self.cluster.clock().advance(by);
        self
    }

    /// A call that must succeed with exactly this trail
    pub async fn trace_call(&self, expected: &[AuditExpectation]) -> ApiCallDetails {
        let response = match self.cluster.client().root_node_info().await {
            Ok(response) => response,
            Err(e) => panic!("expected a successful call, got: {}", describe_error(&e)),
        };
        assert!(
            response.is_valid(),
            "expected a valid response:\n{}",
            response.debug_information()
        );
        assert_audit_trail(&response.api_call().audit_trail, expected);
        response.api_call().clone()
    }

    /// Several successful calls in a row
    pub async fn trace_calls(&self, calls: &[&[AuditExpectation]]) {
        for expected in calls {
            self.trace_call(expected).await;
        }
    }

    /// A call that must fail in the pipeline with exactly this trail
    pub async fn trace_failure(&self, expected: &[AuditExpectation]) -> PipelineError {
        let error = match self.cluster.client().root_node_info().await {
            Ok(response) => panic!(
                "expected the call to fail:\n{}",
                response.debug_information()
            ),
            Err(ElasticError::Pipeline(e)) => *e,
            Err(e) => panic!("expected a pipeline failure, got: {}", e),
        };
        assert_audit_trail(error.audit_trail(), expected);
        error
    }
}

fn describe_error(error: &ElasticError) -> String {
    match error {
        ElasticError::Pipeline(e) => format!("{}\n{}", e, describe_trail(e.audit_trail())),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use url::Url;

    fn at(event: AuditEvent, port: u16) -> Audit {
        let node = Url::parse(&format!("http://localhost:{}", port)).unwrap();
        Audit::new(event, Some(&node), Utc::now())
    }

    #[test]
    fn test_expectations_match_events_and_ports() {
        let trail = vec![
            at(AuditEvent::PingSuccess, 9200),
            at(AuditEvent::HealthyResponse, 9200),
        ];
        assert_audit_trail(
            &trail,
            &[audit(AuditEvent::PingSuccess).port(9200), audit(AuditEvent::HealthyResponse)],
        );
    }

    #[test]
    #[should_panic(expected = "audit trail mismatch")]
    fn test_wrong_port_panics() {
        let trail = vec![at(AuditEvent::HealthyResponse, 9200)];
        assert_audit_trail(&trail, &[audit(AuditEvent::HealthyResponse).port(9201)]);
    }
}
