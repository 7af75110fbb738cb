use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Something notable the request pipeline did while serving a call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEvent {
    SniffOnStartup,
    SniffOnFail,
    SniffOnStaleCluster,
    SniffSuccess,
    SniffFailure,
    PingSuccess,
    PingFailure,
    Resurrection,
    AllNodesDead,
    HealthyResponse,
    BadResponse,
    BadRequest,
    MaxTimeoutReached,
    MaxRetriesReached,
    NoNodesAttempted,
}

impl AuditEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditEvent::SniffOnStartup => "sniff_on_startup",
            AuditEvent::SniffOnFail => "sniff_on_fail",
            AuditEvent::SniffOnStaleCluster => "sniff_on_stale_cluster",
            AuditEvent::SniffSuccess => "sniff_success",
            AuditEvent::SniffFailure => "sniff_failure",
            AuditEvent::PingSuccess => "ping_success",
            AuditEvent::PingFailure => "ping_failure",
            AuditEvent::Resurrection => "resurrection",
            AuditEvent::AllNodesDead => "all_nodes_dead",
            AuditEvent::HealthyResponse => "healthy_response",
            AuditEvent::BadResponse => "bad_response",
            AuditEvent::BadRequest => "bad_request",
            AuditEvent::MaxTimeoutReached => "max_timeout_reached",
            AuditEvent::MaxRetriesReached => "max_retries_reached",
            AuditEvent::NoNodesAttempted => "no_nodes_attempted",
        }
    }
}

impl fmt::Display for AuditEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Audit {
    pub event: AuditEvent,
    pub node: Option<Url>,
    pub started: DateTime<Utc>,
    pub ended: DateTime<Utc>,
    pub exception: Option<String>,
}

impl Audit {
    pub fn new(event: AuditEvent, node: Option<&Url>, started: DateTime<Utc>) -> Self {
        Self {
            event,
            node: node.cloned(),
            started,
            ended: started,
            exception: None,
        }
    }

    pub fn ended_at(mut self, ended: DateTime<Utc>) -> Self {
        self.ended = ended;
        self
    }

    pub fn with_exception(mut self, exception: impl Into<String>) -> Self {
        self.exception = Some(exception.into());
        self
    }

    pub fn port(&self) -> Option<u16> {
        self.node.as_ref().and_then(Url::port_or_known_default)
    }
}

impl fmt::Display for Audit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let took = (self.ended - self.started).num_milliseconds();
        match &self.node {
            Some(node) => write!(f, "{}: Node: {} Took: {}ms", self.event, node, took)?,
            None => write!(f, "{}: Took: {}ms", self.event, took)?,
        }
        if let Some(exception) = &self.exception {
            write!(f, " Exception: {}", exception)?;
        }
        Ok(())
    }
}
