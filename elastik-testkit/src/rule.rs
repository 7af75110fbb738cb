//! Scripted behaviour of a virtual node

use crate::cluster::VirtualCluster;
use serde_json::Value;
use std::time::Duration;

/// How many calls a rule covers
///
/// `Count(n)` is zero based: a succeeding `Count(0)` rule succeeds once and
/// fails afterwards, a failing one fails once and succeeds afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Times {
    Always,
    Count(u32),
}

impl Times {
    pub fn once() -> Self {
        Times::Count(0)
    }

    pub fn twice() -> Self {
        Times::Count(1)
    }

    /// Covers `calls` calls, at least one
    pub fn calls(calls: u32) -> Self {
        Times::Count(calls.saturating_sub(1))
    }
}

/// What a failing rule hands back
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailWith {
    Status(u16),
    Error(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    /// `None` applies to every node
    pub on_port: Option<u16>,
    pub times: Times,
    pub succeeds: bool,
    pub takes: Option<Duration>,
    /// `None` on a failing rule is a connection error
    pub fail_with: Option<FailWith>,
    pub return_response: Option<Vec<u8>>,
    /// Cluster a succeeding sniff switches to: nodes, rules and sniff settings
    pub new_cluster: Option<Box<VirtualCluster>>,
}

impl Rule {
    fn new(times: Times, succeeds: bool) -> Self {
        Self {
            on_port: None,
            times,
            succeeds,
            takes: None,
            fail_with: None,
            return_response: None,
            new_cluster: None,
        }
    }

    pub fn succeeds(times: Times) -> Self {
        Self::new(times, true)
    }

    pub fn fails(times: Times) -> Self {
        Self::new(times, false)
    }

    pub fn on_port(mut self, port: u16) -> Self {
        self.on_port = Some(port);
        self
    }

    /// Virtual time the call takes, capped at the request timeout
    pub fn takes(mut self, duration: Duration) -> Self {
        self.takes = Some(duration);
        self
    }

    /// Failures answer with this status; 2xx is turned into 502
    pub fn return_status(mut self, status: u16) -> Self {
        self.fail_with = Some(FailWith::Status(status));
        self
    }

    pub fn return_error(mut self, message: impl Into<String>) -> Self {
        self.fail_with = Some(FailWith::Error(message.into()));
        self
    }

    pub fn return_response(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.return_response = Some(body.into());
        self
    }

    pub fn return_json(self, body: Value) -> Self {
        self.return_response(body.to_string())
    }

    /// After a successful sniff the cluster is replaced by `cluster`
    pub fn then_cluster(mut self, cluster: VirtualCluster) -> Self {
        self.new_cluster = Some(Box::new(cluster));
        self
    }
}
