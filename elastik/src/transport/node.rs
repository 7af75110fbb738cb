use chrono::{DateTime, Utc};
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// A node known to the pool together with its liveness bookkeeping
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub uri: Url,
    pub id: Option<String>,
    pub name: Option<String>,
    pub master_eligible: bool,
    pub holds_data: bool,
    pub http_enabled: bool,
    pub settings: Option<Value>,

    pub is_alive: bool,
    /// Set for fresh nodes and nodes coming back from the dead; such nodes are
    /// pinged before they serve a call
    pub is_resurrected: bool,
    pub failed_attempts: u32,
    pub dead_until: Option<DateTime<Utc>>,
}

impl Node {
    pub fn new(uri: Url) -> Self {
        Self {
            uri,
            id: None,
            name: None,
            master_eligible: true,
            holds_data: true,
            http_enabled: true,
            settings: None,
            is_alive: true,
            is_resurrected: true,
            failed_attempts: 0,
            dead_until: None,
        }
    }

    pub fn port(&self) -> Option<u16> {
        self.uri.port_or_known_default()
    }

    /// Dedicated master nodes do not serve client traffic
    pub fn is_master_only(&self) -> bool {
        self.master_eligible && !self.holds_data
    }

    /// Alive, or dead long enough to be retried
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        self.is_alive || self.dead_until.map_or(true, |until| until <= now)
    }

    pub fn mark_alive(&mut self) {
        self.is_alive = true;
        self.is_resurrected = false;
        self.failed_attempts = 0;
        self.dead_until = None;
    }

    pub fn mark_dead(&mut self, now: DateTime<Utc>, dead_timeout: Duration, max_dead_timeout: Duration) {
        self.failed_attempts += 1;
        self.is_alive = false;
        let timeout = dead_time(self.failed_attempts, dead_timeout, max_dead_timeout);
        let timeout = chrono::Duration::from_std(timeout).unwrap_or_else(|_| chrono::Duration::days(1));
        self.dead_until = Some(now + timeout);
    }
}

/// Back-off for a node that failed `attempts` times in a row
pub fn dead_time(attempts: u32, dead_timeout: Duration, max_dead_timeout: Duration) -> Duration {
    let factor = 2.0 * 2f64.powf(f64::from(attempts) * 0.5 - 1.0);
    let millis = (dead_timeout.as_millis() as f64 * factor).min(max_dead_timeout.as_millis() as f64);
    Duration::from_millis(millis as u64)
}
