//! Connection settings
//!
//! [`ConnectionSettings`] is the in-memory form every other component reads:
//! node addresses, pool behaviour, timeouts, retry budget and the inference
//! defaults. It is built fluently or converted from a [`crate::ClientConfig`].

use crate::infer::Document;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;
use url::Url;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_PING_TIMEOUT: Duration = Duration::from_secs(2);
pub const DEFAULT_DEAD_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_MAX_DEAD_TIMEOUT: Duration = Duration::from_secs(30 * 60);
pub const DEFAULT_SNIFF_TIMEOUT: Duration = Duration::from_secs(2);

/// How the node pool treats its seed nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolKind {
    /// One node, never pinged, never marked dead
    #[default]
    SingleNode,
    /// Fixed node list, round robin with pings and dead marking
    Static,
    /// Like static, but the node list is refreshed by sniffing the cluster
    Sniffing,
}

impl PoolKind {
    pub fn supports_pinging(&self) -> bool {
        !matches!(self, PoolKind::SingleNode)
    }

    pub fn supports_reseeding(&self) -> bool {
        matches!(self, PoolKind::Sniffing)
    }
}

/// Per document type inference overrides
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMapping {
    pub index_name: Option<String>,
    pub type_name: Option<String>,
}

impl DocumentMapping {
    pub fn index_name(mut self, index: impl Into<String>) -> Self {
        self.index_name = Some(index.into());
        self
    }

    pub fn type_name(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct ConnectionSettings {
    pub nodes: Vec<Url>,
    pub pool: PoolKind,

    pub default_index: Option<String>,
    pub default_type_name: Option<String>,
    pub mappings: HashMap<String, DocumentMapping>,

    pub request_timeout: Duration,
    pub ping_timeout: Duration,
    pub dead_timeout: Duration,
    pub max_dead_timeout: Duration,
    /// `None` retries once per remaining node
    pub max_retries: Option<usize>,
    /// `None` falls back to the request timeout
    pub max_retry_timeout: Option<Duration>,

    pub sniff_on_startup: bool,
    pub sniff_on_connection_fault: bool,
    pub sniff_lifespan: Option<Duration>,
    pub sniff_timeout: Duration,
    pub disable_pings: bool,

    /// Keep request and response bytes on the call details
    pub disable_direct_streaming: bool,
    pub pretty_json: bool,
    /// Turn invalid responses into errors
    pub throw_exceptions: bool,

    pub basic_auth: Option<(String, String)>,
    pub api_key: Option<String>,
    pub headers: Vec<(String, String)>,
    pub query_string: BTreeMap<String, String>,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self::single_node(default_node())
    }
}

pub const DEFAULT_NODE: &str = "http://localhost:9200";

pub(crate) fn default_node() -> Url {
    Url::parse(DEFAULT_NODE).expect("DEFAULT_NODE is a valid url")
}

impl ConnectionSettings {
    /// Settings talking to a single node
    pub fn single_node(node: Url) -> Self {
        Self::with_pool(PoolKind::SingleNode, vec![node])
    }

    /// Settings over a fixed node list
    pub fn static_nodes(nodes: Vec<Url>) -> Self {
        Self::with_pool(PoolKind::Static, nodes)
    }

    /// Settings over a seed list refreshed by sniffing
    pub fn sniffing(nodes: Vec<Url>) -> Self {
        Self::with_pool(PoolKind::Sniffing, nodes)
    }

    pub fn with_pool(pool: PoolKind, nodes: Vec<Url>) -> Self {
        Self {
            nodes,
            pool,
            default_index: None,
            default_type_name: None,
            mappings: HashMap::new(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            ping_timeout: DEFAULT_PING_TIMEOUT,
            dead_timeout: DEFAULT_DEAD_TIMEOUT,
            max_dead_timeout: DEFAULT_MAX_DEAD_TIMEOUT,
            max_retries: None,
            max_retry_timeout: None,
            sniff_on_startup: pool.supports_reseeding(),
            sniff_on_connection_fault: pool.supports_reseeding(),
            sniff_lifespan: None,
            sniff_timeout: DEFAULT_SNIFF_TIMEOUT,
            disable_pings: false,
            disable_direct_streaming: false,
            pretty_json: false,
            throw_exceptions: false,
            basic_auth: None,
            api_key: None,
            headers: Vec::new(),
            query_string: BTreeMap::new(),
        }
    }

    pub fn default_index(mut self, index: impl Into<String>) -> Self {
        self.default_index = Some(index.into());
        self
    }

    pub fn default_type_name(mut self, type_name: impl Into<String>) -> Self {
        self.default_type_name = Some(type_name.into());
        self
    }

    pub fn default_mapping_for<T: Document>(
        mut self,
        configure: impl FnOnce(DocumentMapping) -> DocumentMapping,
    ) -> Self {
        let mapping = self.mappings.remove(T::TYPE_NAME).unwrap_or_default();
        self.mappings
            .insert(T::TYPE_NAME.to_string(), configure(mapping));
        self
    }

    pub fn mapping_for(&self, type_name: &str) -> Option<&DocumentMapping> {
        self.mappings.get(type_name)
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn ping_timeout(mut self, timeout: Duration) -> Self {
        self.ping_timeout = timeout;
        self
    }

    pub fn dead_timeout(mut self, timeout: Duration) -> Self {
        self.dead_timeout = timeout;
        self
    }

    pub fn max_dead_timeout(mut self, timeout: Duration) -> Self {
        self.max_dead_timeout = timeout;
        self
    }

    pub fn maximum_retries(mut self, retries: usize) -> Self {
        self.max_retries = Some(retries);
        self
    }

    pub fn max_retry_timeout(mut self, timeout: Duration) -> Self {
        self.max_retry_timeout = Some(timeout);
        self
    }

    pub fn sniff_on_startup(mut self, enabled: bool) -> Self {
        self.sniff_on_startup = enabled;
        self
    }

    pub fn sniff_on_connection_fault(mut self, enabled: bool) -> Self {
        self.sniff_on_connection_fault = enabled;
        self
    }

    pub fn sniff_lifespan(mut self, lifespan: Duration) -> Self {
        self.sniff_lifespan = Some(lifespan);
        self
    }

    pub fn disable_pings(mut self) -> Self {
        self.disable_pings = true;
        self
    }

    pub fn disable_direct_streaming(mut self) -> Self {
        self.disable_direct_streaming = true;
        self
    }

    pub fn pretty_json(mut self) -> Self {
        self.pretty_json = true;
        self
    }

    pub fn throw_exceptions(mut self) -> Self {
        self.throw_exceptions = true;
        self
    }

    pub fn basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.basic_auth = Some((username.into(), password.into()));
        self
    }

    /// Base64 encoded `id:api_key`
    pub fn api_key(mut self, encoded: impl Into<String>) -> Self {
        self.api_key = Some(encoded.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Query string parameter added to every request
    pub fn global_query_string(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_string.insert(key.into(), value.into());
        self
    }

    /// Retry budget for a pool of `node_count` nodes
    pub fn effective_max_retries(&self, node_count: usize) -> usize {
        match self.max_retries {
            Some(retries) => retries.min(node_count.saturating_sub(1)),
            None => node_count.saturating_sub(1),
        }
    }

    pub fn effective_max_retry_timeout(&self) -> Duration {
        self.max_retry_timeout.unwrap_or(self.request_timeout)
    }
}
