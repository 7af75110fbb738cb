//! Virtual cluster definition
//!
//! A [`VirtualCluster`] lists nodes and the rules they follow. Sealing it
//! with a pool kind and settings yields a [`VirtualizedCluster`]: a client
//! wired to a [`VirtualClusterConnection`] and a [`TestableClock`].
//!
//! ```text
//! VirtualCluster::nodes(3).client_calls(..).ping(..)
//!   → .static_pool()          SealedVirtualCluster
//!   → .settings(|s| ..)       VirtualizedCluster { client, clock, connection }
//! ```

use crate::clock::TestableClock;
use crate::connection::VirtualClusterConnection;
use crate::rule::Rule;
use elastik::{ConnectionSettings, ElasticClient, LowLevelClient, PoolKind};
use std::sync::Arc;
use url::Url;

pub const FIRST_PORT: u16 = 9200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualNode {
    pub port: u16,
    pub master_eligible: bool,
    pub holds_data: bool,
    pub http_enabled: bool,
}

impl VirtualNode {
    pub fn new(port: u16) -> Self {
        Self {
            port,
            master_eligible: true,
            holds_data: true,
            http_enabled: true,
        }
    }

    /// Dedicated master, skipped by sniffing
    pub fn master_only(mut self) -> Self {
        self.master_eligible = true;
        self.holds_data = false;
        self
    }

    pub fn not_master_eligible(mut self) -> Self {
        self.master_eligible = false;
        self
    }

    pub fn http_disabled(mut self) -> Self {
        self.http_enabled = false;
        self
    }

    pub fn uri(&self) -> Url {
        node_uri(self.port)
    }
}

fn node_uri(port: u16) -> Url {
    Url::parse(&format!("http://localhost:{}", port)).expect("localhost with a port is a valid url")
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VirtualCluster {
    pub(crate) nodes: Vec<VirtualNode>,
    pub(crate) client_call_rules: Vec<Rule>,
    pub(crate) ping_rules: Vec<Rule>,
    pub(crate) sniff_rules: Vec<Rule>,
    pub(crate) publish_address_override: Option<String>,
    pub(crate) sniff_returns_fqdn: bool,
}

impl VirtualCluster {
    /// `count` nodes on consecutive ports from 9200
    pub fn nodes(count: u16) -> Self {
        Self::nodes_from(FIRST_PORT, count)
    }

    pub fn nodes_from(start_port: u16, count: u16) -> Self {
        Self::with_nodes((0..count).map(|i| VirtualNode::new(start_port + i)).collect())
    }

    pub fn with_nodes(nodes: Vec<VirtualNode>) -> Self {
        Self {
            nodes,
            ..Default::default()
        }
    }

    /// Appends `count` dedicated masters after the last node
    pub fn master_only_nodes(mut self, count: u16) -> Self {
        let next = self.nodes.iter().map(|n| n.port + 1).max().unwrap_or(FIRST_PORT);
        self.nodes
            .extend((0..count).map(|i| VirtualNode::new(next + i).master_only()));
        self
    }

    pub fn client_calls(mut self, rule: Rule) -> Self {
        self.client_call_rules.push(rule);
        self
    }

    pub fn ping(mut self, rule: Rule) -> Self {
        self.ping_rules.push(rule);
        self
    }

    pub fn sniff(mut self, rule: Rule) -> Self {
        self.sniff_rules.push(rule);
        self
    }

    /// Host advertised in sniffed publish addresses instead of `127.0.0.1`
    pub fn publish_address(mut self, host: impl Into<String>) -> Self {
        self.publish_address_override = Some(host.into());
        self
    }

    /// Sniffed publish addresses take the `fqdn/ip:port` form
    pub fn sniff_should_return_fqdn(mut self) -> Self {
        self.sniff_returns_fqdn = true;
        self
    }

    pub fn node_list(&self) -> &[VirtualNode] {
        &self.nodes
    }

    pub fn uris(&self) -> Vec<Url> {
        self.nodes.iter().map(VirtualNode::uri).collect()
    }

    pub fn single_node_pool(self) -> SealedVirtualCluster {
        self.seal(PoolKind::SingleNode)
    }

    pub fn static_pool(self) -> SealedVirtualCluster {
        self.seal(PoolKind::Static)
    }

    pub fn sniffing_pool(self) -> SealedVirtualCluster {
        self.seal(PoolKind::Sniffing)
    }

    fn seal(self, pool: PoolKind) -> SealedVirtualCluster {
        SealedVirtualCluster {
            cluster: self,
            pool,
            clock: Arc::new(TestableClock::new()),
        }
    }
}

/// A cluster bound to a pool kind, waiting for its settings
#[derive(Debug)]
pub struct SealedVirtualCluster {
    cluster: VirtualCluster,
    pool: PoolKind,
    clock: Arc<TestableClock>,
}

impl SealedVirtualCluster {
    pub fn clock(&self) -> &Arc<TestableClock> {
        &self.clock
    }

    pub fn all_defaults(self) -> VirtualizedCluster {
        self.settings(|s| s)
    }

    pub fn settings(self, f: impl FnOnce(ConnectionSettings) -> ConnectionSettings) -> VirtualizedCluster {
        let mut seeds = self.cluster.uris();
        if self.pool == PoolKind::SingleNode {
            seeds.truncate(1);
        }
        let settings = f(ConnectionSettings::with_pool(self.pool, seeds));
        let connection = Arc::new(VirtualClusterConnection::new(self.cluster, Arc::clone(&self.clock)));
        let client = ElasticClient::with_connection(
            settings,
            Arc::clone(&connection) as Arc<dyn elastik::transport::Connection>,
            Arc::clone(&self.clock) as Arc<dyn elastik::transport::Clock>,
        );
        VirtualizedCluster {
            client,
            clock: self.clock,
            connection,
        }
    }
}

/// A client talking to a virtual cluster
#[derive(Debug, Clone)]
pub struct VirtualizedCluster {
    client: ElasticClient,
    clock: Arc<TestableClock>,
    connection: Arc<VirtualClusterConnection>,
}

impl VirtualizedCluster {
    pub fn client(&self) -> &ElasticClient {
        &self.client
    }

    pub fn low_level(&self) -> LowLevelClient {
        self.client.low_level()
    }

    pub fn clock(&self) -> &TestableClock {
        &self.clock
    }

    pub fn connection(&self) -> &VirtualClusterConnection {
        &self.connection
    }
}
