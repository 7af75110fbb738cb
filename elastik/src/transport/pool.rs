use super::node::Node;
use crate::settings::{ConnectionSettings, PoolKind};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use url::Url;

/// Nodes handed to one call, in the order they should be tried
#[derive(Debug, Clone, Default)]
pub struct NodeView {
    pub nodes: Vec<Node>,
    /// Every node was dead and the one closest to resurrection was forced back
    pub all_nodes_dead: bool,
}

#[derive(Debug)]
struct PoolState {
    nodes: Vec<Node>,
    last_update: DateTime<Utc>,
}

/// Shared node list with round robin selection and dead node bookkeeping
#[derive(Debug)]
pub struct NodePool {
    kind: PoolKind,
    state: RwLock<PoolState>,
    cursor: AtomicUsize,
    sniffed_on_startup: AtomicBool,
}

impl NodePool {
    pub fn new(kind: PoolKind, uris: Vec<Url>, now: DateTime<Utc>) -> Self {
        let mut nodes: Vec<Node> = uris.into_iter().map(Node::new).collect();
        if kind == PoolKind::SingleNode {
            nodes.truncate(1);
        }
        Self {
            kind,
            state: RwLock::new(PoolState {
                nodes,
                last_update: now,
            }),
            cursor: AtomicUsize::new(0),
            sniffed_on_startup: AtomicBool::new(false),
        }
    }

    pub fn from_settings(settings: &ConnectionSettings, now: DateTime<Utc>) -> Self {
        Self::new(settings.pool, settings.nodes.clone(), now)
    }

    pub fn kind(&self) -> PoolKind {
        self.kind
    }

    pub fn supports_pinging(&self) -> bool {
        self.kind.supports_pinging()
    }

    pub fn supports_reseeding(&self) -> bool {
        self.kind.supports_reseeding()
    }

    pub fn node_count(&self) -> usize {
        self.state.read().nodes.len()
    }

    pub fn nodes(&self) -> Vec<Node> {
        self.state.read().nodes.clone()
    }

    pub fn last_update(&self) -> DateTime<Utc> {
        self.state.read().last_update
    }

    pub fn sniffed_on_startup(&self) -> bool {
        self.sniffed_on_startup.load(Ordering::SeqCst)
    }

    /// Claim the startup sniff; only the first caller gets `true`
    pub fn claim_startup_sniff(&self) -> bool {
        self.sniffed_on_startup
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    /// Whether the node list is older than `lifespan`
    pub fn is_stale(&self, now: DateTime<Utc>, lifespan: Duration) -> bool {
        match chrono::Duration::from_std(lifespan) {
            Ok(lifespan) => self.last_update() + lifespan < now,
            Err(_) => false,
        }
    }

    /// Nodes to try for one call, rotated from the shared cursor
    pub fn create_view(&self, now: DateTime<Utc>) -> NodeView {
        let mut state = self.state.write();
        if state.nodes.is_empty() {
            return NodeView::default();
        }

        if self.kind == PoolKind::SingleNode {
            return NodeView {
                nodes: vec![state.nodes[0].clone()],
                all_nodes_dead: false,
            };
        }

        let usable: Vec<usize> = state
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.is_usable(now))
            .map(|(i, _)| i)
            .collect();

        if usable.is_empty() {
            let Some(closest) = state
                .nodes
                .iter_mut()
                .min_by_key(|n| n.dead_until.unwrap_or(now))
            else {
                return NodeView::default();
            };
            closest.is_resurrected = true;
            return NodeView {
                nodes: vec![closest.clone()],
                all_nodes_dead: true,
            };
        }

        let start = self.cursor.fetch_add(1, Ordering::SeqCst) % usable.len();
        let mut nodes = Vec::with_capacity(usable.len());
        for offset in 0..usable.len() {
            let node = &mut state.nodes[usable[(start + offset) % usable.len()]];
            if !node.is_alive {
                node.is_resurrected = true;
            }
            nodes.push(node.clone());
        }

        NodeView {
            nodes,
            all_nodes_dead: false,
        }
    }

    pub fn mark_alive(&self, uri: &Url) {
        let mut state = self.state.write();
        if let Some(node) = state.nodes.iter_mut().find(|n| &n.uri == uri) {
            node.mark_alive();
        }
    }

    /// Returns when the node may be retried, `None` for pools that never kill nodes
    pub fn mark_dead(
        &self,
        uri: &Url,
        now: DateTime<Utc>,
        dead_timeout: Duration,
        max_dead_timeout: Duration,
    ) -> Option<DateTime<Utc>> {
        if self.kind == PoolKind::SingleNode {
            return None;
        }
        let mut state = self.state.write();
        let node = state.nodes.iter_mut().find(|n| &n.uri == uri)?;
        node.mark_dead(now, dead_timeout, max_dead_timeout);
        node.dead_until
    }

    /// Replace the node list with a freshly sniffed one
    pub fn reseed(&self, nodes: Vec<Node>, now: DateTime<Utc>) {
        if !self.supports_reseeding() || nodes.is_empty() {
            return;
        }
        let mut state = self.state.write();
        state.nodes = nodes;
        state.last_update = now;
        self.cursor.store(0, Ordering::SeqCst);
    }
}
