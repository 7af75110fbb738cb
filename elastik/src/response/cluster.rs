use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// `GET /`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RootNodeInfoResponse {
    pub name: String,
    #[serde(default)]
    pub cluster_name: Option<String>,
    #[serde(default)]
    pub cluster_uuid: Option<String>,
    pub version: VersionInfo,
    pub tagline: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionInfo {
    pub number: String,
    #[serde(default)]
    pub build_hash: Option<String>,
    #[serde(default)]
    pub build_timestamp: Option<String>,
    #[serde(default)]
    pub build_date: Option<String>,
    #[serde(default)]
    pub build_snapshot: bool,
    pub lucene_version: String,
}

/// `GET /_nodes/http,settings`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodesInfoResponse {
    #[serde(default)]
    pub cluster_name: Option<String>,
    #[serde(default)]
    pub nodes: HashMap<String, NodeInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub http: Option<NodeHttp>,
    #[serde(default)]
    pub settings: Option<Value>,
}

impl NodeInfo {
    pub fn master_eligible(&self) -> bool {
        self.roles.iter().any(|r| r == "master")
    }

    pub fn holds_data(&self) -> bool {
        self.roles.iter().any(|r| r == "data" || r.starts_with("data_"))
    }

    pub fn ingest_enabled(&self) -> bool {
        self.roles.iter().any(|r| r == "ingest")
    }

    pub fn http_enabled(&self) -> bool {
        self.http.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeHttp {
    #[serde(default)]
    pub bound_address: Vec<String>,
    pub publish_address: String,
}

/// `GET /_cluster/health`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterHealthResponse {
    pub cluster_name: String,
    pub status: String,
    #[serde(default)]
    pub timed_out: bool,
    pub number_of_nodes: u32,
    pub number_of_data_nodes: u32,
    pub active_primary_shards: u32,
    pub active_shards: u32,
    pub relocating_shards: u32,
    pub initializing_shards: u32,
    pub unassigned_shards: u32,
    #[serde(default)]
    pub number_of_pending_tasks: u32,
    #[serde(default)]
    pub active_shards_percent_as_number: Option<f64>,
}
