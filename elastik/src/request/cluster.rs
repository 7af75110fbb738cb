use super::{build_path, Request};
use crate::error::Result;
use crate::http::{HttpMethod, RequestParameters};
use crate::infer::{Indices, Inferrer};
use crate::response::{ClusterHealthResponse, NodesInfoResponse, RootNodeInfoResponse};
use crate::transport::SNIFF_PATH;

/// `GET /`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RootNodeInfoRequest {
    pub params: RequestParameters,
}

impl RootNodeInfoRequest {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Request for RootNodeInfoRequest {
    type Response = RootNodeInfoResponse;

    fn method(&self) -> HttpMethod {
        HttpMethod::Get
    }

    fn path(&self, _inferrer: &Inferrer) -> Result<String> {
        Ok("/".to_string())
    }

    fn params(&self) -> &RequestParameters {
        &self.params
    }
}

/// `HEAD /`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PingRequest {
    pub params: RequestParameters,
}

impl PingRequest {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Request for PingRequest {
    type Response = ();

    fn method(&self) -> HttpMethod {
        HttpMethod::Head
    }

    fn path(&self, _inferrer: &Inferrer) -> Result<String> {
        Ok("/".to_string())
    }

    fn params(&self) -> &RequestParameters {
        &self.params
    }
}

/// `GET /_nodes/http,settings`, the request sniffing is built on
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodesInfoRequest {
    pub params: RequestParameters,
}

impl NodesInfoRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn flat_settings(mut self) -> Self {
        self.params.set("flat_settings", "");
        self
    }

    pub fn timeout(mut self, timeout: impl ToString) -> Self {
        self.params.set("timeout", timeout);
        self
    }
}

impl Request for NodesInfoRequest {
    type Response = NodesInfoResponse;

    fn method(&self) -> HttpMethod {
        HttpMethod::Get
    }

    fn path(&self, _inferrer: &Inferrer) -> Result<String> {
        Ok(SNIFF_PATH.to_string())
    }

    fn params(&self) -> &RequestParameters {
        &self.params
    }
}

/// `GET /_cluster/health[/{indices}]`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClusterHealthRequest {
    pub indices: Option<Indices>,
    pub params: RequestParameters,
}

impl ClusterHealthRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_indices(indices: impl Into<Indices>) -> Self {
        Self {
            indices: Some(indices.into()),
            ..Default::default()
        }
    }
}

impl Request for ClusterHealthRequest {
    type Response = ClusterHealthResponse;

    fn method(&self) -> HttpMethod {
        HttpMethod::Get
    }

    fn path(&self, inferrer: &Inferrer) -> Result<String> {
        match &self.indices {
            Some(indices) => {
                let indices = inferrer.indices(indices)?;
                build_path(&["_cluster", "health", indices.as_str()])
            }
            None => build_path(&["_cluster", "health"]),
        }
    }

    fn params(&self) -> &RequestParameters {
        &self.params
    }
}

#[derive(Debug, Clone, Default)]
pub struct ClusterHealthDescriptor {
    request: ClusterHealthRequest,
}

impl ClusterHealthDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn index(mut self, indices: impl Into<Indices>) -> Self {
        self.request.indices = Some(indices.into());
        self
    }

    /// `cluster`, `indices` or `shards`
    pub fn level(mut self, level: impl ToString) -> Self {
        self.request.params.set("level", level);
        self
    }

    pub fn wait_for_status(mut self, status: impl ToString) -> Self {
        self.request.params.set("wait_for_status", status);
        self
    }

    pub fn timeout(mut self, timeout: impl ToString) -> Self {
        self.request.params.set("timeout", timeout);
        self
    }

    pub fn local(mut self, local: bool) -> Self {
        self.request.params.set("local", local);
        self
    }
}

impl From<ClusterHealthDescriptor> for ClusterHealthRequest {
    fn from(descriptor: ClusterHealthDescriptor) -> Self {
        descriptor.request
    }
}
