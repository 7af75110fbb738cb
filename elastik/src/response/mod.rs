//! Responses
//!
//! Every call yields an [`ElasticResponse`]: the typed body when one could be
//! read, the [`ApiCallDetails`] describing what went over the wire, and the
//! server's error document on failures.

mod cluster;
mod document;
mod search;
mod template;

pub use cluster::{
    ClusterHealthResponse, NodeHttp, NodeInfo, NodesInfoResponse, RootNodeInfoResponse,
    VersionInfo,
};
pub use document::{
    BulkItem, BulkItemResult, BulkResponse, DeleteResponse, GetResponse, IndexResponse, ShardStats,
};
pub use search::{
    ExplainResponse, Explanation, Hit, Hits, MultiTermVectorsResponse, SearchResponse,
    TermVectorsResult, TotalHits,
};
pub use template::{GetIndexTemplateResponse, TemplateMapping};

use crate::error::{ElasticError, Result};
use crate::http::HttpMethod;
use crate::transport::Audit;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt::Write as _;
use url::Url;

/// Acknowledgement returned by mutating index level APIs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcknowledgedResponse {
    #[serde(default)]
    pub acknowledged: bool,
}

/// What happened on the wire for one logical call
#[derive(Debug, Clone)]
pub struct ApiCallDetails {
    pub method: HttpMethod,
    pub uri: Url,
    pub status: Option<u16>,
    pub success: bool,
    /// Only kept when direct streaming is disabled
    pub request_body: Option<Vec<u8>>,
    /// Only kept when direct streaming is disabled
    pub response_body: Option<Vec<u8>>,
    pub audit_trail: Vec<Audit>,
    pub original_error: Option<String>,
    pub deprecation_warnings: Vec<String>,
}

impl ApiCallDetails {
    pub fn new(method: HttpMethod, uri: Url) -> Self {
        Self {
            method,
            uri,
            status: None,
            success: false,
            request_body: None,
            response_body: None,
            audit_trail: Vec::new(),
            original_error: None,
            deprecation_warnings: Vec::new(),
        }
    }

    /// Path and query of the called uri, e.g. `/project/_search?routing=1`
    pub fn path_and_query(&self) -> String {
        match self.uri.query() {
            Some(q) => format!("{}?{}", self.uri.path(), q),
            None => self.uri.path().to_string(),
        }
    }

    pub fn request_body_str(&self) -> Option<&str> {
        self.request_body
            .as_deref()
            .and_then(|b| std::str::from_utf8(b).ok())
    }

    pub fn response_body_str(&self) -> Option<&str> {
        self.response_body
            .as_deref()
            .and_then(|b| std::str::from_utf8(b).ok())
    }

    /// Human readable summary of the call and its audit trail
    pub fn debug_information(&self) -> String {
        let mut out = String::new();
        let outcome = if self.success { "Valid" } else { "Invalid" };
        let status = self
            .status
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            out,
            "{} low level call on {}: {} (status {})",
            outcome, self.method, self.uri, status
        );

        if let Some(err) = &self.original_error {
            let _ = writeln!(out, "# OriginalError: {}", err);
        }

        if !self.audit_trail.is_empty() {
            let _ = writeln!(out, "# Audit trail of this API call:");
            for (i, audit) in self.audit_trail.iter().enumerate() {
                let _ = writeln!(out, " - [{}] {}", i + 1, audit);
            }
        }

        if let Some(body) = self.request_body_str() {
            let _ = writeln!(out, "# Request:\n{}", body);
        }
        if let Some(body) = self.response_body_str() {
            let _ = writeln!(out, "# Response:\n{}", body);
        }
        out
    }
}

/// Detailed error cause as reported by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorCause {
    #[serde(rename = "type", default)]
    pub error_type: String,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub root_cause: Vec<ErrorCause>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caused_by: Option<Box<ErrorCause>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,
    #[serde(flatten)]
    pub metadata: HashMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorBody {
    Cause(ErrorCause),
    Reason(String),
}

/// Error document returned with non-success status codes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerError {
    pub error: ErrorBody,
    #[serde(default)]
    pub status: Option<u16>,
}

impl ServerError {
    /// Read an error document, `None` when the body is not one
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        serde_json::from_slice(bytes).ok()
    }

    pub fn error_type(&self) -> Option<&str> {
        match &self.error {
            ErrorBody::Cause(cause) => Some(cause.error_type.as_str()),
            ErrorBody::Reason(_) => None,
        }
    }

    pub fn reason(&self) -> String {
        match &self.error {
            ErrorBody::Cause(cause) => match &cause.reason {
                Some(reason) => format!("{}: {}", cause.error_type, reason),
                None => cause.error_type.clone(),
            },
            ErrorBody::Reason(reason) => reason.clone(),
        }
    }
}

/// Typed response plus call details
#[derive(Debug, Clone)]
pub struct ElasticResponse<R> {
    body: Option<R>,
    api_call: ApiCallDetails,
    server_error: Option<ServerError>,
}

impl<R> ElasticResponse<R> {
    pub fn new(body: Option<R>, api_call: ApiCallDetails, server_error: Option<ServerError>) -> Self {
        Self {
            body,
            api_call,
            server_error,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.api_call.success && self.server_error.is_none()
    }

    pub fn body(&self) -> Option<&R> {
        self.body.as_ref()
    }

    pub fn into_body(self) -> Option<R> {
        self.body
    }

    pub fn api_call(&self) -> &ApiCallDetails {
        &self.api_call
    }

    pub fn server_error(&self) -> Option<&ServerError> {
        self.server_error.as_ref()
    }

    pub fn status(&self) -> Option<u16> {
        self.api_call.status
    }

    pub fn debug_information(&self) -> String {
        let mut info = self.api_call.debug_information();
        if let Some(err) = &self.server_error {
            let _ = writeln!(info, "# ServerError: {}", err.reason());
        }
        info
    }

    /// The body of a valid response, an error otherwise
    pub fn into_result(self) -> Result<R> {
        if !self.is_valid() {
            return Err(self.into_error());
        }
        let status = self.api_call.status.unwrap_or_default();
        self.body.ok_or_else(|| ElasticError::Server {
            status,
            reason: "response body could not be read".to_string(),
            error: None,
        })
    }

    pub(crate) fn into_error(self) -> ElasticError {
        let status = self.api_call.status.unwrap_or_default();
        let reason = self
            .server_error
            .as_ref()
            .map(ServerError::reason)
            .or_else(|| self.api_call.original_error.clone())
            .unwrap_or_else(|| format!("unsuccessful call to {}", self.api_call.uri));
        ElasticError::Server {
            status,
            reason,
            error: self.server_error.map(Box::new),
        }
    }
}
