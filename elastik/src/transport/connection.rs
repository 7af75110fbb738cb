use super::{RawResponse, RequestData};
use crate::error::Result;
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionErrorKind {
    Timeout,
    Connect,
    Other,
}

impl ConnectionErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionErrorKind::Timeout => "timeout",
            ConnectionErrorKind::Connect => "connect",
            ConnectionErrorKind::Other => "other",
        }
    }
}

impl fmt::Display for ConnectionErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request that never produced an HTTP response
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} error: {message}")]
pub struct ConnectionError {
    pub kind: ConnectionErrorKind,
    pub message: String,
}

impl ConnectionError {
    pub fn new(kind: ConnectionErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ConnectionErrorKind::Timeout, message)
    }

    pub fn connect(message: impl Into<String>) -> Self {
        Self::new(ConnectionErrorKind::Connect, message)
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::new(ConnectionErrorKind::Other, message)
    }
}

impl From<reqwest::Error> for ConnectionError {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            ConnectionErrorKind::Timeout
        } else if err.is_connect() {
            ConnectionErrorKind::Connect
        } else {
            ConnectionErrorKind::Other
        };
        Self::new(kind, err.to_string())
    }
}

/// Sends one request to one node
#[async_trait]
pub trait Connection: Send + Sync {
    async fn request(&self, request: &RequestData) -> std::result::Result<RawResponse, ConnectionError>;
}

/// Connection over HTTP
#[derive(Debug, Clone)]
pub struct HttpConnection {
    client: reqwest::Client,
}

impl HttpConnection {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Connection for HttpConnection {
    async fn request(&self, request: &RequestData) -> std::result::Result<RawResponse, ConnectionError> {
        let mut builder = self
            .client
            .request(request.method.into(), request.uri.clone())
            .timeout(request.request_timeout);

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some((username, password)) = &request.basic_auth {
            builder = builder.basic_auth(username, Some(password));
        } else if let Some(api_key) = &request.api_key {
            builder = builder.header(reqwest::header::AUTHORIZATION, format!("ApiKey {}", api_key));
        }
        if let Some(body) = &request.body {
            builder = builder
                .header(reqwest::header::CONTENT_TYPE, request.content_type)
                .body(body.clone());
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.bytes().await?.to_vec();

        Ok(RawResponse {
            status,
            body,
            headers,
        })
    }
}

/// Connection answering every request with the same status and bytes
#[derive(Debug, Clone)]
pub struct InMemoryConnection {
    status: u16,
    body: Vec<u8>,
}

impl InMemoryConnection {
    pub fn new() -> Self {
        Self::with_response(200, Vec::new())
    }

    pub fn with_response(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

impl Default for InMemoryConnection {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Connection for InMemoryConnection {
    async fn request(&self, _request: &RequestData) -> std::result::Result<RawResponse, ConnectionError> {
        Ok(RawResponse {
            status: self.status,
            body: self.body.clone(),
            headers: Vec::new(),
        })
    }
}
