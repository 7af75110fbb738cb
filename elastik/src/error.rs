//! Error types for the client

use crate::response::ServerError;
use crate::transport::PipelineError;
use thiserror::Error;

/// Errors surfaced by request building, transport and deserialization
#[derive(Error, Debug)]
pub enum ElasticError {
    #[error("Inference error: {0}")]
    Inference(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    /// The request pipeline gave up; carries the call details and audit trail
    #[error("{0}")]
    Pipeline(Box<PipelineError>),

    #[error("Server returned {status}: {reason}")]
    Server {
        status: u16,
        reason: String,
        error: Option<Box<ServerError>>,
    },

    #[error("Config error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ElasticError {
    /// Error category used as a metrics label
    pub fn error_type(&self) -> &'static str {
        match self {
            ElasticError::Inference(_) => "inference",
            ElasticError::InvalidRequest(_) => "invalid_request",
            ElasticError::Connection(_) => "connection",
            ElasticError::Timeout(_) => "timeout",
            ElasticError::Pipeline(e) => e.failure.as_str(),
            ElasticError::Server { .. } => "server",
            ElasticError::Config(_) => "config",
            ElasticError::Json(_) => "json",
            ElasticError::InvalidUrl(_) => "invalid_url",
            ElasticError::Http(_) => "http",
            ElasticError::Toml(_) => "toml",
            ElasticError::Io(_) => "io",
        }
    }
}

impl From<PipelineError> for ElasticError {
    fn from(err: PipelineError) -> Self {
        ElasticError::Pipeline(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, ElasticError>;
