//! Typed client for the Elasticsearch REST API
//!
//! Requests are plain structs (or fluent descriptors converting into them)
//! whose index, type and id are inferred from Rust document types. They run
//! through a [`transport::Transport`] that pools nodes, pings, sniffs and
//! retries, and come back as [`ElasticResponse`]s carrying the typed body
//! plus an audit trail of what happened on the wire.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod infer;
pub mod post_data;
pub mod query;
pub mod request;
pub mod response;
pub mod settings;
pub mod transport;

pub use client::{ElasticClient, LowLevelClient};
pub use config::ClientConfig;
pub use error::{ElasticError, Result};
pub use http::{HttpMethod, RequestParameters};
pub use infer::{Document, Id, IndexName, Indices, Inferrer, TypeName, Types};
pub use post_data::PostData;
pub use query::Query;
pub use request::Request;
pub use response::{ApiCallDetails, ElasticResponse, ServerError};
pub use settings::{ConnectionSettings, PoolKind};
