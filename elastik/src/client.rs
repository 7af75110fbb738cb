//! Client surface
//!
//! [`ElasticClient`] resolves typed requests through the [`Inferrer`] and
//! hands them to the [`Transport`]. [`LowLevelClient`] skips the typed layer
//! and sends raw paths and bodies.

use crate::error::Result;
use crate::http::{HttpMethod, RequestParameters};
use crate::infer::{Document, Inferrer};
use crate::post_data::PostData;
use crate::request::{
    BulkRequest, ClusterHealthRequest, DeleteDocumentRequest, DeleteIndexTemplateRequest,
    ExplainRequest, GetDocumentRequest, GetIndexTemplateRequest, IndexDocumentRequest,
    MultiTermVectorsRequest, NodesInfoRequest, PingRequest, PutIndexTemplateRequest, Request,
    RootNodeInfoRequest, SearchRequest,
};
use crate::response::{
    AcknowledgedResponse, BulkResponse, ClusterHealthResponse, DeleteResponse, ElasticResponse,
    ExplainResponse, GetIndexTemplateResponse, GetResponse, IndexResponse,
    MultiTermVectorsResponse, NodesInfoResponse, RootNodeInfoResponse, SearchResponse,
};
use crate::settings::ConnectionSettings;
use crate::transport::{Clock, Connection, Transport};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Typed client over every supported endpoint
#[derive(Debug, Clone)]
pub struct ElasticClient {
    transport: Transport,
    inferrer: Inferrer,
}

impl ElasticClient {
    /// Client over HTTP
    pub fn new(settings: ConnectionSettings) -> Result<Self> {
        let transport = Transport::new(Arc::new(settings))?;
        Ok(Self::from_transport(transport))
    }

    /// Client over a custom connection and clock, e.g. an in-memory one
    pub fn with_connection(
        settings: ConnectionSettings,
        connection: Arc<dyn Connection>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::from_transport(Transport::with_connection(Arc::new(settings), connection, clock))
    }

    pub fn from_transport(transport: Transport) -> Self {
        let inferrer = Inferrer::new(Arc::clone(transport.settings()));
        Self { transport, inferrer }
    }

    pub fn settings(&self) -> &ConnectionSettings {
        self.transport.settings()
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn inferrer(&self) -> &Inferrer {
        &self.inferrer
    }

    /// Raw access sharing this client's transport
    pub fn low_level(&self) -> LowLevelClient {
        LowLevelClient::from_transport(self.transport.clone())
    }

    /// Resolve and send any request
    #[instrument(skip(self, request), fields(method = %request.method()))]
    pub async fn send<R: Request>(&self, request: &R) -> Result<ElasticResponse<R::Response>> {
        let path = request.path(&self.inferrer)?;
        let body = request.body(&self.inferrer)?;
        debug!(path = %path, "Dispatching typed request");
        self.transport
            .request(request.method(), &path, request.params(), &body)
            .await
    }

    pub async fn root_node_info(&self) -> Result<ElasticResponse<RootNodeInfoResponse>> {
        self.send(&RootNodeInfoRequest::new()).await
    }

    /// `HEAD /`; valid when the cluster answered 2xx
    pub async fn ping(&self) -> Result<ElasticResponse<()>> {
        self.send(&PingRequest::new()).await
    }

    pub async fn nodes_info(&self) -> Result<ElasticResponse<NodesInfoResponse>> {
        self.send(&NodesInfoRequest::new()).await
    }

    pub async fn cluster_health(
        &self,
        request: impl Into<ClusterHealthRequest>,
    ) -> Result<ElasticResponse<ClusterHealthResponse>> {
        self.send(&request.into()).await
    }

    pub async fn get_index_template(
        &self,
        request: impl Into<GetIndexTemplateRequest>,
    ) -> Result<ElasticResponse<GetIndexTemplateResponse>> {
        self.send(&request.into()).await
    }

    pub async fn put_index_template(
        &self,
        request: impl Into<PutIndexTemplateRequest>,
    ) -> Result<ElasticResponse<AcknowledgedResponse>> {
        self.send(&request.into()).await
    }

    pub async fn delete_index_template(
        &self,
        request: impl Into<DeleteIndexTemplateRequest>,
    ) -> Result<ElasticResponse<AcknowledgedResponse>> {
        self.send(&request.into()).await
    }

    pub async fn index_document<T: Document + Serialize>(
        &self,
        request: impl Into<IndexDocumentRequest<T>>,
    ) -> Result<ElasticResponse<IndexResponse>> {
        self.send(&request.into()).await
    }

    /// Index a document with index, type and id inferred from it
    pub async fn index<T: Document + Serialize>(&self, document: T) -> Result<ElasticResponse<IndexResponse>> {
        self.index_document(IndexDocumentRequest::new(document)).await
    }

    pub async fn get_document<T: DeserializeOwned>(
        &self,
        request: impl Into<GetDocumentRequest<T>>,
    ) -> Result<ElasticResponse<GetResponse<T>>> {
        self.send(&request.into()).await
    }

    pub async fn delete_document(
        &self,
        request: impl Into<DeleteDocumentRequest>,
    ) -> Result<ElasticResponse<DeleteResponse>> {
        self.send(&request.into()).await
    }

    pub async fn explain(
        &self,
        request: impl Into<ExplainRequest>,
    ) -> Result<ElasticResponse<ExplainResponse>> {
        self.send(&request.into()).await
    }

    pub async fn multi_term_vectors(
        &self,
        request: impl Into<MultiTermVectorsRequest>,
    ) -> Result<ElasticResponse<MultiTermVectorsResponse>> {
        self.send(&request.into()).await
    }

    pub async fn search<T: DeserializeOwned>(
        &self,
        request: impl Into<SearchRequest<T>>,
    ) -> Result<ElasticResponse<SearchResponse<T>>> {
        self.send(&request.into()).await
    }

    pub async fn bulk(&self, request: impl Into<BulkRequest>) -> Result<ElasticResponse<BulkResponse>> {
        self.send(&request.into()).await
    }
}

/// Untyped client: paths and bodies go out as given
#[derive(Debug, Clone)]
pub struct LowLevelClient {
    transport: Transport,
}

impl LowLevelClient {
    pub fn new(settings: ConnectionSettings) -> Result<Self> {
        Ok(Self::from_transport(Transport::new(Arc::new(settings))?))
    }

    pub fn from_transport(transport: Transport) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Send a raw request; `path` may carry its own query string
    #[instrument(skip(self, body), fields(method = %method))]
    pub async fn send(&self, method: HttpMethod, path: &str, body: PostData) -> Result<ElasticResponse<Value>> {
        let (path, params) = split_query(path);
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{}", path)
        };
        self.transport.request(method, &path, &params, &body).await
    }

    /// `POST /_bulk` with a newline delimited body
    pub async fn bulk(&self, body: PostData) -> Result<ElasticResponse<Value>> {
        self.send(HttpMethod::Post, "/_bulk", body).await
    }
}

fn split_query(path: &str) -> (&str, RequestParameters) {
    let mut params = RequestParameters::new();
    let Some((path, query)) = path.split_once('?') else {
        return (path, params);
    };
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        params.set(key.into_owned(), value);
    }
    (path, params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::SearchDescriptor;
    use crate::transport::{InMemoryConnection, SystemClock};

    fn client(status: u16, body: &str) -> ElasticClient {
        ElasticClient::with_connection(
            ConnectionSettings::default().disable_direct_streaming(),
            Arc::new(InMemoryConnection::with_response(status, body)),
            Arc::new(SystemClock),
        )
    }

    #[test]
    fn test_split_query() {
        let (path, params) = split_query("/project/_search?routing=r1&pretty");
        assert_eq!(path, "/project/_search");
        assert_eq!(params.get("routing"), Some("r1"));
        assert_eq!(params.get("pretty"), Some(""));

        let (path, params) = split_query("/_bulk");
        assert_eq!(path, "/_bulk");
        assert!(params.is_empty());
    }

    #[tokio::test]
    async fn test_search_sends_resolved_path_and_body() {
        let body = r#"{"took": 1, "timed_out": false,
            "_shards": {"total": 1, "successful": 1, "failed": 0},
            "hits": {"total": 0, "hits": []}}"#;
        let response = client(200, body)
            .search::<Value>(SearchDescriptor::new().index("project").query(|q| q.match_all(|m| m)))
            .await
            .unwrap();

        assert!(response.is_valid());
        assert_eq!(response.api_call().method, HttpMethod::Post);
        assert_eq!(response.api_call().uri.path(), "/project/_search");
        assert_eq!(
            response.api_call().request_body_str(),
            Some(r#"{"query":{"match_all":{}}}"#)
        );
        assert_eq!(response.body().map(SearchResponse::total), Some(0));
    }

    #[tokio::test]
    async fn test_low_level_keeps_query_string() {
        let response = client(200, r#"{"acknowledged": true}"#)
            .low_level()
            .send(HttpMethod::Put, "_template/nestx?create=true", PostData::Json(serde_json::json!({})))
            .await
            .unwrap();
        assert_eq!(response.api_call().path_and_query(), "/_template/nestx?create=true");
        assert_eq!(response.body(), Some(&serde_json::json!({"acknowledged": true})));
    }

    #[tokio::test]
    async fn test_inference_errors_surface_before_sending() {
        let err = client(200, "{}")
            .get_document::<Value>(GetDocumentRequest::new("project", "doc", ""))
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), "inference");
    }
}
