//! Asserting the method and path a call goes out with
//!
//! ```text
//! UrlTester::post("/project/project/NEST/_explain")
//!     .fluent(|c| async move { c.explain(ExplainDescriptor::..).await }).await
//!     .initializer(|c| async move { c.explain(ExplainRequest::..).await }).await;
//! ```

use crate::fixtures;
use elastik::{ApiCallDetails, ElasticClient, ElasticError, ElasticResponse, HttpMethod};
use std::future::Future;

#[derive(Debug, Clone)]
pub struct UrlTester {
    method: HttpMethod,
    path_and_query: String,
    client: ElasticClient,
}

impl UrlTester {
    pub fn new(method: HttpMethod, path_and_query: impl Into<String>) -> Self {
        Self {
            method,
            path_and_query: path_and_query.into(),
            client: fixtures::in_memory_client(200, "{}"),
        }
    }

    pub fn get(path_and_query: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path_and_query)
    }

    pub fn post(path_and_query: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path_and_query)
    }

    pub fn put(path_and_query: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, path_and_query)
    }

    pub fn delete(path_and_query: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path_and_query)
    }

    pub fn head(path_and_query: impl Into<String>) -> Self {
        Self::new(HttpMethod::Head, path_and_query)
    }

    /// Answer calls with this body instead of `{}`
    pub fn responding(mut self, status: u16, body: impl Into<Vec<u8>>) -> Self {
        self.client = fixtures::in_memory_client(status, body);
        self
    }

    pub async fn fluent<R, F, Fut>(self, call: F) -> Self
    where
        F: FnOnce(ElasticClient) -> Fut,
        Fut: Future<Output = elastik::Result<ElasticResponse<R>>>,
    {
        self.check("fluent", call).await
    }

    pub async fn initializer<R, F, Fut>(self, call: F) -> Self
    where
        F: FnOnce(ElasticClient) -> Fut,
        Fut: Future<Output = elastik::Result<ElasticResponse<R>>>,
    {
        self.check("initializer", call).await
    }

    async fn check<R, F, Fut>(self, form: &str, call: F) -> Self
    where
        F: FnOnce(ElasticClient) -> Fut,
        Fut: Future<Output = elastik::Result<ElasticResponse<R>>>,
    {
        let api_call = call_details(call(self.client.clone()).await, form);
        assert_eq!(
            api_call.method, self.method,
            "{} call used the wrong method for {}",
            form, self.path_and_query
        );
        assert_eq!(
            api_call.path_and_query(),
            self.path_and_query,
            "{} call went to the wrong url",
            form
        );
        self
    }
}

fn call_details<R>(result: elastik::Result<ElasticResponse<R>>, form: &str) -> ApiCallDetails {
    match result {
        Ok(response) => response.api_call().clone(),
        Err(ElasticError::Pipeline(e)) => e.api_call,
        Err(e) => panic!("{} call failed before reaching the wire: {}", form, e),
    }
}
