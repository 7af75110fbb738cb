//! Requests
//!
//! Every endpoint comes in two shapes that serialize identically: an
//! initializer (`*Request`, plain struct with public fields) and a fluent
//! descriptor (`*Descriptor`, method chaining) that converts into it.
//!
//! ```ignore
//! let fluent: GetIndexTemplateRequest = GetIndexTemplateDescriptor::new().name("nestx").into();
//! let initializer = GetIndexTemplateRequest::named("nestx");
//! assert_eq!(fluent, initializer);
//! ```

mod bulk;
mod cluster;
mod document;
mod search;
mod template;
mod term_vectors;

pub use bulk::{BulkAction, BulkDescriptor, BulkOperation, BulkRequest};
pub use cluster::{
    ClusterHealthDescriptor, ClusterHealthRequest, NodesInfoRequest, PingRequest,
    RootNodeInfoRequest,
};
pub use document::{
    DeleteDocumentDescriptor, DeleteDocumentRequest, GetDocumentDescriptor, GetDocumentRequest,
    IndexDocumentDescriptor, IndexDocumentRequest,
};
pub use search::{ExplainDescriptor, ExplainRequest, SearchDescriptor, SearchRequest, SortOrder};
pub use template::{
    DeleteIndexTemplateRequest, GetIndexTemplateDescriptor, GetIndexTemplateRequest,
    PutIndexTemplateDescriptor, PutIndexTemplateRequest,
};
pub use term_vectors::{MultiTermVectorsDescriptor, MultiTermVectorsRequest, TermVectorsDoc};

use crate::error::Result;
use crate::http::{HttpMethod, RequestParameters};
use crate::infer::Inferrer;
use crate::post_data::PostData;
use serde::de::DeserializeOwned;
use url::Url;

/// A typed call against one endpoint
pub trait Request {
    type Response: DeserializeOwned;

    fn method(&self) -> HttpMethod;

    /// Percent-encoded path, always starting with `/`
    fn path(&self, inferrer: &Inferrer) -> Result<String>;

    /// Query string parameters
    fn params(&self) -> &RequestParameters;

    fn body(&self, _inferrer: &Inferrer) -> Result<PostData> {
        Ok(PostData::Empty)
    }
}

/// Join already resolved segments into a path, escaping each one
pub(crate) fn build_path<S: AsRef<str>>(segments: &[S]) -> Result<String> {
    let mut url = Url::parse("http://localhost/")?;
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|_| crate::error::ElasticError::InvalidRequest("cannot build path".to_string()))?;
        path.clear();
        for segment in segments {
            path.push(segment.as_ref());
        }
    }
    Ok(url.path().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_path_escapes_segments() {
        assert_eq!(build_path::<&str>(&[]).unwrap(), "/");
        assert_eq!(build_path(&["_template", "nestx"]).unwrap(), "/_template/nestx");
        assert_eq!(
            build_path(&["project", "doc", "a b/c?"]).unwrap(),
            "/project/doc/a%20b%2Fc%3F"
        );
        assert_eq!(
            build_path(&["cluster_one:project,devs", "_search"]).unwrap(),
            "/cluster_one:project,devs/_search"
        );
    }
}
