//! End to end request building through the typed client
//!
//! Every call goes through the real transport over an in-memory connection,
//! so the asserted urls and bodies are exactly what would hit the wire.

use elastik::query::Query;
use elastik::request::{
    BulkDescriptor, BulkOperation, ClusterHealthDescriptor, DeleteDocumentRequest,
    ExplainDescriptor, GetDocumentDescriptor, GetIndexTemplateRequest, MultiTermVectorsDescriptor,
    PutIndexTemplateDescriptor, SearchDescriptor, TermVectorsDoc,
};
use elastik::transport::{InMemoryConnection, SystemClock};
use elastik::{ConnectionSettings, Document, ElasticClient, HttpMethod, Id, PostData};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Project {
    name: String,
    #[serde(rename = "numberOfCommits")]
    number_of_commits: u32,
}

impl Document for Project {
    const TYPE_NAME: &'static str = "Project";

    fn id(&self) -> Option<Id> {
        Some(Id::from(&self.name))
    }
}

fn client(body: &str) -> ElasticClient {
    let settings = ConnectionSettings::default()
        .default_index("default-index")
        .default_mapping_for::<Project>(|m| m.index_name("project"))
        .disable_direct_streaming();
    ElasticClient::with_connection(
        settings,
        Arc::new(InMemoryConnection::with_response(200, body)),
        Arc::new(SystemClock),
    )
}

fn nest() -> Project {
    Project {
        name: "NEST".to_string(),
        number_of_commits: 42,
    }
}

#[tokio::test]
async fn test_explain_url() {
    let body = r#"{"_index": "project", "_type": "project", "_id": "NEST", "matched": true}"#;
    let response = client(body)
        .explain(ExplainDescriptor::for_document(&nest()).query(|q| q.match_all(|m| m)))
        .await
        .unwrap();

    assert_eq!(response.api_call().method, HttpMethod::Post);
    assert_eq!(response.api_call().path_and_query(), "/project/project/NEST/_explain");
    assert!(response.body().map_or(false, |b| b.matched));
}

#[tokio::test]
async fn test_multi_term_vectors_urls() {
    let c = client(r#"{"docs": []}"#);

    let none = c.multi_term_vectors(MultiTermVectorsDescriptor::new()).await.unwrap();
    assert_eq!(none.api_call().path_and_query(), "/_mtermvectors");

    let index = c
        .multi_term_vectors(MultiTermVectorsDescriptor::new().index("project"))
        .await
        .unwrap();
    assert_eq!(index.api_call().path_and_query(), "/project/_mtermvectors");

    let typed = c
        .multi_term_vectors(
            MultiTermVectorsDescriptor::new()
                .index("project")
                .doc_type("project")
                .doc(TermVectorsDoc::new("NEST").fields(["name"])),
        )
        .await
        .unwrap();
    assert_eq!(typed.api_call().path_and_query(), "/project/project/_mtermvectors");
    assert_eq!(
        typed.api_call().request_body_str(),
        Some(r#"{"docs":[{"_id":"NEST","fields":["name"]}]}"#)
    );
}

#[tokio::test]
async fn test_get_index_template() {
    let body = r#"{"nestx": {
        "order": 0,
        "version": 1,
        "index_patterns": ["nestx-*"],
        "settings": {"index": {"number_of_shards": "2"}},
        "mappings": {},
        "aliases": {}
    }}"#;
    let response = client(body)
        .get_index_template(GetIndexTemplateRequest::named("nestx"))
        .await
        .unwrap();

    assert_eq!(response.api_call().method, HttpMethod::Get);
    assert_eq!(response.api_call().path_and_query(), "/_template/nestx");
    let template = response.body().and_then(|b| b.get("nestx")).unwrap();
    assert_eq!(template.patterns(), vec!["nestx-*"]);
    assert_eq!(template.version, Some(1));
    assert_eq!(template.number_of_shards(), Some(2));
}

#[tokio::test]
async fn test_put_index_template_body() {
    let response = client(r#"{"acknowledged": true}"#)
        .put_index_template(
            PutIndexTemplateDescriptor::new("nestx")
                .index_patterns(["nestx-*"])
                .setting("index.number_of_shards", 2)
                .create(true),
        )
        .await
        .unwrap();

    assert_eq!(response.api_call().method, HttpMethod::Put);
    assert_eq!(response.api_call().path_and_query(), "/_template/nestx?create=true");
    assert_eq!(
        response.api_call().request_body_str(),
        Some(r#"{"index_patterns":["nestx-*"],"settings":{"index.number_of_shards":2}}"#)
    );
    assert!(response.body().map_or(false, |b| b.acknowledged));
}

#[tokio::test]
async fn test_document_round_trip_urls() {
    let indexed = client(r#"{"_index": "project", "_id": "NEST", "result": "created"}"#)
        .index(nest())
        .await
        .unwrap();
    assert_eq!(indexed.api_call().method, HttpMethod::Put);
    assert_eq!(indexed.api_call().path_and_query(), "/project/project/NEST");
    assert_eq!(
        indexed.api_call().request_body_str(),
        Some(r#"{"name":"NEST","numberOfCommits":42}"#)
    );

    let body = r#"{"_index": "project", "_type": "project", "_id": "NEST", "found": true,
        "_source": {"name": "NEST", "numberOfCommits": 42}}"#;
    let fetched = client(body)
        .get_document::<Project>(GetDocumentDescriptor::new("NEST").realtime(false))
        .await
        .unwrap();
    assert_eq!(fetched.api_call().path_and_query(), "/project/project/NEST?realtime=false");
    assert_eq!(fetched.into_body().and_then(|b| b.source), Some(nest()));

    let deleted = client(r#"{"_index": "project", "_id": "NEST", "result": "deleted"}"#)
        .delete_document(DeleteDocumentRequest::for_document(&nest()))
        .await
        .unwrap();
    assert_eq!(deleted.api_call().method, HttpMethod::Delete);
    assert_eq!(deleted.api_call().path_and_query(), "/project/project/NEST");
}

#[tokio::test]
async fn test_search_with_conditionless_query_sends_no_query() {
    let body = r#"{"took": 1, "timed_out": false,
        "_shards": {"total": 1, "successful": 1, "failed": 0},
        "hits": {"total": {"value": 1, "relation": "eq"}, "hits": [
            {"_index": "project", "_id": "NEST", "_source": {"name": "NEST", "numberOfCommits": 42}}
        ]}}"#;
    let response = client(body)
        .search::<Project>(
            SearchDescriptor::<Project>::of()
                .query(|q| q.term("name", Value::Null) & q_match_all())
                .size(5),
        )
        .await
        .unwrap();

    assert_eq!(response.api_call().path_and_query(), "/project/project/_search");
    assert_eq!(
        response.api_call().request_body_str(),
        Some(r#"{"query":{"match_all":{}},"size":5}"#)
    );
    let documents: Vec<&Project> = response.body().unwrap().documents().collect();
    assert_eq!(documents, vec![&nest()]);
}

fn q_match_all() -> Query {
    Query::build(|q| q.match_all(|m| m))
}

#[tokio::test]
async fn test_bulk_body_is_recorded() {
    let body = r#"{"took": 3, "errors": false, "items": []}"#;
    let response = client(body)
        .bulk(
            BulkDescriptor::new()
                .index_many(&[nest()])
                .unwrap()
                .operation(BulkOperation::delete("old").in_index("project"))
                .refresh("wait_for"),
        )
        .await
        .unwrap();

    assert_eq!(response.api_call().path_and_query(), "/_bulk?refresh=wait_for");
    assert_eq!(
        response.api_call().request_body_str(),
        Some(concat!(
            "{\"index\":{\"_index\":\"project\",\"_type\":\"project\",\"_id\":\"NEST\"}}\n",
            "{\"name\":\"NEST\",\"numberOfCommits\":42}\n",
            "{\"delete\":{\"_index\":\"project\",\"_id\":\"old\"}}\n",
        ))
    );
}

#[tokio::test]
async fn test_low_level_bulk_matches_post_data() {
    let payload = PostData::MultiJson(vec![
        json!({"index": {"_index": "myIndex", "_type": "myDocumentType"}}),
        json!({"message": "hello"}),
    ]);
    let c = client(r#"{"took": 1, "errors": false, "items": []}"#);
    let expected = payload.write(c.settings()).unwrap();

    let response = c.low_level().bulk(payload).await.unwrap();
    assert_eq!(response.api_call().request_body.as_deref(), Some(expected.as_slice()));
}

#[tokio::test]
async fn test_cluster_health_fluent_and_initializer_agree() {
    let body = r#"{"cluster_name": "elasticsearch", "status": "green", "timed_out": false,
        "number_of_nodes": 1, "number_of_data_nodes": 1, "active_primary_shards": 0,
        "active_shards": 0, "relocating_shards": 0, "initializing_shards": 0, "unassigned_shards": 0}"#;
    let c = client(body);

    let fluent = c
        .cluster_health(ClusterHealthDescriptor::new().index("project").level("indices"))
        .await
        .unwrap();
    let mut initializer = elastik::request::ClusterHealthRequest::for_indices("project");
    initializer.params.set("level", "indices");
    let initializer = c.cluster_health(initializer).await.unwrap();

    assert_eq!(fluent.api_call().path_and_query(), "/_cluster/health/project?level=indices");
    assert_eq!(
        fluent.api_call().path_and_query(),
        initializer.api_call().path_and_query()
    );
}
