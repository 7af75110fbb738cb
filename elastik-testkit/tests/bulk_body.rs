//! Bulk bodies sent through the low level client reach the wire untouched

use elastik::transport::AuditEvent;
use elastik::PostData;
use elastik_testkit::{Rule, Times, VirtualCluster};
use serde_json::json;

fn header() -> serde_json::Value {
    json!({"index": {"_index": "myIndex", "_type": "myDocumentType"}})
}

#[tokio::test]
async fn test_bulk_header_object_is_written_as_given() {
    let cluster = VirtualCluster::nodes(1)
        .client_calls(Rule::succeeds(Times::Always).return_json(json!({"took": 1, "errors": false, "items": []})))
        .single_node_pool()
        .settings(|s| s.disable_direct_streaming());

    let payload = PostData::MultiJson(vec![header(), json!({"id": "1", "message": "hello"})]);
    let expected = payload.write(cluster.client().settings()).unwrap();

    let response = cluster.low_level().bulk(payload).await.unwrap();

    assert!(response.is_valid());
    assert_eq!(response.api_call().path_and_query(), "/_bulk");
    assert_eq!(response.api_call().request_body.as_deref(), Some(expected.as_slice()));
    assert_eq!(
        response.api_call().request_body_str(),
        Some(concat!(
            "{\"index\":{\"_index\":\"myIndex\",\"_type\":\"myDocumentType\"}}\n",
            "{\"id\":\"1\",\"message\":\"hello\"}\n",
        ))
    );
    assert_eq!(
        response.api_call().audit_trail.iter().map(|a| a.event).collect::<Vec<_>>(),
        vec![AuditEvent::HealthyResponse]
    );
    assert_eq!(response.body(), Some(&json!({"took": 1, "errors": false, "items": []})));
}

#[tokio::test]
async fn test_pre_serialized_bulk_lines_pass_through() {
    let cluster = VirtualCluster::nodes(1)
        .single_node_pool()
        .settings(|s| s.disable_direct_streaming());

    let raw = format!("{}\n{}\n", header(), r#"{"message":"raw"}"#);
    let payload = PostData::String(raw.clone());
    let expected = payload.write(cluster.client().settings()).unwrap();

    let response = cluster.low_level().bulk(payload).await.unwrap();
    assert_eq!(response.api_call().request_body.as_deref(), Some(expected.as_slice()));
    assert_eq!(response.api_call().request_body_str(), Some(raw.as_str()));
    assert_eq!(cluster.connection().called(9200), 1);
}
