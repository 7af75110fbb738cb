//! Query dsl output for the fixture domain

use elastik::query::{DisMaxQuery, MatchAllQuery, ParentIdQuery, Query};
use elastik::request::SearchDescriptor;
use elastik::{Id, Inferrer, TypeName};
use elastik_testkit::fixtures::{connection_settings, in_memory_client};
use elastik_testkit::{Developer, Project};
use serde_json::{json, Value};
use std::sync::Arc;

fn inferrer() -> Inferrer {
    Inferrer::new(Arc::new(connection_settings()))
}

fn render(query: &Query) -> Option<Value> {
    query.to_value(&inferrer()).unwrap()
}

fn named_match_all(name: &str) -> Query {
    MatchAllQuery::new().name(name).into()
}

#[test]
fn test_dis_max() {
    let expected = json!({
        "dis_max": {
            "_name": "named_query",
            "boost": 1.1,
            "queries": [
                {"match_all": {"_name": "query1"}},
                {"match_all": {"_name": "query2"}}
            ],
            "tie_breaker": 1.11
        }
    });

    let fluent = Query::build(|q| {
        q.dis_max(|d| {
            d.name("named_query")
                .boost(1.1)
                .queries([named_match_all("query1"), named_match_all("query2")])
                .tie_breaker(1.11)
        })
    });
    let initializer: Query = DisMaxQuery {
        name: Some("named_query".to_string()),
        boost: Some(1.1),
        queries: vec![named_match_all("query1"), named_match_all("query2")],
        tie_breaker: Some(1.11),
    }
    .into();

    assert_eq!(render(&fluent), Some(expected.clone()));
    assert_eq!(render(&initializer), Some(expected));
    assert_eq!(
        render(&fluent).unwrap().to_string(),
        concat!(
            r#"{"dis_max":{"_name":"named_query","boost":1.1,"#,
            r#""queries":[{"match_all":{"_name":"query1"}},{"match_all":{"_name":"query2"}}],"#,
            r#""tie_breaker":1.11}}"#
        )
    );
}

#[test]
fn test_dis_max_of_conditionless_queries_is_conditionless() {
    let query = Query::build(|q| q.dis_max(|d| d.query(Query::build(|q| q.term("name", Value::Null)))));
    assert!(query.is_conditionless());
    assert_eq!(render(&query), None);
}

#[test]
fn test_parent_id() {
    let expected = json!({
        "parent_id": {
            "_name": "named_query",
            "type": "developer",
            "id": Project::instance().name
        }
    });

    let fluent = Query::build(|q| {
        q.parent_id(|p| p.name("named_query").type_of::<Developer>().id(Project::instance().name))
    });
    let initializer: Query = ParentIdQuery {
        name: Some("named_query".to_string()),
        doc_type: Some(TypeName::of::<Developer>()),
        id: Some(Id::from(Project::instance().name)),
        ..Default::default()
    }
    .into();

    assert_eq!(render(&fluent), Some(expected.clone()));
    assert_eq!(render(&initializer), Some(expected));
    assert_eq!(
        render(&initializer).unwrap().to_string(),
        r#"{"parent_id":{"_name":"named_query","type":"developer","id":"NEST"}}"#
    );
}

#[test]
fn test_parent_id_without_type_or_id_is_conditionless() {
    let no_type = Query::build(|q| q.parent_id(|p| p.id("NEST")));
    let no_id = Query::build(|q| q.parent_id(|p| p.type_of::<Developer>()));
    let empty_id = Query::build(|q| q.parent_id(|p| p.type_of::<Developer>().id("")));

    for query in [no_type, no_id, empty_id] {
        assert!(query.is_conditionless());
        assert_eq!(render(&query), None);
    }
}

#[tokio::test]
async fn test_null_term_is_dropped_from_search() {
    let response = in_memory_client(200, "{}")
        .search(SearchDescriptor::<Project>::of().query(|q| q.term("name", Value::Null)))
        .await
        .unwrap();

    assert_eq!(response.api_call().path_and_query(), "/project/project/_search");
    assert_eq!(response.api_call().request_body_str(), Some("{}"));
}

#[tokio::test]
async fn test_combined_query_in_search_body() {
    let response = in_memory_client(200, "{}")
        .search(
            SearchDescriptor::<Project>::of()
                .query(|q| q.term("state", "VeryActive") & q_match_name("NEST"))
                .size(10),
        )
        .await
        .unwrap();

    let body: Value = serde_json::from_str(response.api_call().request_body_str().unwrap()).unwrap();
    assert_eq!(
        body,
        json!({
            "query": {"bool": {"must": [
                {"term": {"state": {"value": "VeryActive"}}},
                {"match": {"name": {"query": "NEST"}}}
            ]}},
            "size": 10
        })
    );
}

fn q_match_name(name: &str) -> Query {
    Query::build(|q| q.match_(|m| m.field("name").query(name)))
}
