use super::document::ShardStats;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// `POST /_search`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse<T> {
    pub took: u64,
    pub timed_out: bool,
    #[serde(rename = "_shards")]
    pub shards: ShardStats,
    pub hits: Hits<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregations: Option<HashMap<String, Value>>,
    #[serde(rename = "_scroll_id", default, skip_serializing_if = "Option::is_none")]
    pub scroll_id: Option<String>,
}

impl<T> SearchResponse<T> {
    pub fn total(&self) -> u64 {
        self.hits.total.value()
    }

    /// Sources of all hits that carried one
    pub fn documents(&self) -> impl Iterator<Item = &T> {
        self.hits.hits.iter().filter_map(|h| h.source.as_ref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hits<T> {
    pub total: TotalHits,
    #[serde(default)]
    pub max_score: Option<f64>,
    pub hits: Vec<Hit<T>>,
}

/// Older servers report a bare number, newer ones an object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TotalHits {
    Count(u64),
    Object { value: u64, relation: String },
}

impl TotalHits {
    pub fn value(&self) -> u64 {
        match self {
            TotalHits::Count(n) => *n,
            TotalHits::Object { value, .. } => *value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hit<T> {
    #[serde(rename = "_index")]
    pub index: String,
    #[serde(rename = "_type", default)]
    pub doc_type: Option<String>,
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_score", default)]
    pub score: Option<f64>,
    #[serde(rename = "_source", default = "Option::default")]
    pub source: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight: Option<HashMap<String, Vec<String>>>,
    #[serde(rename = "matched_queries", default, skip_serializing_if = "Vec::is_empty")]
    pub matched_queries: Vec<String>,
}

/// `POST /{index}/{type}/{id}/_explain`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplainResponse {
    #[serde(rename = "_index")]
    pub index: String,
    #[serde(rename = "_type", default)]
    pub doc_type: Option<String>,
    #[serde(rename = "_id")]
    pub id: String,
    pub matched: bool,
    #[serde(default)]
    pub explanation: Option<Explanation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    pub value: f64,
    pub description: String,
    #[serde(default)]
    pub details: Vec<Explanation>,
}

/// `POST /_mtermvectors`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiTermVectorsResponse {
    #[serde(default)]
    pub docs: Vec<TermVectorsResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermVectorsResult {
    #[serde(rename = "_index")]
    pub index: String,
    #[serde(rename = "_type", default)]
    pub doc_type: Option<String>,
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    #[serde(default)]
    pub found: bool,
    #[serde(default)]
    pub took: Option<u64>,
    #[serde(default)]
    pub term_vectors: HashMap<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Project {
        name: String,
    }

    #[test]
    fn test_search_response_total_as_number() {
        let json = r#"{
            "took": 2, "timed_out": false,
            "_shards": {"total": 1, "successful": 1, "failed": 0},
            "hits": {"total": 1, "max_score": 1.0, "hits": [
                {"_index": "project", "_type": "doc", "_id": "NEST", "_score": 1.0, "_source": {"name": "NEST"}}
            ]}
        }"#;
        let response: SearchResponse<Project> = serde_json::from_str(json).unwrap();
        assert_eq!(response.total(), 1);
        assert_eq!(
            response.documents().collect::<Vec<_>>(),
            vec![&Project { name: "NEST".to_string() }]
        );
    }

    #[test]
    fn test_search_response_total_as_object() {
        let json = r#"{
            "took": 2, "timed_out": false,
            "_shards": {"total": 1, "successful": 1, "skipped": 0, "failed": 0},
            "hits": {"total": {"value": 10000, "relation": "gte"}, "max_score": null, "hits": []}
        }"#;
        let response: SearchResponse<Project> = serde_json::from_str(json).unwrap();
        assert_eq!(response.total(), 10000);
        assert_eq!(response.documents().count(), 0);
    }

    #[test]
    fn test_explain_response() {
        let json = r#"{"_index": "project", "_type": "doc", "_id": "NEST", "matched": true,
            "explanation": {"value": 1.0, "description": "*:*", "details": []}}"#;
        let response: ExplainResponse = serde_json::from_str(json).unwrap();
        assert!(response.matched);
        assert_eq!(response.explanation.unwrap().description, "*:*");
    }
}
