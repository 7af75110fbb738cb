use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardStats {
    pub total: u32,
    pub successful: u32,
    #[serde(default)]
    pub skipped: u32,
    pub failed: u32,
}

/// `PUT /{index}/{type}/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexResponse {
    #[serde(rename = "_index")]
    pub index: String,
    #[serde(rename = "_type", default)]
    pub doc_type: Option<String>,
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_version", default)]
    pub version: Option<u64>,
    #[serde(default)]
    pub result: Option<String>,
    #[serde(rename = "_shards", default)]
    pub shards: Option<ShardStats>,
}

/// `GET /{index}/{type}/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetResponse<T> {
    #[serde(rename = "_index")]
    pub index: String,
    #[serde(rename = "_type", default)]
    pub doc_type: Option<String>,
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_version", default)]
    pub version: Option<u64>,
    pub found: bool,
    #[serde(rename = "_source", default = "Option::default")]
    pub source: Option<T>,
}

/// `DELETE /{index}/{type}/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteResponse {
    #[serde(rename = "_index")]
    pub index: String,
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub result: Option<String>,
    #[serde(rename = "_version", default)]
    pub version: Option<u64>,
}

/// `POST /_bulk`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkResponse {
    pub took: u64,
    pub errors: bool,
    pub items: Vec<BulkItem>,
}

impl BulkResponse {
    /// Items the server rejected
    pub fn items_with_errors(&self) -> impl Iterator<Item = &BulkItemResult> {
        self.items
            .iter()
            .map(BulkItem::result)
            .filter(|r| r.error.is_some() || r.status >= 300)
    }
}

/// One line of the bulk response, keyed by the operation that produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkItem {
    Index(BulkItemResult),
    Create(BulkItemResult),
    Update(BulkItemResult),
    Delete(BulkItemResult),
}

impl BulkItem {
    pub fn operation(&self) -> &'static str {
        match self {
            BulkItem::Index(_) => "index",
            BulkItem::Create(_) => "create",
            BulkItem::Update(_) => "update",
            BulkItem::Delete(_) => "delete",
        }
    }

    pub fn result(&self) -> &BulkItemResult {
        match self {
            BulkItem::Index(r) | BulkItem::Create(r) | BulkItem::Update(r) | BulkItem::Delete(r) => r,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkItemResult {
    #[serde(rename = "_index")]
    pub index: String,
    #[serde(rename = "_type", default)]
    pub doc_type: Option<String>,
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    #[serde(rename = "_version", default)]
    pub version: Option<u64>,
    #[serde(default)]
    pub result: Option<String>,
    pub status: u16,
    #[serde(default)]
    pub error: Option<Value>,
}
