use super::{build_path, Request};
use crate::error::{ElasticError, Result};
use crate::http::{HttpMethod, RequestParameters};
use crate::infer::{Document, Id, IndexName, Inferrer, TypeName};
use crate::post_data::PostData;
use crate::response::BulkResponse;
use serde::Serialize;
use serde_json::{json, Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkAction {
    Index,
    Create,
    Update,
    Delete,
}

impl BulkAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            BulkAction::Index => "index",
            BulkAction::Create => "create",
            BulkAction::Update => "update",
            BulkAction::Delete => "delete",
        }
    }
}

/// One action line plus its optional source line
#[derive(Debug, Clone, PartialEq)]
pub struct BulkOperation {
    pub action: BulkAction,
    pub index: Option<IndexName>,
    pub doc_type: Option<TypeName>,
    pub id: Option<Id>,
    pub routing: Option<String>,
    /// Absent for deletes
    pub source: Option<Value>,
}

impl BulkOperation {
    fn new(action: BulkAction, source: Option<Value>) -> Self {
        Self {
            action,
            index: None,
            doc_type: None,
            id: None,
            routing: None,
            source,
        }
    }

    pub fn index(source: Value) -> Self {
        Self::new(BulkAction::Index, Some(source))
    }

    pub fn create(source: Value) -> Self {
        Self::new(BulkAction::Create, Some(source))
    }

    /// `source` is the full update body, e.g. `{"doc": {...}}`
    pub fn update(id: impl Into<Id>, source: Value) -> Self {
        Self::new(BulkAction::Update, Some(source)).id(id)
    }

    /// Partial document update
    pub fn update_doc(id: impl Into<Id>, doc: Value) -> Self {
        Self::update(id, json!({ "doc": doc }))
    }

    pub fn delete(id: impl Into<Id>) -> Self {
        Self::new(BulkAction::Delete, None).id(id)
    }

    /// Index a document with index, type and id inferred from it
    pub fn index_document<T: Document + Serialize>(document: &T) -> Result<Self> {
        let mut op = Self::index(serde_json::to_value(document)?)
            .in_index(IndexName::of::<T>())
            .doc_type(TypeName::of::<T>());
        op.id = document.id().filter(|id| !id.is_empty());
        Ok(op)
    }

    pub fn in_index(mut self, index: impl Into<IndexName>) -> Self {
        self.index = Some(index.into());
        self
    }

    pub fn doc_type(mut self, doc_type: impl Into<TypeName>) -> Self {
        self.doc_type = Some(doc_type.into());
        self
    }

    pub fn id(mut self, id: impl Into<Id>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn routing(mut self, routing: impl Into<String>) -> Self {
        self.routing = Some(routing.into());
        self
    }

    fn write_lines(&self, inferrer: &Inferrer, lines: &mut Vec<Value>) -> Result<()> {
        let mut meta = Map::new();
        if let Some(index) = &self.index {
            meta.insert("_index".to_string(), Value::String(inferrer.index_name(index)?));
        }
        if let Some(doc_type) = &self.doc_type {
            meta.insert("_type".to_string(), Value::String(inferrer.type_name(doc_type)?));
        }
        if let Some(id) = &self.id {
            meta.insert("_id".to_string(), Value::String(inferrer.id(id)?));
        }
        if let Some(routing) = &self.routing {
            meta.insert("routing".to_string(), Value::String(routing.clone()));
        }

        let mut action = Map::new();
        action.insert(self.action.as_str().to_string(), Value::Object(meta));
        lines.push(Value::Object(action));

        match (&self.source, self.action) {
            (_, BulkAction::Delete) => {}
            (Some(source), _) => lines.push(source.clone()),
            (None, action) => {
                return Err(ElasticError::InvalidRequest(format!(
                    "Bulk {} operation has no source",
                    action.as_str()
                )))
            }
        }
        Ok(())
    }
}

/// `POST [/{index}[/{type}]]/_bulk` with a newline delimited body
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkRequest {
    /// Default index for operations that name none
    pub index: Option<IndexName>,
    pub doc_type: Option<TypeName>,
    pub operations: Vec<BulkOperation>,
    pub params: RequestParameters,
}

impl BulkRequest {
    pub fn new(operations: Vec<BulkOperation>) -> Self {
        Self {
            operations,
            ..Default::default()
        }
    }

    pub fn on(index: impl Into<IndexName>, operations: Vec<BulkOperation>) -> Self {
        Self {
            index: Some(index.into()),
            operations,
            ..Default::default()
        }
    }
}

impl Request for BulkRequest {
    type Response = BulkResponse;

    fn method(&self) -> HttpMethod {
        HttpMethod::Post
    }

    fn path(&self, inferrer: &Inferrer) -> Result<String> {
        match (&self.index, &self.doc_type) {
            (None, None) => build_path(&["_bulk"]),
            (Some(index), None) => {
                let index = inferrer.index_name(index)?;
                build_path(&[index.as_str(), "_bulk"])
            }
            (Some(index), Some(doc_type)) => {
                let index = inferrer.index_name(index)?;
                let doc_type = inferrer.type_name(doc_type)?;
                build_path(&[index.as_str(), doc_type.as_str(), "_bulk"])
            }
            (None, Some(_)) => Err(ElasticError::InvalidRequest(
                "A type was given for _bulk without an index".to_string(),
            )),
        }
    }

    fn params(&self) -> &RequestParameters {
        &self.params
    }

    fn body(&self, inferrer: &Inferrer) -> Result<PostData> {
        if self.operations.is_empty() {
            return Err(ElasticError::InvalidRequest("Bulk request has no operations".to_string()));
        }
        let mut lines = Vec::with_capacity(self.operations.len() * 2);
        for operation in &self.operations {
            operation.write_lines(inferrer, &mut lines)?;
        }
        Ok(PostData::MultiJson(lines))
    }
}

#[derive(Debug, Clone, Default)]
pub struct BulkDescriptor {
    request: BulkRequest,
}

impl BulkDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn index(mut self, index: impl Into<IndexName>) -> Self {
        self.request.index = Some(index.into());
        self
    }

    pub fn doc_type(mut self, doc_type: impl Into<TypeName>) -> Self {
        self.request.doc_type = Some(doc_type.into());
        self
    }

    pub fn operation(mut self, operation: BulkOperation) -> Self {
        self.request.operations.push(operation);
        self
    }

    pub fn index_many<T: Document + Serialize>(mut self, documents: &[T]) -> Result<Self> {
        for document in documents {
            self.request.operations.push(BulkOperation::index_document(document)?);
        }
        Ok(self)
    }

    /// `true`, `false` or `wait_for`
    pub fn refresh(mut self, refresh: impl ToString) -> Self {
        self.request.params.set("refresh", refresh);
        self
    }

    pub fn pipeline(mut self, pipeline: impl ToString) -> Self {
        self.request.params.set("pipeline", pipeline);
        self
    }
}

impl From<BulkDescriptor> for BulkRequest {
    fn from(descriptor: BulkDescriptor) -> Self {
        descriptor.request
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::ConnectionSettings;
    use std::sync::Arc;

    #[derive(Serialize)]
    struct Project {
        name: String,
    }

    impl Document for Project {
        const TYPE_NAME: &'static str = "Project";

        fn id(&self) -> Option<Id> {
            Some(Id::from(&self.name))
        }
    }

    fn settings() -> Arc<ConnectionSettings> {
        Arc::new(ConnectionSettings::default().default_index("project"))
    }

    #[test]
    fn test_bulk_body_lines() {
        let inferrer = Inferrer::new(settings());
        let request: BulkRequest = BulkDescriptor::new()
            .index("project")
            .index_many(&[Project { name: "NEST".to_string() }])
            .unwrap()
            .operation(BulkOperation::delete("old"))
            .operation(BulkOperation::update_doc("Elasticsearch.Net", json!({"stars": 1})).routing("r"))
            .into();

        assert_eq!(request.path(&inferrer).unwrap(), "/project/_bulk");
        let body = request.body(&inferrer).unwrap();
        let written = String::from_utf8(body.write(&settings()).unwrap()).unwrap();
        assert_eq!(
            written,
            concat!(
                "{\"index\":{\"_index\":\"project\",\"_type\":\"project\",\"_id\":\"NEST\"}}\n",
                "{\"name\":\"NEST\"}\n",
                "{\"delete\":{\"_id\":\"old\"}}\n",
                "{\"update\":{\"_id\":\"Elasticsearch.Net\",\"routing\":\"r\"}}\n",
                "{\"doc\":{\"stars\":1}}\n",
            )
        );
    }

    #[test]
    fn test_empty_bulk_is_rejected() {
        let inferrer = Inferrer::new(settings());
        assert!(BulkRequest::new(Vec::new()).body(&inferrer).is_err());
        assert_eq!(BulkRequest::new(Vec::new()).path(&inferrer).unwrap(), "/_bulk");
    }
}
