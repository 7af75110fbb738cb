use super::{build_path, Request};
use crate::error::{ElasticError, Result};
use crate::http::{HttpMethod, RequestParameters};
use crate::infer::{Document, Id, IndexName, Inferrer, TypeName};
use crate::post_data::PostData;
use crate::response::MultiTermVectorsResponse;
use serde_json::{Map, Value};

/// One document in a multi term vectors call
#[derive(Debug, Clone, PartialEq)]
pub struct TermVectorsDoc {
    pub index: Option<IndexName>,
    pub doc_type: Option<TypeName>,
    pub id: Id,
    pub fields: Vec<String>,
    pub offsets: Option<bool>,
    pub positions: Option<bool>,
    pub term_statistics: Option<bool>,
    pub field_statistics: Option<bool>,
}

impl TermVectorsDoc {
    pub fn new(id: impl Into<Id>) -> Self {
        Self {
            index: None,
            doc_type: None,
            id: id.into(),
            fields: Vec::new(),
            offsets: None,
            positions: None,
            term_statistics: None,
            field_statistics: None,
        }
    }

    /// Index and type inferred from `T`
    pub fn of<T: Document>(id: impl Into<Id>) -> Self {
        Self {
            index: Some(IndexName::of::<T>()),
            doc_type: Some(TypeName::of::<T>()),
            ..Self::new(id)
        }
    }

    pub fn fields<S: Into<String>>(mut self, fields: impl IntoIterator<Item = S>) -> Self {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn offsets(mut self, enabled: bool) -> Self {
        self.offsets = Some(enabled);
        self
    }

    pub fn positions(mut self, enabled: bool) -> Self {
        self.positions = Some(enabled);
        self
    }

    pub fn term_statistics(mut self, enabled: bool) -> Self {
        self.term_statistics = Some(enabled);
        self
    }

    pub fn field_statistics(mut self, enabled: bool) -> Self {
        self.field_statistics = Some(enabled);
        self
    }

    fn to_value(&self, inferrer: &Inferrer) -> Result<Value> {
        let mut doc = Map::new();
        if let Some(index) = &self.index {
            doc.insert("_index".to_string(), Value::String(inferrer.index_name(index)?));
        }
        if let Some(doc_type) = &self.doc_type {
            doc.insert("_type".to_string(), Value::String(inferrer.type_name(doc_type)?));
        }
        doc.insert("_id".to_string(), Value::String(inferrer.id(&self.id)?));
        if !self.fields.is_empty() {
            doc.insert("fields".to_string(), serde_json::to_value(&self.fields)?);
        }
        let flags = [
            ("offsets", self.offsets),
            ("positions", self.positions),
            ("term_statistics", self.term_statistics),
            ("field_statistics", self.field_statistics),
        ];
        for (key, flag) in flags.into_iter().filter_map(|(k, f)| f.map(|f| (k, f))) {
            doc.insert(key.to_string(), Value::Bool(flag));
        }
        Ok(Value::Object(doc))
    }
}

/// `POST [/{index}[/{type}]]/_mtermvectors`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultiTermVectorsRequest {
    pub index: Option<IndexName>,
    pub doc_type: Option<TypeName>,
    pub docs: Vec<TermVectorsDoc>,
    /// Shorthand for docs that share the index and type of the path
    pub ids: Vec<Id>,
    pub params: RequestParameters,
}

impl MultiTermVectorsRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(index: impl Into<IndexName>) -> Self {
        Self {
            index: Some(index.into()),
            ..Default::default()
        }
    }

    pub fn on_type(index: impl Into<IndexName>, doc_type: impl Into<TypeName>) -> Self {
        Self {
            index: Some(index.into()),
            doc_type: Some(doc_type.into()),
            ..Default::default()
        }
    }
}

impl Request for MultiTermVectorsRequest {
    type Response = MultiTermVectorsResponse;

    fn method(&self) -> HttpMethod {
        HttpMethod::Post
    }

    fn path(&self, inferrer: &Inferrer) -> Result<String> {
        match (&self.index, &self.doc_type) {
            (None, None) => build_path(&["_mtermvectors"]),
            (Some(index), None) => {
                let index = inferrer.index_name(index)?;
                build_path(&[index.as_str(), "_mtermvectors"])
            }
            (Some(index), Some(doc_type)) => {
                let index = inferrer.index_name(index)?;
                let doc_type = inferrer.type_name(doc_type)?;
                build_path(&[index.as_str(), doc_type.as_str(), "_mtermvectors"])
            }
            (None, Some(_)) => Err(ElasticError::InvalidRequest(
                "A type was given for _mtermvectors without an index".to_string(),
            )),
        }
    }

    fn params(&self) -> &RequestParameters {
        &self.params
    }

    fn body(&self, inferrer: &Inferrer) -> Result<PostData> {
        let mut body = Map::new();
        if !self.docs.is_empty() {
            let docs: Result<Vec<Value>> = self.docs.iter().map(|d| d.to_value(inferrer)).collect();
            body.insert("docs".to_string(), Value::Array(docs?));
        }
        if !self.ids.is_empty() {
            let ids: Result<Vec<Value>> = self
                .ids
                .iter()
                .map(|id| inferrer.id(id).map(Value::String))
                .collect();
            body.insert("ids".to_string(), Value::Array(ids?));
        }
        Ok(PostData::Json(Value::Object(body)))
    }
}

#[derive(Debug, Clone, Default)]
pub struct MultiTermVectorsDescriptor {
    request: MultiTermVectorsRequest,
}

impl MultiTermVectorsDescriptor {
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

    pub fn doc(mut self, doc: TermVectorsDoc) -> Self {
        self.request.docs.push(doc);
        self
    }

    /// Adds a doc whose index and type are inferred from `T`
    pub fn get<T: Document>(self, id: impl Into<Id>, f: impl FnOnce(TermVectorsDoc) -> TermVectorsDoc) -> Self {
        self.doc(f(TermVectorsDoc::of::<T>(id)))
    }

    pub fn ids<I: Into<Id>>(mut self, ids: impl IntoIterator<Item = I>) -> Self {
        self.request.ids = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn fields<S: ToString>(mut self, fields: impl IntoIterator<Item = S>) -> Self {
        let fields: Vec<String> = fields.into_iter().map(|f| f.to_string()).collect();
        self.request.params.set("fields", fields.join(","));
        self
    }

    pub fn term_statistics(mut self, enabled: bool) -> Self {
        self.request.params.set("term_statistics", enabled);
        self
    }

    pub fn realtime(mut self, realtime: bool) -> Self {
        self.request.params.set("realtime", realtime);
        self
    }
}

impl From<MultiTermVectorsDescriptor> for MultiTermVectorsRequest {
    fn from(descriptor: MultiTermVectorsDescriptor) -> Self {
        descriptor.request
    }
}
