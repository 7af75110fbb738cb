use super::{build_path, Request};
use crate::error::Result;
use crate::http::{HttpMethod, RequestParameters};
use crate::infer::{Document, Id, IndexName, Indices, Inferrer, TypeName, Types};
use crate::post_data::PostData;
use crate::query::{Query, QueryDescriptor};
use crate::response::{ExplainResponse, SearchResponse};
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use std::marker::PhantomData;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "asc",
            SortOrder::Descending => "desc",
        }
    }
}

/// `POST [/{indices}[/{types}]]/_search`
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest<T> {
    pub indices: Indices,
    pub types: Types,
    /// Omitted from the body when conditionless
    pub query: Option<Query>,
    pub from: Option<u64>,
    pub size: Option<u64>,
    pub sort: Vec<(String, SortOrder)>,
    pub source: Option<bool>,
    pub params: RequestParameters,
    document: PhantomData<fn() -> T>,
}

impl<T> Default for SearchRequest<T> {
    fn default() -> Self {
        Self {
            indices: Indices::All,
            types: Types::All,
            query: None,
            from: None,
            size: None,
            sort: Vec::new(),
            source: None,
            params: RequestParameters::default(),
            document: PhantomData,
        }
    }
}

impl<T> SearchRequest<T> {
    /// Every index and type
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(indices: impl Into<Indices>) -> Self {
        Self {
            indices: indices.into(),
            ..Default::default()
        }
    }
}

impl<T: Document> SearchRequest<T> {
    /// Index and type inferred from `T`
    pub fn of() -> Self {
        Self {
            indices: Indices::of::<T>(),
            types: Types::of::<T>(),
            ..Default::default()
        }
    }
}

impl<T: DeserializeOwned> Request for SearchRequest<T> {
    type Response = SearchResponse<T>;

    fn method(&self) -> HttpMethod {
        HttpMethod::Post
    }

    fn path(&self, inferrer: &Inferrer) -> Result<String> {
        let types = inferrer.types(&self.types)?;
        if self.indices.is_all() && types.is_none() {
            return build_path(&["_search"]);
        }
        let indices = inferrer.indices(&self.indices)?;
        match types {
            Some(types) => build_path(&[indices.as_str(), types.as_str(), "_search"]),
            None => build_path(&[indices.as_str(), "_search"]),
        }
    }

    fn params(&self) -> &RequestParameters {
        &self.params
    }

    fn body(&self, inferrer: &Inferrer) -> Result<PostData> {
        let mut body = Map::new();
        if let Some(query) = &self.query {
            if let Some(query) = query.to_value(inferrer)? {
                body.insert("query".to_string(), query);
            }
        }
        if let Some(from) = self.from {
            body.insert("from".to_string(), Value::from(from));
        }
        if let Some(size) = self.size {
            body.insert("size".to_string(), Value::from(size));
        }
        if !self.sort.is_empty() {
            let sort = self
                .sort
                .iter()
                .map(|(field, order)| {
                    let mut clause = Map::new();
                    clause.insert(field.clone(), json!({"order": order.as_str()}));
                    Value::Object(clause)
                })
                .collect();
            body.insert("sort".to_string(), Value::Array(sort));
        }
        if let Some(source) = self.source {
            body.insert("_source".to_string(), Value::Bool(source));
        }
        Ok(PostData::Json(Value::Object(body)))
    }
}

#[derive(Debug, Clone)]
pub struct SearchDescriptor<T> {
    request: SearchRequest<T>,
}

impl<T> Default for SearchDescriptor<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SearchDescriptor<T> {
    pub fn new() -> Self {
        Self {
            request: SearchRequest::new(),
        }
    }

    pub fn index(mut self, indices: impl Into<Indices>) -> Self {
        self.request.indices = indices.into();
        self
    }

    pub fn all_indices(mut self) -> Self {
        self.request.indices = Indices::All;
        self
    }

    pub fn doc_type(mut self, types: impl Into<Types>) -> Self {
        self.request.types = types.into();
        self
    }

    pub fn all_types(mut self) -> Self {
        self.request.types = Types::All;
        self
    }

    pub fn query(mut self, f: impl FnOnce(QueryDescriptor) -> Query) -> Self {
        self.request.query = Some(Query::build(f));
        self
    }

    pub fn from(mut self, from: u64) -> Self {
        self.request.from = Some(from);
        self
    }

    pub fn size(mut self, size: u64) -> Self {
        self.request.size = Some(size);
        self
    }

    pub fn sort(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.request.sort.push((field.into(), order));
        self
    }

    pub fn source(mut self, enabled: bool) -> Self {
        self.request.source = Some(enabled);
        self
    }

    pub fn routing(mut self, routing: impl ToString) -> Self {
        self.request.params.set("routing", routing);
        self
    }

    pub fn search_type(mut self, search_type: impl ToString) -> Self {
        self.request.params.set("search_type", search_type);
        self
    }
}

impl<T: Document> SearchDescriptor<T> {
    pub fn of() -> Self {
        Self {
            request: SearchRequest::of(),
        }
    }
}

impl<T> From<SearchDescriptor<T>> for SearchRequest<T> {
    fn from(descriptor: SearchDescriptor<T>) -> Self {
        descriptor.request
    }
}

/// `POST /{index}/{type}/{id}/_explain`
#[derive(Debug, Clone, PartialEq)]
pub struct ExplainRequest {
    pub index: IndexName,
    pub doc_type: TypeName,
    pub id: Id,
    pub query: Option<Query>,
    pub params: RequestParameters,
}

impl ExplainRequest {
    pub fn new(index: impl Into<IndexName>, doc_type: impl Into<TypeName>, id: impl Into<Id>) -> Self {
        Self {
            index: index.into(),
            doc_type: doc_type.into(),
            id: id.into(),
            query: None,
            params: RequestParameters::default(),
        }
    }

    pub fn of<T: Document>(id: impl Into<Id>) -> Self {
        Self::new(IndexName::of::<T>(), TypeName::of::<T>(), id)
    }

    pub fn for_document<T: Document>(document: &T) -> Self {
        Self::of::<T>(document.id().unwrap_or_else(|| Id::Text(String::new())))
    }
}

impl Request for ExplainRequest {
    type Response = ExplainResponse;

    fn method(&self) -> HttpMethod {
        HttpMethod::Post
    }

    fn path(&self, inferrer: &Inferrer) -> Result<String> {
        let index = inferrer.index_name(&self.index)?;
        let doc_type = inferrer.type_name(&self.doc_type)?;
        let id = inferrer.id(&self.id)?;
        build_path(&[index.as_str(), doc_type.as_str(), id.as_str(), "_explain"])
    }

    fn params(&self) -> &RequestParameters {
        &self.params
    }

    fn body(&self, inferrer: &Inferrer) -> Result<PostData> {
        let mut body = Map::new();
        if let Some(query) = &self.query {
            if let Some(query) = query.to_value(inferrer)? {
                body.insert("query".to_string(), query);
            }
        }
        Ok(PostData::Json(Value::Object(body)))
    }
}

#[derive(Debug, Clone)]
pub struct ExplainDescriptor {
    request: ExplainRequest,
}

impl ExplainDescriptor {
    pub fn of<T: Document>(id: impl Into<Id>) -> Self {
        Self {
            request: ExplainRequest::of::<T>(id),
        }
    }

    pub fn for_document<T: Document>(document: &T) -> Self {
        Self {
            request: ExplainRequest::for_document(document),
        }
    }

    pub fn index(mut self, index: impl Into<IndexName>) -> Self {
        self.request.index = index.into();
        self
    }

    pub fn doc_type(mut self, doc_type: impl Into<TypeName>) -> Self {
        self.request.doc_type = doc_type.into();
        self
    }

    pub fn query(mut self, f: impl FnOnce(QueryDescriptor) -> Query) -> Self {
        self.request.query = Some(Query::build(f));
        self
    }

    pub fn routing(mut self, routing: impl ToString) -> Self {
        self.request.params.set("routing", routing);
        self
    }
}

impl From<ExplainDescriptor> for ExplainRequest {
    fn from(descriptor: ExplainDescriptor) -> Self {
        descriptor.request
    }
}
