use super::{build_path, Request};
use crate::error::Result;
use crate::http::{HttpMethod, RequestParameters};
use crate::infer::{Document, Id, IndexName, Inferrer, TypeName};
use crate::post_data::PostData;
use crate::response::{DeleteResponse, GetResponse, IndexResponse};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;

fn document_path(inferrer: &Inferrer, index: &IndexName, doc_type: &TypeName, id: &Id) -> Result<String> {
    let index = inferrer.index_name(index)?;
    let doc_type = inferrer.type_name(doc_type)?;
    let id = inferrer.id(id)?;
    build_path(&[index.as_str(), doc_type.as_str(), id.as_str()])
}

/// `PUT /{index}/{type}/{id}`, or `POST /{index}/{type}` when no id is known
#[derive(Debug, Clone, PartialEq)]
pub struct IndexDocumentRequest<T> {
    pub index: IndexName,
    pub doc_type: TypeName,
    /// Falls back to [`Document::id`] of the document
    pub id: Option<Id>,
    pub document: T,
    pub params: RequestParameters,
}

impl<T: Document> IndexDocumentRequest<T> {
    pub fn new(document: T) -> Self {
        Self {
            index: IndexName::of::<T>(),
            doc_type: TypeName::of::<T>(),
            id: None,
            document,
            params: RequestParameters::default(),
        }
    }

    fn resolved_id(&self) -> Option<Id> {
        self.id
            .clone()
            .filter(|id| !id.is_empty())
            .or_else(|| self.document.id().filter(|id| !id.is_empty()))
    }
}

impl<T: Document + Serialize> Request for IndexDocumentRequest<T> {
    type Response = IndexResponse;

    fn method(&self) -> HttpMethod {
        match self.resolved_id() {
            Some(_) => HttpMethod::Put,
            None => HttpMethod::Post,
        }
    }

    fn path(&self, inferrer: &Inferrer) -> Result<String> {
        match self.resolved_id() {
            Some(id) => document_path(inferrer, &self.index, &self.doc_type, &id),
            None => {
                let index = inferrer.index_name(&self.index)?;
                let doc_type = inferrer.type_name(&self.doc_type)?;
                build_path(&[index.as_str(), doc_type.as_str()])
            }
        }
    }

    fn params(&self) -> &RequestParameters {
        &self.params
    }

    fn body(&self, _inferrer: &Inferrer) -> Result<PostData> {
        PostData::json(&self.document)
    }
}

#[derive(Debug, Clone)]
pub struct IndexDocumentDescriptor<T> {
    request: IndexDocumentRequest<T>,
}

impl<T: Document> IndexDocumentDescriptor<T> {
    pub fn new(document: T) -> Self {
        Self {
            request: IndexDocumentRequest::new(document),
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

    pub fn id(mut self, id: impl Into<Id>) -> Self {
        self.request.id = Some(id.into());
        self
    }

    /// `true`, `false` or `wait_for`
    pub fn refresh(mut self, refresh: impl ToString) -> Self {
        self.request.params.set("refresh", refresh);
        self
    }

    pub fn routing(mut self, routing: impl ToString) -> Self {
        self.request.params.set("routing", routing);
        self
    }

    /// `index` or `create`
    pub fn op_type(mut self, op_type: impl ToString) -> Self {
        self.request.params.set("op_type", op_type);
        self
    }
}

impl<T> From<IndexDocumentDescriptor<T>> for IndexDocumentRequest<T> {
    fn from(descriptor: IndexDocumentDescriptor<T>) -> Self {
        descriptor.request
    }
}

/// `GET /{index}/{type}/{id}`
#[derive(Debug, Clone, PartialEq)]
pub struct GetDocumentRequest<T> {
    pub index: IndexName,
    pub doc_type: TypeName,
    pub id: Id,
    pub params: RequestParameters,
    document: PhantomData<fn() -> T>,
}

impl<T> GetDocumentRequest<T> {
    pub fn new(index: impl Into<IndexName>, doc_type: impl Into<TypeName>, id: impl Into<Id>) -> Self {
        Self {
            index: index.into(),
            doc_type: doc_type.into(),
            id: id.into(),
            params: RequestParameters::default(),
            document: PhantomData,
        }
    }
}

impl<T: Document> GetDocumentRequest<T> {
    /// Index and type inferred from `T`
    pub fn of(id: impl Into<Id>) -> Self {
        Self::new(IndexName::of::<T>(), TypeName::of::<T>(), id)
    }
}

impl<T: DeserializeOwned> Request for GetDocumentRequest<T> {
    type Response = GetResponse<T>;

    fn method(&self) -> HttpMethod {
        HttpMethod::Get
    }

    fn path(&self, inferrer: &Inferrer) -> Result<String> {
        document_path(inferrer, &self.index, &self.doc_type, &self.id)
    }

    fn params(&self) -> &RequestParameters {
        &self.params
    }
}

#[derive(Debug, Clone)]
pub struct GetDocumentDescriptor<T> {
    request: GetDocumentRequest<T>,
}

impl<T: Document> GetDocumentDescriptor<T> {
    pub fn new(id: impl Into<Id>) -> Self {
        Self {
            request: GetDocumentRequest::of(id),
        }
    }
}

impl<T> GetDocumentDescriptor<T> {
    pub fn index(mut self, index: impl Into<IndexName>) -> Self {
        self.request.index = index.into();
        self
    }

    pub fn doc_type(mut self, doc_type: impl Into<TypeName>) -> Self {
        self.request.doc_type = doc_type.into();
        self
    }

    pub fn routing(mut self, routing: impl ToString) -> Self {
        self.request.params.set("routing", routing);
        self
    }

    pub fn realtime(mut self, realtime: bool) -> Self {
        self.request.params.set("realtime", realtime);
        self
    }

    pub fn source_enabled(mut self, enabled: bool) -> Self {
        self.request.params.set("_source", enabled);
        self
    }
}

impl<T> From<GetDocumentDescriptor<T>> for GetDocumentRequest<T> {
    fn from(descriptor: GetDocumentDescriptor<T>) -> Self {
        descriptor.request
    }
}

/// `DELETE /{index}/{type}/{id}`
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteDocumentRequest {
    pub index: IndexName,
    pub doc_type: TypeName,
    pub id: Id,
    pub params: RequestParameters,
}

impl DeleteDocumentRequest {
    pub fn new(index: impl Into<IndexName>, doc_type: impl Into<TypeName>, id: impl Into<Id>) -> Self {
        Self {
            index: index.into(),
            doc_type: doc_type.into(),
            id: id.into(),
            params: RequestParameters::default(),
        }
    }

    pub fn of<T: Document>(id: impl Into<Id>) -> Self {
        Self::new(IndexName::of::<T>(), TypeName::of::<T>(), id)
    }

    /// Index, type and id all taken from the document; a missing id fails at path time
    pub fn for_document<T: Document>(document: &T) -> Self {
        Self::of::<T>(document.id().unwrap_or_else(|| Id::Text(String::new())))
    }
}

impl Request for DeleteDocumentRequest {
    type Response = DeleteResponse;

    fn method(&self) -> HttpMethod {
        HttpMethod::Delete
    }

    fn path(&self, inferrer: &Inferrer) -> Result<String> {
        document_path(inferrer, &self.index, &self.doc_type, &self.id)
    }

    fn params(&self) -> &RequestParameters {
        &self.params
    }
}

#[derive(Debug, Clone)]
pub struct DeleteDocumentDescriptor {
    request: DeleteDocumentRequest,
}

impl DeleteDocumentDescriptor {
    pub fn of<T: Document>(id: impl Into<Id>) -> Self {
        Self {
            request: DeleteDocumentRequest::of::<T>(id),
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

    pub fn refresh(mut self, refresh: impl ToString) -> Self {
        self.request.params.set("refresh", refresh);
        self
    }

    pub fn routing(mut self, routing: impl ToString) -> Self {
        self.request.params.set("routing", routing);
        self
    }

    pub fn version(mut self, version: u64) -> Self {
        self.request.params.set("version", version);
        self
    }
}

impl From<DeleteDocumentDescriptor> for DeleteDocumentRequest {
    fn from(descriptor: DeleteDocumentDescriptor) -> Self {
        descriptor.request
    }
}
