use super::{build_path, Request};
use crate::error::{ElasticError, Result};
use crate::http::{HttpMethod, RequestParameters};
use crate::infer::Inferrer;
use crate::post_data::PostData;
use crate::response::{AcknowledgedResponse, GetIndexTemplateResponse};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

fn template_path(name: &str) -> Result<String> {
    if name.trim().is_empty() {
        return Err(ElasticError::InvalidRequest("Template name is empty".to_string()));
    }
    build_path(&["_template", name])
}

/// `GET /_template[/{name}]`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GetIndexTemplateRequest {
    /// Name or wildcard; every template when unset
    pub name: Option<String>,
    pub params: RequestParameters,
}

impl GetIndexTemplateRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }
}

impl Request for GetIndexTemplateRequest {
    type Response = GetIndexTemplateResponse;

    fn method(&self) -> HttpMethod {
        HttpMethod::Get
    }

    fn path(&self, _inferrer: &Inferrer) -> Result<String> {
        match &self.name {
            Some(name) => template_path(name),
            None => build_path(&["_template"]),
        }
    }

    fn params(&self) -> &RequestParameters {
        &self.params
    }
}

#[derive(Debug, Clone, Default)]
pub struct GetIndexTemplateDescriptor {
    request: GetIndexTemplateRequest,
}

impl GetIndexTemplateDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.request.name = Some(name.into());
        self
    }

    pub fn flat_settings(mut self, flat: bool) -> Self {
        self.request.params.set("flat_settings", flat);
        self
    }

    pub fn local(mut self, local: bool) -> Self {
        self.request.params.set("local", local);
        self
    }

    pub fn master_timeout(mut self, timeout: impl ToString) -> Self {
        self.request.params.set("master_timeout", timeout);
        self
    }
}

impl From<GetIndexTemplateDescriptor> for GetIndexTemplateRequest {
    fn from(descriptor: GetIndexTemplateDescriptor) -> Self {
        descriptor.request
    }
}

/// `PUT /_template/{name}`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PutIndexTemplateRequest {
    pub name: String,
    pub index_patterns: Vec<String>,
    pub order: Option<i32>,
    pub version: Option<i64>,
    pub settings: BTreeMap<String, Value>,
    pub mappings: Option<Value>,
    pub aliases: BTreeMap<String, Value>,
    pub params: RequestParameters,
}

impl PutIndexTemplateRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

impl Request for PutIndexTemplateRequest {
    type Response = AcknowledgedResponse;

    fn method(&self) -> HttpMethod {
        HttpMethod::Put
    }

    fn path(&self, _inferrer: &Inferrer) -> Result<String> {
        template_path(&self.name)
    }

    fn params(&self) -> &RequestParameters {
        &self.params
    }

    fn body(&self, _inferrer: &Inferrer) -> Result<PostData> {
        let mut body = Map::new();
        if !self.index_patterns.is_empty() {
            body.insert("index_patterns".to_string(), serde_json::to_value(&self.index_patterns)?);
        }
        if let Some(order) = self.order {
            body.insert("order".to_string(), Value::from(order));
        }
        if let Some(version) = self.version {
            body.insert("version".to_string(), Value::from(version));
        }
        if !self.settings.is_empty() {
            body.insert("settings".to_string(), serde_json::to_value(&self.settings)?);
        }
        if let Some(mappings) = &self.mappings {
            body.insert("mappings".to_string(), mappings.clone());
        }
        if !self.aliases.is_empty() {
            body.insert("aliases".to_string(), serde_json::to_value(&self.aliases)?);
        }
        Ok(PostData::Json(Value::Object(body)))
    }
}

#[derive(Debug, Clone, Default)]
pub struct PutIndexTemplateDescriptor {
    request: PutIndexTemplateRequest,
}

impl PutIndexTemplateDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            request: PutIndexTemplateRequest::new(name),
        }
    }

    pub fn index_patterns<S: Into<String>>(mut self, patterns: impl IntoIterator<Item = S>) -> Self {
        self.request.index_patterns = patterns.into_iter().map(Into::into).collect();
        self
    }

    pub fn order(mut self, order: i32) -> Self {
        self.request.order = Some(order);
        self
    }

    pub fn version(mut self, version: i64) -> Self {
        self.request.version = Some(version);
        self
    }

    pub fn setting(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.request.settings.insert(key.into(), value.into());
        self
    }

    pub fn mappings(mut self, mappings: Value) -> Self {
        self.request.mappings = Some(mappings);
        self
    }

    pub fn alias(mut self, name: impl Into<String>, alias: Value) -> Self {
        self.request.aliases.insert(name.into(), alias);
        self
    }

    pub fn create(mut self, create: bool) -> Self {
        self.request.params.set("create", create);
        self
    }
}

impl From<PutIndexTemplateDescriptor> for PutIndexTemplateRequest {
    fn from(descriptor: PutIndexTemplateDescriptor) -> Self {
        descriptor.request
    }
}

/// `DELETE /_template/{name}`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeleteIndexTemplateRequest {
    pub name: String,
    pub params: RequestParameters,
}

impl DeleteIndexTemplateRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

impl Request for DeleteIndexTemplateRequest {
    type Response = AcknowledgedResponse;

    fn method(&self) -> HttpMethod {
        HttpMethod::Delete
    }

    fn path(&self, _inferrer: &Inferrer) -> Result<String> {
        template_path(&self.name)
    }

    fn params(&self) -> &RequestParameters {
        &self.params
    }
}
