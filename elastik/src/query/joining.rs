use super::{query_meta, write_meta, QueryVariant};
use crate::error::Result;
use crate::infer::{Document, Id, Inferrer, TypeName};
use serde_json::{Map, Value};

/// Child documents of one parent
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParentIdQuery {
    pub name: Option<String>,
    pub boost: Option<f64>,
    /// Child type, resolved through the inferrer
    pub doc_type: Option<TypeName>,
    pub id: Option<Id>,
    pub ignore_unmapped: Option<bool>,
}

query_meta!(ParentIdQuery);

impl ParentIdQuery {
    pub fn new(doc_type: impl Into<TypeName>, id: impl Into<Id>) -> Self {
        Self {
            doc_type: Some(doc_type.into()),
            id: Some(id.into()),
            ..Default::default()
        }
    }

    pub fn doc_type(mut self, doc_type: impl Into<TypeName>) -> Self {
        self.doc_type = Some(doc_type.into());
        self
    }

    pub fn type_of<T: Document>(self) -> Self {
        self.doc_type(TypeName::of::<T>())
    }

    pub fn id(mut self, id: impl Into<Id>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn ignore_unmapped(mut self, ignore: bool) -> Self {
        self.ignore_unmapped = Some(ignore);
        self
    }
}

impl QueryVariant for ParentIdQuery {
    const KEY: &'static str = "parent_id";

    fn is_conditionless(&self) -> bool {
        self.doc_type.is_none() || self.id.as_ref().map_or(true, Id::is_empty)
    }

    fn body(&self, inferrer: &Inferrer) -> Result<Value> {
        let mut body = Map::new();
        if let Some(doc_type) = &self.doc_type {
            body.insert("type".to_string(), Value::String(inferrer.type_name(doc_type)?));
        }
        if let Some(id) = &self.id {
            body.insert("id".to_string(), Value::String(id.to_string()));
        }
        if let Some(ignore) = self.ignore_unmapped {
            body.insert("ignore_unmapped".to_string(), Value::Bool(ignore));
        }
        write_meta(&mut body, &self.name, self.boost);
        Ok(Value::Object(body))
    }
}
