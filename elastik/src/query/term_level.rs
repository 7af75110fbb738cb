use super::{is_blank, query_meta, write_meta, QueryVariant};
use crate::error::Result;
use crate::infer::{Id, Inferrer, TypeName};
use serde_json::{Map, Value};

fn field_body(field: &str, inner: Map<String, Value>) -> Value {
    let mut body = Map::new();
    body.insert(field.to_string(), Value::Object(inner));
    Value::Object(body)
}

fn bound_is_blank(bound: &Option<Value>) -> bool {
    bound.as_ref().map_or(true, is_blank)
}

/// Exact value on one field
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TermQuery {
    pub name: Option<String>,
    pub boost: Option<f64>,
    pub field: String,
    pub value: Option<Value>,
}

query_meta!(TermQuery);

impl TermQuery {
    pub fn new(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: Some(value.into()),
            ..Default::default()
        }
    }

    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.field = field.into();
        self
    }

    pub fn value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }
}

impl QueryVariant for TermQuery {
    const KEY: &'static str = "term";

    fn is_conditionless(&self) -> bool {
        self.field.trim().is_empty() || self.value.as_ref().map_or(true, is_blank)
    }

    fn body(&self, _inferrer: &Inferrer) -> Result<Value> {
        let mut inner = Map::new();
        if let Some(value) = &self.value {
            inner.insert("value".to_string(), value.clone());
        }
        write_meta(&mut inner, &self.name, self.boost);
        Ok(field_body(&self.field, inner))
    }
}

/// Any of several exact values on one field
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TermsQuery {
    pub name: Option<String>,
    pub boost: Option<f64>,
    pub field: String,
    pub terms: Vec<Value>,
}

query_meta!(TermsQuery);

impl TermsQuery {
    pub fn new<V: Into<Value>>(field: impl Into<String>, terms: impl IntoIterator<Item = V>) -> Self {
        Self {
            field: field.into(),
            terms: terms.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.field = field.into();
        self
    }

    pub fn terms<V: Into<Value>>(mut self, terms: impl IntoIterator<Item = V>) -> Self {
        self.terms = terms.into_iter().map(Into::into).collect();
        self
    }
}

impl QueryVariant for TermsQuery {
    const KEY: &'static str = "terms";

    fn is_conditionless(&self) -> bool {
        self.field.trim().is_empty() || self.terms.iter().all(is_blank)
    }

    fn body(&self, _inferrer: &Inferrer) -> Result<Value> {
        let mut body = Map::new();
        let terms = self.terms.iter().filter(|t| !is_blank(t)).cloned().collect();
        body.insert(self.field.clone(), Value::Array(terms));
        write_meta(&mut body, &self.name, self.boost);
        Ok(Value::Object(body))
    }
}

/// Bounded values on one field; bounds are numbers or date strings
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RangeQuery {
    pub name: Option<String>,
    pub boost: Option<f64>,
    pub field: String,
    pub gt: Option<Value>,
    pub gte: Option<Value>,
    pub lt: Option<Value>,
    pub lte: Option<Value>,
    pub format: Option<String>,
    pub time_zone: Option<String>,
}

query_meta!(RangeQuery);

impl RangeQuery {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            ..Default::default()
        }
    }

    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.field = field.into();
        self
    }

    pub fn gt(mut self, bound: impl Into<Value>) -> Self {
        self.gt = Some(bound.into());
        self
    }

    pub fn gte(mut self, bound: impl Into<Value>) -> Self {
        self.gte = Some(bound.into());
        self
    }

    pub fn lt(mut self, bound: impl Into<Value>) -> Self {
        self.lt = Some(bound.into());
        self
    }

    pub fn lte(mut self, bound: impl Into<Value>) -> Self {
        self.lte = Some(bound.into());
        self
    }

    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn time_zone(mut self, time_zone: impl Into<String>) -> Self {
        self.time_zone = Some(time_zone.into());
        self
    }

    fn bounds(&self) -> [(&'static str, &Option<Value>); 4] {
        [
            ("gt", &self.gt),
            ("gte", &self.gte),
            ("lt", &self.lt),
            ("lte", &self.lte),
        ]
    }
}

impl QueryVariant for RangeQuery {
    const KEY: &'static str = "range";

    fn is_conditionless(&self) -> bool {
        self.field.trim().is_empty() || self.bounds().into_iter().all(|(_, b)| bound_is_blank(b))
    }

    fn body(&self, _inferrer: &Inferrer) -> Result<Value> {
        let mut inner = Map::new();
        for (key, bound) in self.bounds() {
            if !bound_is_blank(bound) {
                inner.insert(key.to_string(), bound.clone().unwrap_or_default());
            }
        }
        if let Some(format) = &self.format {
            inner.insert("format".to_string(), Value::String(format.clone()));
        }
        if let Some(time_zone) = &self.time_zone {
            inner.insert("time_zone".to_string(), Value::String(time_zone.clone()));
        }
        write_meta(&mut inner, &self.name, self.boost);
        Ok(field_body(&self.field, inner))
    }
}

/// Documents with any value in a field
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExistsQuery {
    pub name: Option<String>,
    pub boost: Option<f64>,
    pub field: String,
}

query_meta!(ExistsQuery);

impl ExistsQuery {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            ..Default::default()
        }
    }

    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.field = field.into();
        self
    }
}

impl QueryVariant for ExistsQuery {
    const KEY: &'static str = "exists";

    fn is_conditionless(&self) -> bool {
        self.field.trim().is_empty()
    }

    fn body(&self, _inferrer: &Inferrer) -> Result<Value> {
        let mut body = Map::new();
        body.insert("field".to_string(), Value::String(self.field.clone()));
        write_meta(&mut body, &self.name, self.boost);
        Ok(Value::Object(body))
    }
}

/// Documents by id, optionally restricted to mapping types
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IdsQuery {
    pub name: Option<String>,
    pub boost: Option<f64>,
    pub values: Vec<Id>,
    pub types: Vec<TypeName>,
}

query_meta!(IdsQuery);

impl IdsQuery {
    pub fn new<I: Into<Id>>(values: impl IntoIterator<Item = I>) -> Self {
        Self {
            values: values.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn values<I: Into<Id>>(mut self, values: impl IntoIterator<Item = I>) -> Self {
        self.values = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn doc_type(mut self, type_name: impl Into<TypeName>) -> Self {
        self.types.push(type_name.into());
        self
    }
}

impl QueryVariant for IdsQuery {
    const KEY: &'static str = "ids";

    fn is_conditionless(&self) -> bool {
        self.values.iter().all(Id::is_empty)
    }

    fn body(&self, inferrer: &Inferrer) -> Result<Value> {
        let mut body = Map::new();
        let values = self
            .values
            .iter()
            .filter(|id| !id.is_empty())
            .map(|id| Value::String(id.to_string()))
            .collect();
        body.insert("values".to_string(), Value::Array(values));
        if !self.types.is_empty() {
            let types: Result<Vec<Value>> = self
                .types
                .iter()
                .map(|t| inferrer.type_name(t).map(Value::String))
                .collect();
            body.insert("type".to_string(), Value::Array(types?));
        }
        write_meta(&mut body, &self.name, self.boost);
        Ok(Value::Object(body))
    }
}
