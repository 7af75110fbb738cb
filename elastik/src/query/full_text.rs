use super::{query_meta, write_meta, QueryVariant};
use crate::error::Result;
use crate::infer::Inferrer;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    And,
    Or,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::And => "and",
            Operator::Or => "or",
        }
    }
}

/// Analyzed full text query on one field
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchQuery {
    pub name: Option<String>,
    pub boost: Option<f64>,
    pub field: String,
    pub query: Option<String>,
    pub operator: Option<Operator>,
    pub analyzer: Option<String>,
    pub fuzziness: Option<String>,
    pub minimum_should_match: Option<String>,
    pub lenient: Option<bool>,
}

query_meta!(MatchQuery);

impl MatchQuery {
    pub fn new(field: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            query: Some(query.into()),
            ..Default::default()
        }
    }

    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.field = field.into();
        self
    }

    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn operator(mut self, operator: Operator) -> Self {
        self.operator = Some(operator);
        self
    }

    pub fn analyzer(mut self, analyzer: impl Into<String>) -> Self {
        self.analyzer = Some(analyzer.into());
        self
    }

    pub fn fuzziness(mut self, fuzziness: impl Into<String>) -> Self {
        self.fuzziness = Some(fuzziness.into());
        self
    }

    pub fn minimum_should_match(mut self, msm: impl Into<String>) -> Self {
        self.minimum_should_match = Some(msm.into());
        self
    }

    pub fn lenient(mut self, lenient: bool) -> Self {
        self.lenient = Some(lenient);
        self
    }
}

impl QueryVariant for MatchQuery {
    const KEY: &'static str = "match";

    fn is_conditionless(&self) -> bool {
        self.field.trim().is_empty()
            || self.query.as_deref().map_or(true, |q| q.trim().is_empty())
    }

    fn body(&self, _inferrer: &Inferrer) -> Result<Value> {
        let mut inner = Map::new();
        if let Some(query) = &self.query {
            inner.insert("query".to_string(), Value::String(query.clone()));
        }
        if let Some(operator) = self.operator {
            inner.insert("operator".to_string(), Value::String(operator.as_str().to_string()));
        }
        let optional = [
            ("analyzer", &self.analyzer),
            ("fuzziness", &self.fuzziness),
            ("minimum_should_match", &self.minimum_should_match),
        ];
        for (key, value) in optional {
            if let Some(value) = value {
                inner.insert(key.to_string(), Value::String(value.clone()));
            }
        }
        if let Some(lenient) = self.lenient {
            inner.insert("lenient".to_string(), Value::Bool(lenient));
        }
        write_meta(&mut inner, &self.name, self.boost);

        let mut body = Map::new();
        body.insert(self.field.clone(), Value::Object(inner));
        Ok(Value::Object(body))
    }
}
