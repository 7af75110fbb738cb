use super::{query_meta, write_meta, QueryVariant};
use crate::error::Result;
use crate::infer::Inferrer;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchAllQuery {
    pub name: Option<String>,
    pub boost: Option<f64>,
}

query_meta!(MatchAllQuery);

impl MatchAllQuery {
    pub fn new() -> Self {
        Self::default()
    }
}

impl QueryVariant for MatchAllQuery {
    const KEY: &'static str = "match_all";

    fn is_conditionless(&self) -> bool {
        false
    }

    fn body(&self, _inferrer: &Inferrer) -> Result<Value> {
        let mut body = Map::new();
        write_meta(&mut body, &self.name, self.boost);
        Ok(Value::Object(body))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchNoneQuery {
    pub name: Option<String>,
    pub boost: Option<f64>,
}

query_meta!(MatchNoneQuery);

impl MatchNoneQuery {
    pub fn new() -> Self {
        Self::default()
    }
}

impl QueryVariant for MatchNoneQuery {
    const KEY: &'static str = "match_none";

    fn is_conditionless(&self) -> bool {
        false
    }

    fn body(&self, _inferrer: &Inferrer) -> Result<Value> {
        let mut body = Map::new();
        write_meta(&mut body, &self.name, self.boost);
        Ok(Value::Object(body))
    }
}
