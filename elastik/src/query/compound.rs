use super::{query_meta, resolve_all, write_meta, Query, QueryVariant};
use crate::error::Result;
use crate::infer::Inferrer;
use serde_json::{Map, Value};

/// `minimum_should_match` as an absolute count or a percentage
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MinimumShouldMatch {
    Fixed(i32),
    Percentage(f64),
}

impl MinimumShouldMatch {
    fn to_value(self) -> Value {
        match self {
            MinimumShouldMatch::Fixed(n) => Value::from(n),
            MinimumShouldMatch::Percentage(p) => Value::String(format!("{}%", p)),
        }
    }
}

impl From<i32> for MinimumShouldMatch {
    fn from(n: i32) -> Self {
        MinimumShouldMatch::Fixed(n)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoolQuery {
    pub name: Option<String>,
    pub boost: Option<f64>,
    pub must: Vec<Query>,
    pub should: Vec<Query>,
    pub must_not: Vec<Query>,
    pub filter: Vec<Query>,
    pub minimum_should_match: Option<MinimumShouldMatch>,
}

query_meta!(BoolQuery);

impl BoolQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn must(mut self, query: impl Into<Query>) -> Self {
        self.must.push(query.into());
        self
    }

    pub fn should(mut self, query: impl Into<Query>) -> Self {
        self.should.push(query.into());
        self
    }

    pub fn must_not(mut self, query: impl Into<Query>) -> Self {
        self.must_not.push(query.into());
        self
    }

    pub fn filter(mut self, query: impl Into<Query>) -> Self {
        self.filter.push(query.into());
        self
    }

    pub fn minimum_should_match(mut self, msm: impl Into<MinimumShouldMatch>) -> Self {
        self.minimum_should_match = Some(msm.into());
        self
    }

    /// No name, boost or minimum_should_match that merging would lose
    pub(crate) fn is_plain(&self) -> bool {
        self.name.is_none() && self.boost.is_none() && self.minimum_should_match.is_none()
    }

    fn clauses(&self) -> impl Iterator<Item = &Query> {
        self.must
            .iter()
            .chain(&self.should)
            .chain(&self.must_not)
            .chain(&self.filter)
    }
}

impl QueryVariant for BoolQuery {
    const KEY: &'static str = "bool";

    fn is_conditionless(&self) -> bool {
        self.clauses().all(Query::is_conditionless)
    }

    fn body(&self, inferrer: &Inferrer) -> Result<Value> {
        let mut body = Map::new();
        for (key, clauses) in [
            ("must", &self.must),
            ("should", &self.should),
            ("must_not", &self.must_not),
            ("filter", &self.filter),
        ] {
            let resolved = resolve_all(clauses, inferrer)?;
            if !resolved.is_empty() {
                body.insert(key.to_string(), Value::Array(resolved));
            }
        }
        if let Some(msm) = self.minimum_should_match {
            body.insert("minimum_should_match".to_string(), msm.to_value());
        }
        write_meta(&mut body, &self.name, self.boost);
        Ok(Value::Object(body))
    }
}

/// Documents matching any of the queries, scored by the best match
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisMaxQuery {
    pub name: Option<String>,
    pub boost: Option<f64>,
    pub queries: Vec<Query>,
    pub tie_breaker: Option<f64>,
}

query_meta!(DisMaxQuery);

impl DisMaxQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(mut self, query: impl Into<Query>) -> Self {
        self.queries.push(query.into());
        self
    }

    pub fn queries<Q: Into<Query>>(mut self, queries: impl IntoIterator<Item = Q>) -> Self {
        self.queries = queries.into_iter().map(Into::into).collect();
        self
    }

    pub fn tie_breaker(mut self, tie_breaker: f64) -> Self {
        self.tie_breaker = Some(tie_breaker);
        self
    }
}

impl QueryVariant for DisMaxQuery {
    const KEY: &'static str = "dis_max";

    fn is_conditionless(&self) -> bool {
        self.queries.iter().all(Query::is_conditionless)
    }

    fn body(&self, inferrer: &Inferrer) -> Result<Value> {
        let mut body = Map::new();
        body.insert(
            "queries".to_string(),
            Value::Array(resolve_all(&self.queries, inferrer)?),
        );
        if let Some(tie_breaker) = self.tie_breaker {
            body.insert("tie_breaker".to_string(), Value::from(tie_breaker));
        }
        write_meta(&mut body, &self.name, self.boost);
        Ok(Value::Object(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{MatchAllQuery, QueryDescriptor, TermQuery};
    use crate::settings::ConnectionSettings;
    use serde_json::json;
    use std::sync::Arc;

    fn inferrer() -> Inferrer {
        Inferrer::new(Arc::new(ConnectionSettings::default()))
    }

    #[test]
    fn test_dis_max_fluent_and_initializer_agree() {
        let initializer: Query = DisMaxQuery {
            name: Some("named_query".to_string()),
            boost: Some(1.1),
            tie_breaker: Some(1.11),
            queries: vec![
                MatchAllQuery {
                    name: Some("query1".to_string()),
                    ..Default::default()
                }
                .into(),
                MatchAllQuery {
                    name: Some("query2".to_string()),
                    ..Default::default()
                }
                .into(),
            ],
        }
        .into();

        let fluent = Query::build(|q| {
            q.dis_max(|d| {
                d.name("named_query")
                    .boost(1.1)
                    .tie_breaker(1.11)
                    .query(QueryDescriptor.match_all(|m| m.name("query1")))
                    .query(QueryDescriptor.match_all(|m| m.name("query2")))
            })
        });

        let expected = json!({
            "dis_max": {
                "_name": "named_query",
                "boost": 1.1,
                "queries": [
                    {"match_all": {"_name": "query1"}},
                    {"match_all": {"_name": "query2"}}
                ],
                "tie_breaker": 1.11
            }
        });
        assert_eq!(initializer.to_value(&inferrer()).unwrap().unwrap(), expected);
        assert_eq!(fluent.to_value(&inferrer()).unwrap().unwrap(), expected);
    }

    #[test]
    fn test_dis_max_conditionless() {
        assert!(DisMaxQuery::new().is_conditionless());
        assert!(DisMaxQuery::new()
            .query(TermQuery::new("name", Value::Null))
            .is_conditionless());
        assert!(!DisMaxQuery::new()
            .query(MatchAllQuery::new())
            .query(TermQuery::new("name", Value::Null))
            .is_conditionless());
    }

    #[test]
    fn test_dis_max_skips_conditionless_children() {
        let q = DisMaxQuery::new()
            .query(MatchAllQuery::new())
            .query(TermQuery::new("name", Value::Null));
        assert_eq!(
            q.body(&inferrer()).unwrap(),
            json!({"queries": [{"match_all": {}}]})
        );
    }

    #[test]
    fn test_bool_omits_empty_clauses() {
        let q = BoolQuery::new()
            .must(TermQuery::new("a", "1"))
            .filter(TermQuery::new("b", Value::Null))
            .minimum_should_match(MinimumShouldMatch::Percentage(50.0));
        assert_eq!(
            q.body(&inferrer()).unwrap(),
            json!({
                "must": [{"term": {"a": {"value": "1"}}}],
                "minimum_should_match": "50%"
            })
        );
    }

    #[test]
    fn test_empty_bool_is_conditionless() {
        assert!(BoolQuery::new().is_conditionless());
        assert!(BoolQuery::new().must(TermQuery::new("", "x")).is_conditionless());
    }
}
