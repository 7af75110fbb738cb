//! Query DSL
//!
//! Each query is a plain struct with public fields (initializer form) and
//! chaining setters (fluent form); both produce the same JSON. A query that
//! lacks its required input is *conditionless* and disappears from the
//! request instead of being sent half-built.
//!
//! Queries combine with operators:
//!
//! ```text
//! a & b  → bool { must: [a, b] }
//! a | b  → bool { should: [a, b] }
//! !a     → bool { must_not: [a] }
//! ```

mod compound;
mod full_text;
mod joining;
mod match_all;
mod term_level;

pub use compound::{BoolQuery, DisMaxQuery, MinimumShouldMatch};
pub use full_text::{MatchQuery, Operator};
pub use joining::ParentIdQuery;
pub use match_all::{MatchAllQuery, MatchNoneQuery};
pub use term_level::{ExistsQuery, IdsQuery, RangeQuery, TermQuery, TermsQuery};

use crate::error::Result;
use crate::infer::Inferrer;
use serde_json::{Map, Value};
use std::ops::{BitAnd, BitOr, Not};

/// A single query variant
pub trait QueryVariant: Into<Query> {
    /// Key of the variant in the query DSL, e.g. `term`
    const KEY: &'static str;

    fn is_conditionless(&self) -> bool;

    /// The object under [`Self::KEY`]
    fn body(&self, inferrer: &Inferrer) -> Result<Value>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    MatchAll(MatchAllQuery),
    MatchNone(MatchNoneQuery),
    Term(TermQuery),
    Terms(TermsQuery),
    Match(MatchQuery),
    Range(RangeQuery),
    Exists(ExistsQuery),
    Ids(IdsQuery),
    Bool(BoolQuery),
    DisMax(DisMaxQuery),
    ParentId(ParentIdQuery),
}

macro_rules! dispatch {
    ($query:expr, $q:ident => $body:expr) => {
        match $query {
            Query::MatchAll($q) => $body,
            Query::MatchNone($q) => $body,
            Query::Term($q) => $body,
            Query::Terms($q) => $body,
            Query::Match($q) => $body,
            Query::Range($q) => $body,
            Query::Exists($q) => $body,
            Query::Ids($q) => $body,
            Query::Bool($q) => $body,
            Query::DisMax($q) => $body,
            Query::ParentId($q) => $body,
        }
    };
}

fn keyed<Q: QueryVariant>(query: &Q, inferrer: &Inferrer) -> Result<Value> {
    let mut outer = Map::new();
    outer.insert(Q::KEY.to_string(), query.body(inferrer)?);
    Ok(Value::Object(outer))
}

impl Query {
    /// Entry point for building a query through a [`QueryDescriptor`]
    pub fn build(f: impl FnOnce(QueryDescriptor) -> Query) -> Query {
        f(QueryDescriptor)
    }

    pub fn is_conditionless(&self) -> bool {
        dispatch!(self, q => q.is_conditionless())
    }

    /// The query as sent, `None` when it is conditionless
    pub fn to_value(&self, inferrer: &Inferrer) -> Result<Option<Value>> {
        if self.is_conditionless() {
            return Ok(None);
        }
        dispatch!(self, q => keyed(q, inferrer)).map(Some)
    }

    /// Bool query whose must clauses can absorb more must clauses
    fn as_mergeable_must(&self) -> Option<&BoolQuery> {
        match self {
            Query::Bool(b) if b.is_plain() && b.should.is_empty() => Some(b),
            _ => None,
        }
    }

    /// Bool query made only of should clauses
    fn as_mergeable_should(&self) -> Option<&BoolQuery> {
        match self {
            Query::Bool(b)
                if b.is_plain()
                    && b.must.is_empty()
                    && b.must_not.is_empty()
                    && b.filter.is_empty() =>
            {
                Some(b)
            }
            _ => None,
        }
    }
}

/// Writes `_name` and `boost` into a query body, ahead of the other keys
pub(crate) fn write_meta(body: &mut Map<String, Value>, name: &Option<String>, boost: Option<f64>) {
    let mut meta = Map::new();
    if let Some(name) = name {
        meta.insert("_name".to_string(), Value::String(name.clone()));
    }
    if let Some(boost) = boost {
        meta.insert("boost".to_string(), Value::from(boost));
    }
    if meta.is_empty() {
        return;
    }
    meta.extend(std::mem::take(body));
    *body = meta;
}

/// Empty strings and nulls do not count as input
pub(crate) fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Resolve child queries, skipping conditionless ones
pub(crate) fn resolve_all(queries: &[Query], inferrer: &Inferrer) -> Result<Vec<Value>> {
    let mut out = Vec::with_capacity(queries.len());
    for query in queries {
        if let Some(value) = query.to_value(inferrer)? {
            out.push(value);
        }
    }
    Ok(out)
}

/// Generates the `name` and `boost` setters shared by every query
macro_rules! query_meta {
    ($ty:ty) => {
        impl $ty {
            /// Name reported back in `matched_queries`
            pub fn name(mut self, name: impl Into<String>) -> Self {
                self.name = Some(name.into());
                self
            }

            pub fn boost(mut self, boost: f64) -> Self {
                self.boost = Some(boost);
                self
            }
        }
    };
}
pub(crate) use query_meta;

macro_rules! into_query {
    ($($ty:ident => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Query {
                fn from(query: $ty) -> Self {
                    Query::$variant(query)
                }
            }
        )*
    };
}

into_query! {
    MatchAllQuery => MatchAll,
    MatchNoneQuery => MatchNone,
    TermQuery => Term,
    TermsQuery => Terms,
    MatchQuery => Match,
    RangeQuery => Range,
    ExistsQuery => Exists,
    IdsQuery => Ids,
    BoolQuery => Bool,
    DisMaxQuery => DisMax,
    ParentIdQuery => ParentId,
}

impl BitAnd for Query {
    type Output = Query;

    fn bitand(self, rhs: Query) -> Query {
        if self.is_conditionless() {
            return rhs;
        }
        if rhs.is_conditionless() {
            return self;
        }

        let mut combined = BoolQuery::new();
        for side in [self, rhs] {
            match side.as_mergeable_must() {
                Some(b) => {
                    combined.must.extend(b.must.iter().cloned());
                    combined.must_not.extend(b.must_not.iter().cloned());
                    combined.filter.extend(b.filter.iter().cloned());
                }
                None => combined.must.push(side),
            }
        }
        Query::Bool(combined)
    }
}

impl BitOr for Query {
    type Output = Query;

    fn bitor(self, rhs: Query) -> Query {
        if self.is_conditionless() {
            return rhs;
        }
        if rhs.is_conditionless() {
            return self;
        }

        let mut combined = BoolQuery::new();
        for side in [self, rhs] {
            match side.as_mergeable_should() {
                Some(b) => combined.should.extend(b.should.iter().cloned()),
                None => combined.should.push(side),
            }
        }
        Query::Bool(combined)
    }
}

impl Not for Query {
    type Output = Query;

    fn not(self) -> Query {
        if self.is_conditionless() {
            return self;
        }
        Query::Bool(BoolQuery::new().must_not(self))
    }
}

/// Fluent entry point handed to `query(|q| ...)` closures
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryDescriptor;

impl QueryDescriptor {
    pub fn match_all(self, f: impl FnOnce(MatchAllQuery) -> MatchAllQuery) -> Query {
        f(MatchAllQuery::new()).into()
    }

    pub fn match_none(self, f: impl FnOnce(MatchNoneQuery) -> MatchNoneQuery) -> Query {
        f(MatchNoneQuery::new()).into()
    }

    pub fn term(self, field: impl Into<String>, value: impl Into<Value>) -> Query {
        TermQuery::new(field, value).into()
    }

    pub fn term_with(self, f: impl FnOnce(TermQuery) -> TermQuery) -> Query {
        f(TermQuery::default()).into()
    }

    pub fn terms(self, f: impl FnOnce(TermsQuery) -> TermsQuery) -> Query {
        f(TermsQuery::default()).into()
    }

    pub fn match_(self, f: impl FnOnce(MatchQuery) -> MatchQuery) -> Query {
        f(MatchQuery::default()).into()
    }

    pub fn range(self, f: impl FnOnce(RangeQuery) -> RangeQuery) -> Query {
        f(RangeQuery::default()).into()
    }

    pub fn exists(self, f: impl FnOnce(ExistsQuery) -> ExistsQuery) -> Query {
        f(ExistsQuery::default()).into()
    }

    pub fn ids(self, f: impl FnOnce(IdsQuery) -> IdsQuery) -> Query {
        f(IdsQuery::default()).into()
    }

    pub fn bool(self, f: impl FnOnce(BoolQuery) -> BoolQuery) -> Query {
        f(BoolQuery::new()).into()
    }

    pub fn dis_max(self, f: impl FnOnce(DisMaxQuery) -> DisMaxQuery) -> Query {
        f(DisMaxQuery::new()).into()
    }

    pub fn parent_id(self, f: impl FnOnce(ParentIdQuery) -> ParentIdQuery) -> Query {
        f(ParentIdQuery::default()).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::ConnectionSettings;
    use serde_json::json;
    use std::sync::Arc;

    fn inferrer() -> Inferrer {
        Inferrer::new(Arc::new(ConnectionSettings::default()))
    }

    fn term(field: &str, value: &str) -> Query {
        TermQuery::new(field, value).into()
    }

    #[test]
    fn test_and_builds_must() {
        let q = term("a", "1") & term("b", "2");
        assert_eq!(
            q.to_value(&inferrer()).unwrap().unwrap(),
            json!({"bool": {"must": [
                {"term": {"a": {"value": "1"}}},
                {"term": {"b": {"value": "2"}}}
            ]}})
        );
    }

    #[test]
    fn test_meta_keys_lead_the_body() {
        let mut body = Map::new();
        body.insert("queries".to_string(), json!([]));
        write_meta(&mut body, &Some("q".to_string()), Some(2.0));
        assert_eq!(Value::Object(body).to_string(), r#"{"_name":"q","boost":2.0,"queries":[]}"#);

        let mut bare = Map::new();
        bare.insert("field".to_string(), json!("x"));
        write_meta(&mut bare, &None, None);
        assert_eq!(Value::Object(bare).to_string(), r#"{"field":"x"}"#);
    }

    #[test]
    fn test_and_flattens_plain_bools() {
        let q = term("a", "1") & term("b", "2") & term("c", "3");
        match q {
            Query::Bool(b) => assert_eq!(b.must.len(), 3),
            other => panic!("expected bool, got {:?}", other),
        }
    }

    #[test]
    fn test_named_bool_is_not_flattened() {
        let named: Query = BoolQuery::new().name("n").must(term("a", "1")).into();
        let q = named & term("b", "2");
        match q {
            Query::Bool(b) => {
                assert_eq!(b.must.len(), 2);
                assert!(matches!(&b.must[0], Query::Bool(inner) if inner.name.as_deref() == Some("n")));
            }
            other => panic!("expected bool, got {:?}", other),
        }
    }

    #[test]
    fn test_or_flattens_should_only_bools() {
        let q = term("a", "1") | term("b", "2") | term("c", "3");
        match q {
            Query::Bool(b) => {
                assert_eq!(b.should.len(), 3);
                assert!(b.must.is_empty());
            }
            other => panic!("expected bool, got {:?}", other),
        }
    }

    #[test]
    fn test_not_builds_must_not() {
        let q = !term("a", "1");
        assert_eq!(
            q.to_value(&inferrer()).unwrap().unwrap(),
            json!({"bool": {"must_not": [{"term": {"a": {"value": "1"}}}]}})
        );
    }

    #[test]
    fn test_conditionless_side_is_dropped() {
        let empty: Query = TermQuery::new("a", Value::Null).into();
        assert!(empty.is_conditionless());
        assert_eq!(empty.clone() & term("b", "2"), term("b", "2"));
        assert_eq!(term("b", "2") | empty.clone(), term("b", "2"));
        assert!((!empty).is_conditionless());
    }

    #[test]
    fn test_conditionless_serializes_to_none() {
        let q: Query = ExistsQuery::new("").into();
        assert_eq!(q.to_value(&inferrer()).unwrap(), None);
    }

    #[test]
    fn test_descriptor_matches_initializer() {
        let fluent = Query::build(|q| q.match_all(|m| m.name("all").boost(2.0)));
        let initializer: Query = MatchAllQuery {
            name: Some("all".to_string()),
            boost: Some(2.0),
        }
        .into();
        assert_eq!(fluent, initializer);
        assert_eq!(
            fluent.to_value(&inferrer()).unwrap().unwrap(),
            json!({"match_all": {"_name": "all", "boost": 2.0}})
        );
    }
}
