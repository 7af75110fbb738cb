use super::{print_json, Session};
use anyhow::Result;
use elastik::query::Query;
use elastik::request::SearchDescriptor;
use serde_json::Value;

pub struct SearchArgs {
    pub index: Option<String>,
    pub doc_type: Option<String>,
    pub query: Option<String>,
    pub size: u64,
    pub from: Option<u64>,
}

pub async fn run_search(session: &Session, args: SearchArgs) -> Result<()> {
    let mut descriptor = SearchDescriptor::<Value>::new().size(args.size);
    if let Some(index) = args.index {
        descriptor = descriptor.index(index);
    }
    if let Some(doc_type) = args.doc_type.as_deref() {
        descriptor = descriptor.doc_type(doc_type);
    }
    if let Some(from) = args.from {
        descriptor = descriptor.from(from);
    }
    let query = match args.query.as_deref() {
        Some(query) => parse_match(query)?,
        None => Query::build(|q| q.match_all(|m| m)),
    };
    descriptor = descriptor.query(|_| query);

    let results = session.body(session.client.search(descriptor).await?)?;

    println!("{} hits in {}ms", results.total(), results.took);
    for hit in &results.hits.hits {
        println!();
        println!(
            "{}/{} score={}",
            hit.index,
            hit.id,
            hit.score.map_or_else(|| "-".to_string(), |s| format!("{:.3}", s))
        );
        if let Some(source) = &hit.source {
            print_json(source)?;
        }
    }
    Ok(())
}

/// `field=text` as a match query
fn parse_match(query: &str) -> Result<Query> {
    let Some((field, text)) = query.split_once('=') else {
        anyhow::bail!("query must look like field=text, got {}", query);
    };
    let (field, text) = (field.trim(), text.trim());
    if field.is_empty() {
        anyhow::bail!("query {} names no field", query);
    }
    Ok(Query::build(|q| q.match_(|m| m.field(field).query(text))))
}
