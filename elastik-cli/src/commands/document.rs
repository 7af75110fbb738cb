use super::{print_json, Session};
use anyhow::Result;
use elastik::request::GetDocumentRequest;
use serde_json::Value;

pub async fn run_get(session: &Session, index: &str, doc_type: &str, id: &str) -> Result<()> {
    let response = session
        .client
        .get_document(GetDocumentRequest::<Value>::new(index, doc_type, id))
        .await?;

    if response.status() == Some(404) {
        session.trace(&response);
        println!("Document {}/{}/{} not found", index, doc_type, id);
        return Ok(());
    }

    let document = session.body(response)?;
    println!(
        "{}/{} version={}",
        document.index,
        document.id,
        document.version.map_or_else(|| "-".to_string(), |v| v.to_string())
    );
    match &document.source {
        Some(source) => print_json(source),
        None => {
            println!("(no source)");
            Ok(())
        }
    }
}
