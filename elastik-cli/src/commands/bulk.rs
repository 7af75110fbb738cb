use super::Session;
use anyhow::{Context, Result};
use elastik::response::BulkResponse;
use elastik::{HttpMethod, PostData};
use std::path::Path;
use tracing::info;

pub async fn run_bulk(session: &Session, file: &Path, index: Option<&str>) -> Result<()> {
    let content = std::fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
    let (body, lines) = prepare_body(&content)?;
    info!(file = %file.display(), lines, "Sending bulk file");

    let path = match index {
        Some(index) => format!("/{}/_bulk", index),
        None => "/_bulk".to_string(),
    };
    let response = session
        .client
        .low_level()
        .send(HttpMethod::Post, &path, PostData::String(body))
        .await?;
    let result: BulkResponse = serde_json::from_value(session.body(response)?)?;

    let failed: Vec<_> = result.items_with_errors().collect();
    println!(
        "{} items in {}ms, {} failed",
        result.items.len(),
        result.took,
        failed.len()
    );
    if failed.is_empty() {
        return Ok(());
    }

    println!();
    println!("{:<20} {:<24} {:<6} {}", "INDEX", "ID", "STATUS", "ERROR");
    println!("{}", "-".repeat(80));
    for item in &failed {
        let reason = item
            .error
            .as_ref()
            .and_then(|e| e.get("reason"))
            .and_then(|r| r.as_str())
            .unwrap_or("-");
        println!(
            "{:<20} {:<24} {:<6} {}",
            item.index,
            item.id.as_deref().unwrap_or("-"),
            item.status,
            reason
        );
    }
    anyhow::bail!("{} bulk items failed", failed.len())
}

/// Validate every line as JSON and terminate the body with a newline
fn prepare_body(content: &str) -> Result<(String, usize)> {
    let mut body = String::with_capacity(content.len() + 1);
    let mut lines = 0;
    for (number, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        serde_json::from_str::<serde_json::Value>(line)
            .with_context(|| format!("line {} is not valid JSON", number + 1))?;
        body.push_str(line);
        body.push('\n');
        lines += 1;
    }
    if lines == 0 {
        anyhow::bail!("bulk file is empty");
    }
    Ok((body, lines))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_body() {
        let content = "{\"index\":{\"_id\":\"1\"}}\n\n{\"message\":\"hello\"}";
        let (body, lines) = prepare_body(content).unwrap();
        assert_eq!(body, "{\"index\":{\"_id\":\"1\"}}\n{\"message\":\"hello\"}\n");
        assert_eq!(lines, 2);
    }

    #[test]
    fn test_prepare_body_reports_bad_line() {
        let err = prepare_body("{\"index\":{}}\n{oops}\n").unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_empty_bulk_file() {
        assert!(prepare_body("\n  \n").is_err());
    }
}
