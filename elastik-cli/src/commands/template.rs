use super::{print_json, Session};
use anyhow::{Context, Result};
use elastik::request::{DeleteIndexTemplateRequest, GetIndexTemplateDescriptor, PutIndexTemplateRequest};
use serde_json::Value;
use std::path::Path;

pub async fn run_template_get(session: &Session, name: Option<String>, local: bool) -> Result<()> {
    let mut descriptor = GetIndexTemplateDescriptor::new().local(local);
    if let Some(name) = &name {
        descriptor = descriptor.name(name.as_str());
    }

    let templates = session.body(session.client.get_index_template(descriptor).await?)?;
    if templates.is_empty() {
        println!("No templates");
        return Ok(());
    }

    if name.is_some() {
        return print_json(&templates);
    }

    let mut names: Vec<&String> = templates.template_mappings.keys().collect();
    names.sort();

    println!(
        "{:<30} {:<6} {:<8} {:<7} {}",
        "NAME", "ORDER", "VERSION", "SHARDS", "PATTERNS"
    );
    println!("{}", "-".repeat(80));
    for name in names {
        let mapping = &templates.template_mappings[name];
        println!(
            "{:<30} {:<6} {:<8} {:<7} {}",
            name,
            mapping.order,
            mapping.version.map_or_else(|| "-".to_string(), |v| v.to_string()),
            mapping.number_of_shards().map_or_else(|| "-".to_string(), |s| s.to_string()),
            mapping.patterns().join(",")
        );
    }
    Ok(())
}

pub async fn run_template_put(session: &Session, name: &str, file: &Path, create: bool) -> Result<()> {
    let mut request = load_template(name, file)?;
    if create {
        request.params.set("create", true);
    }

    let ack = session.body(session.client.put_index_template(request).await?)?;
    if !ack.acknowledged {
        anyhow::bail!("Template {} was not acknowledged", name);
    }
    println!("Template {} stored", name);
    Ok(())
}

pub async fn run_template_delete(session: &Session, name: &str) -> Result<()> {
    let ack = session.body(
        session
            .client
            .delete_index_template(DeleteIndexTemplateRequest::new(name))
            .await?,
    )?;
    if !ack.acknowledged {
        anyhow::bail!("Template {} was not acknowledged", name);
    }
    println!("Template {} deleted", name);
    Ok(())
}

/// Read a template body; the legacy single `template` pattern is accepted too
pub fn load_template(name: &str, path: &Path) -> Result<PutIndexTemplateRequest> {
    let content = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let body: Value =
        serde_json::from_str(&content).with_context(|| format!("{} is not valid JSON", path.display()))?;
    let Value::Object(body) = body else {
        anyhow::bail!("{} must hold a JSON object", path.display());
    };

    let mut request = PutIndexTemplateRequest::new(name);
    for (key, value) in body {
        match key.as_str() {
            "index_patterns" => {
                request.index_patterns = match value {
                    Value::String(pattern) => vec![pattern],
                    other => serde_json::from_value(other).context("index_patterns must be strings")?,
                }
            }
            "template" => {
                let pattern = value.as_str().context("template must be a string")?;
                request.index_patterns.push(pattern.to_string());
            }
            "order" => {
                let order = value.as_i64().context("order must be an integer")?;
                request.order = Some(i32::try_from(order)?);
            }
            "version" => request.version = Some(value.as_i64().context("version must be an integer")?),
            "settings" => request.settings = serde_json::from_value(value).context("settings must be an object")?,
            "mappings" => request.mappings = Some(value),
            "aliases" => request.aliases = serde_json::from_value(value).context("aliases must be an object")?,
            other => anyhow::bail!("unknown template field {}", other),
        }
    }

    if request.index_patterns.is_empty() {
        anyhow::bail!("template {} has no index_patterns", name);
    }
    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn file_with(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_template() {
        let file = file_with(
            r#"{
                "index_patterns": ["logs-*"],
                "order": 2,
                "version": 7,
                "settings": {"number_of_shards": 1},
                "mappings": {"properties": {"message": {"type": "text"}}},
                "aliases": {"logs": {}}
            }"#,
        );

        let request = load_template("logs", file.path()).unwrap();
        assert_eq!(request.name, "logs");
        assert_eq!(request.index_patterns, vec!["logs-*"]);
        assert_eq!(request.order, Some(2));
        assert_eq!(request.version, Some(7));
        assert_eq!(request.settings.get("number_of_shards"), Some(&json!(1)));
        assert_eq!(request.mappings, Some(json!({"properties": {"message": {"type": "text"}}})));
        assert!(request.aliases.contains_key("logs"));
    }

    #[test]
    fn test_legacy_template_pattern() {
        let file = file_with(r#"{"template": "old-*"}"#);
        let request = load_template("old", file.path()).unwrap();
        assert_eq!(request.index_patterns, vec!["old-*"]);
    }

    #[test]
    fn test_rejects_bad_templates() {
        let no_patterns = file_with(r#"{"order": 1}"#);
        assert!(load_template("t", no_patterns.path()).is_err());

        let unknown = file_with(r#"{"index_patterns": ["a-*"], "shards": 1}"#);
        let err = load_template("t", unknown.path()).unwrap_err();
        assert!(err.to_string().contains("unknown template field shards"));

        let not_object = file_with("[1, 2]");
        assert!(load_template("t", not_object.path()).is_err());
    }
}
