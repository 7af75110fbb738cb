use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// `GET /_template/{name}`: template name to template body
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GetIndexTemplateResponse {
    pub template_mappings: HashMap<String, TemplateMapping>,
}

impl GetIndexTemplateResponse {
    pub fn get(&self, name: &str) -> Option<&TemplateMapping> {
        self.template_mappings.get(name)
    }

    pub fn len(&self) -> usize {
        self.template_mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.template_mappings.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateMapping {
    /// Pre 6.0 single pattern
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub index_patterns: Vec<String>,
    #[serde(default)]
    pub order: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<i64>,
    #[serde(default)]
    pub settings: HashMap<String, Value>,
    #[serde(default)]
    pub mappings: Value,
    #[serde(default)]
    pub aliases: HashMap<String, Value>,
}

impl TemplateMapping {
    /// `index.number_of_shards`, in flat or nested form
    pub fn number_of_shards(&self) -> Option<u32> {
        let value = self
            .settings
            .get("index.number_of_shards")
            .or_else(|| self.settings.get("number_of_shards"))
            .or_else(|| {
                self.settings
                    .get("index")
                    .and_then(|index| index.get("number_of_shards"))
            })?;

        match value {
            Value::String(s) => s.parse().ok(),
            Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
            _ => None,
        }
    }

    /// Every pattern the template applies to
    pub fn patterns(&self) -> Vec<&str> {
        let mut patterns: Vec<&str> = self.index_patterns.iter().map(String::as_str).collect();
        if let Some(template) = &self.template {
            patterns.push(template);
        }
        patterns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_response_shapes() {
        let json = r#"{
            "my-template": {
                "order": 0,
                "version": 1,
                "index_patterns": ["nestx-*"],
                "settings": {"index": {"number_of_shards": "2"}},
                "mappings": {},
                "aliases": {}
            },
            "legacy": {
                "template": "old-*",
                "settings": {"index.number_of_shards": 3},
                "mappings": {}
            }
        }"#;
        let response: GetIndexTemplateResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.len(), 2);

        let mapping = response.get("my-template").unwrap();
        assert_eq!(mapping.version, Some(1));
        assert_eq!(mapping.number_of_shards(), Some(2));
        assert_eq!(mapping.patterns(), vec!["nestx-*"]);

        let legacy = response.get("legacy").unwrap();
        assert_eq!(legacy.number_of_shards(), Some(3));
        assert_eq!(legacy.patterns(), vec!["old-*"]);
    }
}
