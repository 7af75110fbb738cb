//! Request bodies and their wire encoding

use crate::error::Result;
use crate::settings::ConnectionSettings;
use serde::Serialize;
use serde_json::Value;

/// Body of a request before it is written to the wire
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PostData {
    #[default]
    Empty,
    Bytes(Vec<u8>),
    String(String),
    /// A single JSON document
    Json(Value),
    /// Newline delimited JSON, one compact document per line
    MultiJson(Vec<Value>),
}

impl PostData {
    pub fn json<T: Serialize>(value: &T) -> Result<Self> {
        Ok(PostData::Json(serde_json::to_value(value)?))
    }

    pub fn multi_json<T: Serialize>(items: &[T]) -> Result<Self> {
        let values: std::result::Result<Vec<Value>, _> =
            items.iter().map(serde_json::to_value).collect();
        Ok(PostData::MultiJson(values?))
    }

    pub fn is_empty(&self) -> bool {
        match self {
            PostData::Empty => true,
            PostData::Bytes(b) => b.is_empty(),
            PostData::String(s) => s.is_empty(),
            PostData::Json(_) => false,
            PostData::MultiJson(items) => items.is_empty(),
        }
    }

    pub fn is_multi_json(&self) -> bool {
        matches!(self, PostData::MultiJson(_))
    }

    /// Content type sent along with the body
    pub fn content_type(&self) -> &'static str {
        match self {
            PostData::MultiJson(_) => "application/x-ndjson",
            _ => "application/json",
        }
    }

    /// Encode the body exactly as it is sent
    pub fn write(&self, settings: &ConnectionSettings) -> Result<Vec<u8>> {
        let bytes = match self {
            PostData::Empty => Vec::new(),
            PostData::Bytes(bytes) => bytes.clone(),
            PostData::String(s) => s.as_bytes().to_vec(),
            PostData::Json(value) if settings.pretty_json => serde_json::to_vec_pretty(value)?,
            PostData::Json(value) => serde_json::to_vec(value)?,
            PostData::MultiJson(items) => {
                let mut out = Vec::new();
                for item in items {
                    serde_json::to_writer(&mut out, item)?;
                    out.push(b'\n');
                }
                out
            }
        };
        Ok(bytes)
    }
}

impl From<Value> for PostData {
    fn from(value: Value) -> Self {
        PostData::Json(value)
    }
}

impl From<String> for PostData {
    fn from(body: String) -> Self {
        PostData::String(body)
    }
}

impl From<&str> for PostData {
    fn from(body: &str) -> Self {
        PostData::String(body.to_string())
    }
}

impl From<Vec<u8>> for PostData {
    fn from(body: Vec<u8>) -> Self {
        PostData::Bytes(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_multi_json_lines_are_compact_and_terminated() {
        let body = PostData::MultiJson(vec![
            json!({"index": {"_index": "myIndex", "_type": "myDocumentType"}}),
            json!({"message": "My message", "nested": {"a": [1, 2]}}),
        ]);

        let written = String::from_utf8(body.write(&ConnectionSettings::default()).unwrap()).unwrap();
        let lines: Vec<&str> = written.split_terminator('\n').collect();
        assert_eq!(lines.len(), 2);
        assert!(written.ends_with('\n'));
        assert_eq!(lines[1], r#"{"message":"My message","nested":{"a":[1,2]}}"#);
        assert_eq!(
            serde_json::from_str::<Value>(lines[0]).unwrap(),
            json!({"index": {"_index": "myIndex", "_type": "myDocumentType"}})
        );
    }

    #[test]
    fn test_multi_json_ignores_pretty_setting() {
        let body = PostData::MultiJson(vec![json!({"a": {"b": 1}})]);
        let written = body.write(&ConnectionSettings::default().pretty_json()).unwrap();
        assert_eq!(written, b"{\"a\":{\"b\":1}}\n".to_vec());
    }

    #[test]
    fn test_json_pretty_when_requested() {
        let body = PostData::Json(json!({"a": 1}));
        let compact = body.write(&ConnectionSettings::default()).unwrap();
        let pretty = body.write(&ConnectionSettings::default().pretty_json()).unwrap();
        assert_eq!(compact, b"{\"a\":1}".to_vec());
        assert!(String::from_utf8(pretty).unwrap().contains('\n'));
    }

    #[test]
    fn test_content_type() {
        assert_eq!(PostData::MultiJson(vec![]).content_type(), "application/x-ndjson");
        assert_eq!(PostData::Json(json!({})).content_type(), "application/json");
    }
}
