use serde::{Deserialize, Serialize};
use std::fmt;

/// A document id, either textual or numeric
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Id {
    Number(i64),
    Text(String),
}

impl Id {
    pub fn is_empty(&self) -> bool {
        matches!(self, Id::Text(s) if s.trim().is_empty())
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Id::Number(n) => write!(f, "{}", n),
            Id::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Id {
    fn from(id: &str) -> Self {
        Id::Text(id.to_string())
    }
}

impl From<String> for Id {
    fn from(id: String) -> Self {
        Id::Text(id)
    }
}

impl From<&String> for Id {
    fn from(id: &String) -> Self {
        Id::Text(id.clone())
    }
}

impl From<i64> for Id {
    fn from(id: i64) -> Self {
        Id::Number(id)
    }
}

impl From<u32> for Id {
    fn from(id: u32) -> Self {
        Id::Number(i64::from(id))
    }
}
