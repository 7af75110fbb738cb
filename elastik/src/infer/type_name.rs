use super::{Document, DocumentType};
use std::fmt;

/// A logical reference to a mapping type: an explicit name or one derived
/// from a document type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeName {
    name: Option<String>,
    doc_type: Option<DocumentType>,
}

impl TypeName {
    pub fn of<T: Document>() -> Self {
        Self::from(DocumentType::of::<T>())
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref().filter(|n| !n.is_empty())
    }

    pub fn doc_type(&self) -> Option<DocumentType> {
        self.doc_type
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.name(), self.doc_type) {
            (Some(name), _) => f.write_str(name),
            (None, Some(doc_type)) => f.write_str(doc_type.name()),
            _ => Ok(()),
        }
    }
}

impl From<&str> for TypeName {
    fn from(name: &str) -> Self {
        Self {
            name: Some(name.trim().to_string()),
            doc_type: None,
        }
    }
}

impl From<String> for TypeName {
    fn from(name: String) -> Self {
        Self::from(name.as_str())
    }
}

impl From<DocumentType> for TypeName {
    fn from(doc_type: DocumentType) -> Self {
        Self {
            name: None,
            doc_type: Some(doc_type),
        }
    }
}
