//! Identifier inference
//!
//! Index names, type names and ids can be given explicitly or derived from a
//! Rust document type. The [`Inferrer`] resolves them against the connection
//! settings into the strings that end up in request paths and bodies.

mod id;
mod index_name;
mod indices;
mod type_name;

pub use id::Id;
pub use index_name::IndexName;
pub use indices::{Indices, Types};
pub use type_name::TypeName;

use crate::error::{ElasticError, Result};
use crate::settings::ConnectionSettings;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// A Rust type stored as an Elasticsearch document
pub trait Document {
    /// Name used for index and type inference
    const TYPE_NAME: &'static str;

    /// Id of this instance, if it carries one
    fn id(&self) -> Option<Id> {
        None
    }
}

/// Identity of a [`Document`] type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentType {
    name: &'static str,
}

impl DocumentType {
    pub fn of<T: Document>() -> Self {
        Self { name: T::TYPE_NAME }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Resolves logical identifiers into wire strings
#[derive(Debug, Clone)]
pub struct Inferrer {
    settings: Arc<ConnectionSettings>,
}

impl Inferrer {
    pub fn new(settings: Arc<ConnectionSettings>) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ConnectionSettings {
        &self.settings
    }

    /// Resolve a single index name, cluster prefix included
    pub fn index_name(&self, index: &IndexName) -> Result<String> {
        let resolved = match (index.name().filter(|n| !n.is_empty()), index.doc_type()) {
            (Some(name), _) => name.to_string(),
            (None, Some(doc_type)) => self.index_for_type(doc_type)?,
            (None, None) => {
                return Err(ElasticError::Inference(
                    "Index name is empty and no document type was given".to_string(),
                ))
            }
        };

        if resolved.chars().any(char::is_uppercase) {
            return Err(ElasticError::Inference(format!(
                "Index names cannot contain uppercase characters: {}",
                resolved
            )));
        }

        Ok(index.prefix_cluster(&resolved))
    }

    fn index_for_type(&self, doc_type: DocumentType) -> Result<String> {
        if let Some(index) = self
            .settings
            .mapping_for(doc_type.name())
            .and_then(|m| m.index_name.clone())
        {
            return Ok(index);
        }

        self.settings.default_index.clone().ok_or_else(|| {
            ElasticError::Inference(format!(
                "Index name is null for the given type {} and no default index is set. \
                 Map an index name using ConnectionSettings::default_mapping_for() \
                 or set a default index using ConnectionSettings::default_index()",
                doc_type
            ))
        })
    }

    /// Resolve a list of indices into one comma separated path segment
    pub fn indices(&self, indices: &Indices) -> Result<String> {
        match indices {
            Indices::All => Ok("_all".to_string()),
            Indices::Many(names) if names.is_empty() => Ok("_all".to_string()),
            Indices::Many(names) => {
                let mut seen = HashSet::new();
                let mut resolved = Vec::with_capacity(names.len());
                for name in names {
                    let name = self.index_name(name)?;
                    if seen.insert(name.clone()) {
                        resolved.push(name);
                    }
                }
                Ok(resolved.join(","))
            }
        }
    }

    /// Resolve a mapping type name
    pub fn type_name(&self, type_name: &TypeName) -> Result<String> {
        if let Some(name) = type_name.name() {
            return Ok(name.to_string());
        }

        let doc_type = type_name.doc_type().ok_or_else(|| {
            ElasticError::Inference("Type name is empty and no document type was given".to_string())
        })?;

        if let Some(name) = self
            .settings
            .mapping_for(doc_type.name())
            .and_then(|m| m.type_name.clone())
        {
            return Ok(name);
        }

        if let Some(default) = &self.settings.default_type_name {
            return Ok(default.clone());
        }

        Ok(doc_type.name().to_lowercase())
    }

    /// Resolve a list of types into one comma separated path segment
    pub fn types(&self, types: &Types) -> Result<Option<String>> {
        match types {
            Types::All => Ok(None),
            Types::Many(names) if names.is_empty() => Ok(None),
            Types::Many(names) => {
                let resolved: Result<Vec<String>> =
                    names.iter().map(|t| self.type_name(t)).collect();
                Ok(Some(resolved?.join(",")))
            }
        }
    }

    pub fn id(&self, id: &Id) -> Result<String> {
        if id.is_empty() {
            return Err(ElasticError::Inference("Document id is empty".to_string()));
        }
        Ok(id.to_string())
    }

    /// Id carried by a document instance
    pub fn document_id<T: Document>(&self, document: &T) -> Option<String> {
        document.id().filter(|id| !id.is_empty()).map(|id| id.to_string())
    }
}
