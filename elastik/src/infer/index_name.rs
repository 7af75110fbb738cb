use super::{Document, DocumentType, Indices};
use std::fmt;
use std::hash::{Hash, Hasher};

const CLUSTER_SEPARATOR: char = ':';

/// A logical reference to an index: an explicit name, a name derived from a
/// document type, either optionally qualified with a remote cluster.
#[derive(Debug, Clone)]
pub struct IndexName {
    name: Option<String>,
    doc_type: Option<DocumentType>,
    cluster: Option<String>,
}

impl IndexName {
    /// Parse `name` or `cluster:name`. Blank input yields `None`.
    pub fn parse(index: &str) -> Option<Self> {
        if index.trim().is_empty() {
            return None;
        }
        Some(Self::split(index))
    }

    fn split(index: &str) -> Self {
        let tokens: Vec<&str> = index
            .splitn(2, CLUSTER_SEPARATOR)
            .filter(|t| !t.is_empty())
            .collect();

        match tokens.as_slice() {
            [cluster, name] => Self::named(name, Some(cluster)),
            [name] => Self::named(name, None),
            _ => Self::named("", None),
        }
    }

    fn named(name: &str, cluster: Option<&str>) -> Self {
        Self {
            name: Some(name.trim().to_string()),
            doc_type: None,
            cluster: cluster.map(|c| c.trim().to_string()),
        }
    }

    /// Index name inferred from the document type `T`
    pub fn of<T: Document>() -> Self {
        Self::from(DocumentType::of::<T>())
    }

    /// Index name inferred from `T` on a remote cluster
    pub fn of_in<T: Document>(cluster: &str) -> Self {
        Self {
            name: None,
            doc_type: Some(DocumentType::of::<T>()),
            cluster: Some(cluster.trim().to_string()),
        }
    }

    /// Rebuild an index name from its parts, keeping the name verbatim
    pub fn rebuild(
        name: impl Into<String>,
        doc_type: Option<DocumentType>,
        cluster: Option<&str>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            doc_type,
            cluster: cluster.map(|c| c.trim().to_string()),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn doc_type(&self) -> Option<DocumentType> {
        self.doc_type
    }

    pub fn cluster(&self) -> Option<&str> {
        self.cluster.as_deref()
    }

    fn has_name(&self) -> bool {
        self.name.as_deref().map_or(false, |n| !n.is_empty())
    }

    /// `cluster:name` when a cluster is set, `name` otherwise
    pub(crate) fn prefix_cluster(&self, name: &str) -> String {
        match self.cluster.as_deref() {
            Some(cluster) if !cluster.is_empty() => format!("{}{}{}", cluster, CLUSTER_SEPARATOR, name),
            _ => name.to_string(),
        }
    }

    pub fn and(self, other: impl Into<IndexName>) -> Indices {
        Indices::Many(vec![self, other.into()])
    }

    pub fn and_of<T: Document>(self) -> Indices {
        self.and(IndexName::of::<T>())
    }

    pub fn and_of_in<T: Document>(self, cluster: &str) -> Indices {
        self.and(IndexName::of_in::<T>(cluster))
    }
}

impl fmt::Display for IndexName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.name, self.doc_type) {
            (Some(name), _) if !name.is_empty() => f.write_str(&self.prefix_cluster(name)),
            (_, Some(doc_type)) => f.write_str(&self.prefix_cluster(doc_type.name())),
            _ => Ok(()),
        }
    }
}

impl PartialEq for IndexName {
    fn eq(&self, other: &Self) -> bool {
        if self.has_name() && other.has_name() {
            let mine = self.prefix_cluster(self.name.as_deref().unwrap_or_default());
            let theirs = other.prefix_cluster(other.name.as_deref().unwrap_or_default());
            return mine == theirs;
        }
        if self.has_name() || other.has_name() {
            return false;
        }
        match (self.doc_type, other.doc_type) {
            (Some(a), Some(b)) => a == b && self.cluster == other.cluster,
            _ => false,
        }
    }
}

impl Eq for IndexName {}

impl PartialEq<str> for IndexName {
    fn eq(&self, other: &str) -> bool {
        !other.is_empty()
            && self.has_name()
            && self.prefix_cluster(self.name.as_deref().unwrap_or_default()) == other
    }
}

impl PartialEq<&str> for IndexName {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

impl Hash for IndexName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        if self.has_name() {
            0u8.hash(state);
            self.prefix_cluster(self.name.as_deref().unwrap_or_default())
                .hash(state);
        } else {
            1u8.hash(state);
            self.doc_type.hash(state);
            self.cluster.hash(state);
        }
    }
}

impl From<&str> for IndexName {
    fn from(index: &str) -> Self {
        Self::split(index)
    }
}

impl From<String> for IndexName {
    fn from(index: String) -> Self {
        Self::split(&index)
    }
}

impl From<&String> for IndexName {
    fn from(index: &String) -> Self {
        Self::split(index)
    }
}

impl From<DocumentType> for IndexName {
    fn from(doc_type: DocumentType) -> Self {
        Self {
            name: None,
            doc_type: Some(doc_type),
            cluster: None,
        }
    }
}
