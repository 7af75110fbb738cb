use super::{Document, IndexName, TypeName};

/// One or more indices, or every index (`_all`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Indices {
    All,
    Many(Vec<IndexName>),
}

impl Indices {
    pub fn all() -> Self {
        Indices::All
    }

    pub fn index(index: impl Into<IndexName>) -> Self {
        Indices::Many(vec![index.into()])
    }

    pub fn of<T: Document>() -> Self {
        Indices::Many(vec![IndexName::of::<T>()])
    }

    /// Parse a comma separated list; `_all` and `*` on their own mean every index
    pub fn parse(indices: &str) -> Self {
        let trimmed = indices.trim();
        if trimmed.is_empty() || trimmed == "_all" || trimmed == "*" {
            return Indices::All;
        }
        Indices::Many(trimmed.split(',').filter_map(IndexName::parse).collect())
    }

    pub fn and(self, other: impl Into<IndexName>) -> Self {
        match self {
            Indices::All => Indices::All,
            Indices::Many(mut names) => {
                names.push(other.into());
                Indices::Many(names)
            }
        }
    }

    pub fn and_of<T: Document>(self) -> Self {
        self.and(IndexName::of::<T>())
    }

    pub fn and_of_in<T: Document>(self, cluster: &str) -> Self {
        self.and(IndexName::of_in::<T>(cluster))
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Indices::All)
    }
}

impl Default for Indices {
    fn default() -> Self {
        Indices::All
    }
}

impl From<IndexName> for Indices {
    fn from(index: IndexName) -> Self {
        Indices::Many(vec![index])
    }
}

impl From<&str> for Indices {
    fn from(indices: &str) -> Self {
        Indices::parse(indices)
    }
}

impl From<String> for Indices {
    fn from(indices: String) -> Self {
        Indices::parse(&indices)
    }
}

impl From<Vec<IndexName>> for Indices {
    fn from(names: Vec<IndexName>) -> Self {
        Indices::Many(names)
    }
}

impl<const N: usize> From<[&str; N]> for Indices {
    fn from(names: [&str; N]) -> Self {
        Indices::Many(names.iter().filter_map(|n| IndexName::parse(n)).collect())
    }
}

/// One or more document types, or every type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Types {
    All,
    Many(Vec<TypeName>),
}

impl Types {
    pub fn all() -> Self {
        Types::All
    }

    pub fn of<T: Document>() -> Self {
        Types::Many(vec![TypeName::of::<T>()])
    }

    pub fn and(self, other: impl Into<TypeName>) -> Self {
        match self {
            Types::All => Types::All,
            Types::Many(mut names) => {
                names.push(other.into());
                Types::Many(names)
            }
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Types::All)
    }
}

impl Default for Types {
    fn default() -> Self {
        Types::All
    }
}

impl From<TypeName> for Types {
    fn from(name: TypeName) -> Self {
        Types::Many(vec![name])
    }
}

impl From<&str> for Types {
    fn from(types: &str) -> Self {
        let trimmed = types.trim();
        if trimmed.is_empty() || trimmed == "_all" {
            return Types::All;
        }
        Types::Many(
            trimmed
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(TypeName::from)
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all() {
        assert!(Indices::parse("_all").is_all());
        assert!(Indices::parse("*").is_all());
        assert!(Indices::parse("").is_all());
    }

    #[test]
    fn test_parse_list_skips_blank_entries() {
        let indices = Indices::parse("a, ,b");
        assert_eq!(
            indices,
            Indices::Many(vec![IndexName::from("a"), IndexName::from("b")])
        );
    }

    #[test]
    fn test_and_on_all_stays_all() {
        assert!(Indices::All.and("a").is_all());
    }

    #[test]
    fn test_types_from_str() {
        assert!(Types::from("_all").is_all());
        assert_eq!(
            Types::from("doc,commit"),
            Types::Many(vec![TypeName::from("doc"), TypeName::from("commit")])
        );
    }
}
