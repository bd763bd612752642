use std::fmt::{Display, Formatter};

use crate::error::{invalid_argument, DocstoreResult};
use crate::model::ResourcePath;

/// A validated path to a single document.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DocumentKey {
    path: ResourcePath,
}

impl DocumentKey {
    pub fn from_path(path: ResourcePath) -> DocstoreResult<Self> {
        if path.len() < 2 || path.len() % 2 != 0 {
            return Err(invalid_argument(format!(
                "'{}' does not name a document (even number of segments required)",
                path.canonical_string()
            )));
        }
        Ok(Self { path })
    }

    pub fn from_string(path: &str) -> DocstoreResult<Self> {
        Self::from_path(ResourcePath::from_string(path)?)
    }

    /// The collection that directly contains this document.
    pub fn collection_path(&self) -> ResourcePath {
        self.path.without_last()
    }

    pub fn path(&self) -> &ResourcePath {
        &self.path
    }

    pub fn id(&self) -> &str {
        self.path
            .last_segment()
            .expect("DocumentKey path always has an id segment")
    }
}

impl Display for DocumentKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path.canonical_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_collection_paths() {
        let err = DocumentKey::from_string("rooms").unwrap_err();
        assert_eq!(err.code_str(), "docstore/invalid-argument");
    }

    #[test]
    fn parses_document_paths() {
        let key = DocumentKey::from_string("rooms/eros").unwrap();
        assert_eq!(key.id(), "eros");
        assert_eq!(key.collection_path().canonical_string(), "rooms");
    }
}
