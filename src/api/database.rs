use std::sync::Arc;

use crate::error::DocstoreResult;
use crate::model::{DatabaseId, ResourcePath};

use super::reference::{CollectionReference, DocumentReference};

/// Handle scoping references and queries to one database instance.
///
/// Cheap to clone; all state lives behind an `Arc`.
#[derive(Clone, Debug)]
pub struct Docstore {
    inner: Arc<DocstoreInner>,
}

#[derive(Debug)]
struct DocstoreInner {
    database_id: DatabaseId,
}

impl Docstore {
    pub fn new(database_id: DatabaseId) -> Self {
        Self {
            inner: Arc::new(DocstoreInner { database_id }),
        }
    }

    pub fn database_id(&self) -> &DatabaseId {
        &self.inner.database_id
    }

    /// Creates a `CollectionReference` pointing at `path`, interpreted
    /// relative to the database root (e.g. `"rooms/eros/messages"`).
    pub fn collection(&self, path: &str) -> DocstoreResult<CollectionReference> {
        let resource = ResourcePath::from_string(path)?;
        CollectionReference::new(self.inner.database_id.clone(), resource)
    }

    /// Creates a `DocumentReference` pointing at `path`. The path must hold
    /// an even number of segments (collection/document pairs).
    pub fn doc(&self, path: &str) -> DocstoreResult<DocumentReference> {
        let resource = ResourcePath::from_string(path)?;
        DocumentReference::new(self.inner.database_id.clone(), resource)
    }
}
