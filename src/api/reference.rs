use std::fmt::{Display, Formatter};

use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};

use crate::error::{invalid_argument, DocstoreResult};
use crate::model::{DatabaseId, DocumentKey, ResourcePath};

use super::query::Query;

const AUTO_ID_LENGTH: usize = 20;

/// A reference to a collection within a database.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CollectionReference {
    database: DatabaseId,
    path: ResourcePath,
}

impl CollectionReference {
    pub(crate) fn new(database: DatabaseId, path: ResourcePath) -> DocstoreResult<Self> {
        if path.is_empty() || path.len() % 2 == 0 {
            return Err(invalid_argument(format!(
                "'{}' does not name a collection (odd number of segments required)",
                path.canonical_string()
            )));
        }
        Ok(Self { database, path })
    }

    pub fn database(&self) -> &DatabaseId {
        &self.database
    }

    /// The full resource path of the collection (e.g. `rooms/eros/messages`).
    pub fn path(&self) -> &ResourcePath {
        &self.path
    }

    /// The last segment of the collection path.
    pub fn id(&self) -> &str {
        self.path
            .last_segment()
            .expect("Collection path always has an id segment")
    }

    /// The document that logically contains this collection, if any.
    pub fn parent(&self) -> Option<DocumentReference> {
        let parent = self.path.pop_last()?;
        if parent.is_empty() {
            return None;
        }
        DocumentReference::new(self.database.clone(), parent).ok()
    }

    /// Returns a reference to the document identified by `document_id`, or to
    /// a freshly auto-generated ID when `None`.
    pub fn doc(&self, document_id: Option<&str>) -> DocstoreResult<DocumentReference> {
        let id = document_id
            .map(str::to_string)
            .unwrap_or_else(generate_auto_id);
        if id.contains('/') {
            return Err(invalid_argument("Document ID cannot contain '/'."));
        }
        DocumentReference::new(self.database.clone(), self.path.child([id]))
    }

    /// Creates a query targeting this collection.
    pub fn query(&self) -> Query {
        Query::new(self.clone())
    }
}

impl Display for CollectionReference {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "CollectionReference({})", self.path.canonical_string())
    }
}

/// A reference to a single document within a database.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DocumentReference {
    database: DatabaseId,
    key: DocumentKey,
}

impl DocumentReference {
    pub(crate) fn new(database: DatabaseId, path: ResourcePath) -> DocstoreResult<Self> {
        Ok(Self {
            database,
            key: DocumentKey::from_path(path)?,
        })
    }

    pub fn database(&self) -> &DatabaseId {
        &self.database
    }

    /// The document identifier (the last segment of its path).
    pub fn id(&self) -> &str {
        self.key.id()
    }

    pub fn path(&self) -> &ResourcePath {
        self.key.path()
    }

    pub fn key(&self) -> &DocumentKey {
        &self.key
    }

    /// The collection containing this document.
    pub fn parent(&self) -> CollectionReference {
        CollectionReference::new(self.database.clone(), self.key.collection_path())
            .expect("Document parent path is always a collection")
    }

    /// Returns a reference to a subcollection rooted at this document.
    pub fn collection(&self, path: &str) -> DocstoreResult<CollectionReference> {
        let sub_path = ResourcePath::from_string(path)?;
        let full_path = self.key.path().child(sub_path.segments().to_vec());
        CollectionReference::new(self.database.clone(), full_path)
    }
}

impl Display for DocumentReference {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "DocumentReference({})",
            self.key.path().canonical_string()
        )
    }
}

impl From<&DocumentReference> for crate::value::DocstoreValue {
    fn from(reference: &DocumentReference) -> Self {
        crate::value::DocstoreValue::from_reference(reference.path().canonical_string())
    }
}

fn generate_auto_id() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .map(char::from)
        .take(AUTO_ID_LENGTH)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn database() -> DatabaseId {
        DatabaseId::default_database("test-project")
    }

    fn collection(path: &str) -> CollectionReference {
        CollectionReference::new(database(), ResourcePath::from_string(path).unwrap()).unwrap()
    }

    #[test]
    fn collection_and_document_roundtrip() {
        let rooms = collection("rooms");
        assert_eq!(rooms.id(), "rooms");
        let doc = rooms.doc(Some("eros")).unwrap();
        assert_eq!(doc.id(), "eros");
        assert_eq!(doc.parent(), rooms);
    }

    #[test]
    fn auto_id_generation() {
        let doc = collection("rooms").doc(None).unwrap();
        assert_eq!(doc.id().len(), AUTO_ID_LENGTH);
    }

    #[test]
    fn rejects_slash_in_document_id() {
        let err = collection("rooms").doc(Some("a/b")).unwrap_err();
        assert_eq!(err.code_str(), "docstore/invalid-argument");
    }

    #[test]
    fn rejects_document_path_as_collection() {
        let err = CollectionReference::new(
            database(),
            ResourcePath::from_string("rooms/eros").unwrap(),
        )
        .unwrap_err();
        assert_eq!(err.code_str(), "docstore/invalid-argument");
    }

    #[test]
    fn subcollection_navigation() {
        let doc = collection("rooms").doc(Some("eros")).unwrap();
        let messages = doc.collection("messages").unwrap();
        assert_eq!(messages.path().canonical_string(), "rooms/eros/messages");
        assert_eq!(messages.parent(), Some(doc));
    }
}
