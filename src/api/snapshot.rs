use std::collections::BTreeMap;

use crate::model::{DocumentKey, FieldPath, Timestamp};
use crate::value::{DocstoreValue, MapValue};

use super::query::Query;

/// The state of a single document as returned by the backend.
#[derive(Clone, Debug)]
pub struct DocumentSnapshot {
    key: DocumentKey,
    data: Option<MapValue>,
}

impl DocumentSnapshot {
    pub fn new(key: DocumentKey, data: Option<MapValue>) -> Self {
        Self { key, data }
    }

    /// Whether the document exists on the backend.
    pub fn exists(&self) -> bool {
        self.data.is_some()
    }

    pub fn key(&self) -> &DocumentKey {
        &self.key
    }

    pub fn id(&self) -> &str {
        self.key.id()
    }

    /// The decoded document fields, when the document exists.
    pub fn data(&self) -> Option<&BTreeMap<String, DocstoreValue>> {
        self.data.as_ref().map(MapValue::fields)
    }

    pub fn map_value(&self) -> Option<&MapValue> {
        self.data.as_ref()
    }

    /// Reads a single field. The document-identity pseudo-field yields the
    /// document's own reference value.
    pub fn field(&self, field: &FieldPath) -> Option<DocstoreValue> {
        if field.is_document_id() {
            return Some(DocstoreValue::from_reference(
                self.key.path().canonical_string(),
            ));
        }
        self.data
            .as_ref()
            .and_then(|map| map.value_at(field.segments()))
            .cloned()
    }
}

/// The result of executing a query: the matching documents in stream order
/// plus the time the backend read them at.
#[derive(Clone, Debug)]
pub struct QuerySnapshot {
    query: Query,
    documents: Vec<DocumentSnapshot>,
    read_time: Timestamp,
}

impl QuerySnapshot {
    pub fn new(query: Query, documents: Vec<DocumentSnapshot>, read_time: Timestamp) -> Self {
        Self {
            query,
            documents,
            read_time,
        }
    }

    /// The query used to obtain this snapshot.
    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn documents(&self) -> &[DocumentSnapshot] {
        &self.documents
    }

    /// The time at which the backend served the result set.
    pub fn read_time(&self) -> Timestamp {
        self.read_time
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn into_documents(self) -> Vec<DocumentSnapshot> {
        self.documents
    }
}

impl IntoIterator for QuerySnapshot {
    type Item = DocumentSnapshot;
    type IntoIter = std::vec::IntoIter<DocumentSnapshot>;

    fn into_iter(self) -> Self::IntoIter {
        self.documents.into_iter()
    }
}
