use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::StreamExt;

use crate::api::{DocumentSnapshot, Query};
use crate::error::{internal_error, DocstoreResult};
use crate::model::{DocumentKey, Timestamp};
use crate::value::MapValue;

use super::{Datastore, RunQueryItem, RunQueryStream};

/// A datastore that serves documents from process memory.
///
/// Useful for tests and demos where no backend is available. It answers a
/// query with the target collection's documents in key order after an initial
/// read-time frame; predicate, ordering, and cursor evaluation belong to the
/// real backend and are not reproduced here.
#[derive(Clone, Default)]
pub struct InMemoryDatastore {
    documents: Arc<Mutex<BTreeMap<String, MapValue>>>,
}

impl InMemoryDatastore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_document(&self, key: &DocumentKey, data: MapValue) {
        let mut store = self.documents.lock().unwrap();
        store.insert(key.path().canonical_string(), data);
    }

    pub fn remove_document(&self, key: &DocumentKey) {
        let mut store = self.documents.lock().unwrap();
        store.remove(&key.path().canonical_string());
    }
}

#[async_trait]
impl Datastore for InMemoryDatastore {
    async fn run_query(
        &self,
        query: &Query,
        _transaction_id: Option<Vec<u8>>,
    ) -> DocstoreResult<RunQueryStream> {
        let store = self.documents.lock().unwrap();

        let mut items = vec![RunQueryItem {
            document: None,
            read_time: Some(Timestamp::now()),
        }];
        for (path, data) in store.iter() {
            let key = DocumentKey::from_string(path)
                .map_err(|err| internal_error(format!("Malformed stored path: {err}")))?;
            if key.collection_path() != *query.collection().path() {
                continue;
            }
            items.push(RunQueryItem {
                document: Some(DocumentSnapshot::new(key, Some(data.clone()))),
                read_time: None,
            });
        }

        Ok(futures::stream::iter(items.into_iter().map(Ok)).boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Docstore;
    use crate::model::DatabaseId;
    use crate::value::DocstoreValue;

    fn seeded() -> (InMemoryDatastore, Query) {
        let datastore = InMemoryDatastore::new();
        for id in ["alpha", "beta"] {
            let key = DocumentKey::from_string(&format!("rooms/{id}")).unwrap();
            let mut fields = BTreeMap::new();
            fields.insert("name".to_string(), DocstoreValue::from_string(id));
            datastore.insert_document(&key, MapValue::new(fields));
        }
        let key = DocumentKey::from_string("lobbies/other").unwrap();
        datastore.insert_document(&key, MapValue::new(BTreeMap::new()));

        let query = Docstore::new(DatabaseId::default_database("test-project"))
            .collection("rooms")
            .unwrap()
            .query();
        (datastore, query)
    }

    #[tokio::test]
    async fn serves_only_the_target_collection() {
        let (datastore, query) = seeded();
        let mut stream = datastore.run_query(&query, None).await.unwrap();

        let first = stream.next().await.unwrap().unwrap();
        assert!(first.document.is_none());
        assert!(first.read_time.is_some());

        let mut ids = Vec::new();
        while let Some(item) = stream.next().await {
            let item = item.unwrap();
            ids.push(item.document.unwrap().id().to_string());
        }
        assert_eq!(ids, ["alpha", "beta"]);
    }

    #[tokio::test]
    async fn each_call_yields_a_fresh_stream() {
        let (datastore, query) = seeded();
        let first: Vec<_> = datastore
            .run_query(&query, None)
            .await
            .unwrap()
            .collect()
            .await;
        let second: Vec<_> = datastore
            .run_query(&query, None)
            .await
            .unwrap()
            .collect()
            .await;
        assert_eq!(first.len(), second.len());
    }
}
