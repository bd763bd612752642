use std::sync::Arc;

use futures::StreamExt;

use crate::error::{missing_read_timestamp, DocstoreResult};
use crate::model::Timestamp;
use crate::remote::datastore::{Datastore, InMemoryDatastore};

use super::database::Docstore;
use super::query::Query;
use super::snapshot::QuerySnapshot;

/// Executes queries against a datastore and assembles the results.
#[derive(Clone)]
pub struct DocstoreClient {
    docstore: Docstore,
    datastore: Arc<dyn Datastore>,
}

impl DocstoreClient {
    /// Creates a client backed by the supplied datastore implementation.
    pub fn new(docstore: Docstore, datastore: Arc<dyn Datastore>) -> Self {
        Self {
            docstore,
            datastore,
        }
    }

    /// Returns a client that serves documents from process memory only.
    pub fn with_in_memory(docstore: Docstore) -> Self {
        Self::new(docstore, Arc::new(InMemoryDatastore::new()))
    }

    pub fn docstore(&self) -> &Docstore {
        &self.docstore
    }

    /// Executes `query` and folds the response stream into a snapshot.
    pub async fn get_docs(&self, query: &Query) -> DocstoreResult<QuerySnapshot> {
        self.get_docs_in_transaction(query, None).await
    }

    /// Like [`get_docs`](Self::get_docs), reading inside the transaction
    /// identified by `transaction_id`.
    ///
    /// The snapshot's read time is the first one reported anywhere in the
    /// stream. Frames without a document (heartbeats) contribute no result
    /// but may carry that read time. A stream that completes without ever
    /// reporting a read time is a protocol violation and fails the call.
    pub async fn get_docs_in_transaction(
        &self,
        query: &Query,
        transaction_id: Option<Vec<u8>>,
    ) -> DocstoreResult<QuerySnapshot> {
        let mut stream = self.datastore.run_query(query, transaction_id).await?;

        let mut read_time: Option<Timestamp> = None;
        let mut documents = Vec::new();
        while let Some(item) = stream.next().await {
            let item = item?;
            if read_time.is_none() {
                read_time = item.read_time;
            }
            match item.document {
                Some(document) => documents.push(document),
                None => log::debug!(
                    "run_query heartbeat for '{}' carried no document",
                    query.collection_id()
                ),
            }
        }

        let read_time = read_time.ok_or_else(|| {
            missing_read_timestamp("Query stream completed without reporting a read time")
        })?;
        Ok(QuerySnapshot::new(query.clone(), documents, read_time))
    }
}
