use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::api::{DocumentSnapshot, Query};
use crate::error::DocstoreResult;
use crate::model::Timestamp;

pub mod in_memory;

/// One frame of a `run_query` response stream.
///
/// A frame without a document is a heartbeat: it contributes no result but
/// may still carry the read time.
#[derive(Clone, Debug)]
pub struct RunQueryItem {
    pub document: Option<DocumentSnapshot>,
    pub read_time: Option<Timestamp>,
}

pub type RunQueryStream = BoxStream<'static, DocstoreResult<RunQueryItem>>;

/// The transport boundary of the client.
#[async_trait]
pub trait Datastore: Send + Sync + 'static {
    /// Executes `query` and returns the response frames as a stream.
    ///
    /// Every call issues an independent request: the stream is cold, consumed
    /// at most once, and dropping it cancels the underlying request. A
    /// caller-initiated cancellation surfaces as a `docstore/cancelled` error
    /// frame, never as a silently truncated result.
    async fn run_query(
        &self,
        query: &Query,
        transaction_id: Option<Vec<u8>>,
    ) -> DocstoreResult<RunQueryStream>;
}

pub use in_memory::InMemoryDatastore;
