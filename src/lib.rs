//! Client-side core for the Docstore document database.
//!
//! The crate builds canonical, immutable query descriptors through a fluent
//! builder, resolves pagination cursors (from explicit values or prior result
//! documents), lowers queries to their JSON wire form, and folds a
//! transport-provided response stream into a result snapshot. Query execution
//! itself happens behind the [`remote::Datastore`] trait.

pub mod api;
pub mod error;
pub mod model;
pub mod remote;
pub mod value;

pub use api::{
    Bound, CollectionReference, Docstore, DocstoreClient, DocumentReference, DocumentSnapshot,
    FilterOperator, OrderBy, OrderDirection, Query, QueryFilter, QuerySnapshot, UnaryOperator,
};
pub use error::{DocstoreError, DocstoreErrorCode, DocstoreResult};
