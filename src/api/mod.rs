mod client;
mod database;
mod filter;
mod query;
mod reference;
mod snapshot;

pub use client::DocstoreClient;
pub use database::Docstore;
pub use filter::{ComparisonFilter, FilterOperator, QueryFilter, UnaryFilter, UnaryOperator};
pub use query::{Bound, OrderBy, OrderDirection, Query};
pub use reference::{CollectionReference, DocumentReference};
pub use snapshot::{DocumentSnapshot, QuerySnapshot};
