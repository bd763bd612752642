pub mod datastore;
pub mod serializer;
pub mod structured_query;

pub use datastore::{Datastore, InMemoryDatastore, RunQueryItem, RunQueryStream};
pub use serializer::JsonProtoSerializer;
pub use structured_query::encode_structured_query;
