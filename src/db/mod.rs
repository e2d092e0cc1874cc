//! MongoDB access layer

pub mod mongo;
pub mod schemas;

pub use mongo::{redact_uri, IntoIndexes, MongoClient, MongoCollection, MutMetadata};
