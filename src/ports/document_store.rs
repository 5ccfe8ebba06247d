//! Document store collaborator contract.
//!
//! The store holds named collections of JSON documents keyed by opaque
//! identifiers. It offers simple equality and array-membership filters, a
//! per-document set/delete, and an atomic batch write.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;
use thiserror::Error;

/// Field map of a stored document.
pub type Fields = Map<String, Value>;

/// Result type for document store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// A document read from a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Document key within its collection.
    pub id: String,
    /// Stored fields, excluding the key.
    pub fields: Fields,
}

impl Document {
    /// Creates a document from its key and fields.
    #[must_use]
    pub fn new(id: impl Into<String>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }
}

/// Query predicate; multiple filters are combined with AND.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// Field equals the value.
    Eq(String, Value),
    /// Field is an array containing the value.
    ArrayContains(String, Value),
}

impl Filter {
    /// Builds an equality filter.
    #[must_use]
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Eq(field.into(), value.into())
    }

    /// Builds an array-membership filter.
    #[must_use]
    pub fn array_contains(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::ArrayContains(field.into(), value.into())
    }

    /// Returns `true` when `fields` satisfy this predicate.
    #[must_use]
    pub fn matches(&self, fields: &Fields) -> bool {
        match self {
            Self::Eq(field, expected) => fields.get(field).is_some_and(|value| value == expected),
            Self::ArrayContains(field, expected) => fields
                .get(field)
                .and_then(Value::as_array)
                .is_some_and(|items| items.contains(expected)),
        }
    }
}

/// One write inside a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
    /// Create or overwrite a document.
    Set {
        /// Target collection.
        collection: String,
        /// Document key.
        id: String,
        /// Full replacement fields.
        fields: Fields,
    },
    /// Remove a document; absent documents are ignored.
    Delete {
        /// Target collection.
        collection: String,
        /// Document key.
        id: String,
    },
}

impl WriteOp {
    /// Returns the collection the write targets.
    #[must_use]
    pub fn collection(&self) -> &str {
        match self {
            Self::Set { collection, .. } | Self::Delete { collection, .. } => collection,
        }
    }
}

/// Document store contract.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Generates a fresh document key for `collection`.
    fn new_document_id(&self, collection: &str) -> String;

    /// Returns every document in the collection.
    async fn stream_all(&self, collection: &str) -> StoreResult<Vec<Document>>;

    /// Returns the documents matching all `filters`.
    async fn query(&self, collection: &str, filters: &[Filter]) -> StoreResult<Vec<Document>>;

    /// Fetches one document by key.
    ///
    /// Returns `None` when the document does not exist.
    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Document>>;

    /// Creates or overwrites one document.
    async fn set(&self, collection: &str, id: &str, fields: Fields) -> StoreResult<()>;

    /// Deletes one document; deleting an absent document succeeds.
    async fn delete(&self, collection: &str, id: &str) -> StoreResult<()>;

    /// Applies all writes atomically: either every write lands or none does.
    async fn batch_write(&self, writes: Vec<WriteOp>) -> StoreResult<()>;
}

/// Errors returned by document store implementations.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The store could not be reached or refused the request.
    #[error("document store unavailable: {0}")]
    Unavailable(String),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
