//! In-memory document store for tests and embedded use.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

use crate::ports::{Document, DocumentStore, Fields, Filter, StoreError, StoreResult, WriteOp};

/// Thread-safe in-memory document store.
///
/// Documents are listed in insertion order. Overwriting a document keeps its
/// original position.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDocumentStore {
    state: Arc<RwLock<InMemoryStoreState>>,
}

#[derive(Debug, Default)]
struct InMemoryStoreState {
    collections: HashMap<String, StoredCollection>,
    next_sequence: u64,
}

#[derive(Debug, Default)]
struct StoredCollection {
    documents: HashMap<String, StoredDocument>,
}

#[derive(Debug)]
struct StoredDocument {
    sequence: u64,
    fields: Fields,
}

impl InMemoryDocumentStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl InMemoryStoreState {
    fn set(&mut self, collection: &str, id: &str, fields: Fields) {
        let sequence = self.next_sequence;
        let documents = &mut self
            .collections
            .entry(collection.to_owned())
            .or_default()
            .documents;
        if let Some(existing) = documents.get_mut(id) {
            existing.fields = fields;
            return;
        }
        documents.insert(id.to_owned(), StoredDocument { sequence, fields });
        self.next_sequence = sequence.saturating_add(1);
    }

    fn delete(&mut self, collection: &str, id: &str) {
        if let Some(stored) = self.collections.get_mut(collection) {
            stored.documents.remove(id);
        }
    }

    fn apply(&mut self, write: WriteOp) {
        match write {
            WriteOp::Set {
                collection,
                id,
                fields,
            } => self.set(&collection, &id, fields),
            WriteOp::Delete { collection, id } => self.delete(&collection, &id),
        }
    }

    /// Returns matching documents in insertion order.
    fn select(&self, collection: &str, filters: &[Filter]) -> Vec<Document> {
        let Some(stored) = self.collections.get(collection) else {
            return Vec::new();
        };
        let mut matches: Vec<(&String, &StoredDocument)> = stored
            .documents
            .iter()
            .filter(|(_, document)| filters.iter().all(|filter| filter.matches(&document.fields)))
            .collect();
        matches.sort_by_key(|(_, document)| document.sequence);
        matches
            .into_iter()
            .map(|(id, document)| Document::new(id.clone(), document.fields.clone()))
            .collect()
    }
}

fn lock_error(err: impl std::fmt::Display) -> StoreError {
    StoreError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    fn new_document_id(&self, _collection: &str) -> String {
        Uuid::new_v4().simple().to_string()
    }

    async fn stream_all(&self, collection: &str) -> StoreResult<Vec<Document>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.select(collection, &[]))
    }

    async fn query(&self, collection: &str, filters: &[Filter]) -> StoreResult<Vec<Document>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.select(collection, filters))
    }

    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Document>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state
            .collections
            .get(collection)
            .and_then(|stored| stored.documents.get(id))
            .map(|document| Document::new(id, document.fields.clone())))
    }

    async fn set(&self, collection: &str, id: &str, fields: Fields) -> StoreResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.set(collection, id, fields);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> StoreResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.delete(collection, id);
        Ok(())
    }

    async fn batch_write(&self, writes: Vec<WriteOp>) -> StoreResult<()> {
        // One write guard for the whole batch, so readers never see a prefix.
        let mut state = self.state.write().map_err(lock_error)?;
        for write in writes {
            state.apply(write);
        }
        Ok(())
    }
}
