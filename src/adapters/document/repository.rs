//! Generic repository over a document store collection.

use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::adapters::transaction::TransactionSlot;
use crate::ports::{
    Document, DocumentStore, Entity, Fields, Filter, Repository, RepositoryError,
    RepositoryResult, WriteOp,
};

/// Repository storing entities of type `T` in the collection `T::COLLECTION`.
///
/// Writes issued while a staged transaction is open are buffered in the
/// shared [`TransactionSlot`] and reach the store on commit. Reads always go
/// to the store.
pub struct DocumentRepository<T, S> {
    store: Arc<S>,
    transaction: Arc<TransactionSlot>,
    entity: PhantomData<fn() -> T>,
}

impl<T, S> Clone for DocumentRepository<T, S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            transaction: Arc::clone(&self.transaction),
            entity: PhantomData,
        }
    }
}

impl<T: Entity, S> fmt::Debug for DocumentRepository<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentRepository")
            .field("collection", &T::COLLECTION)
            .finish_non_exhaustive()
    }
}

impl<T: Entity, S: DocumentStore> DocumentRepository<T, S> {
    /// Creates a repository sharing `store` and the transaction slot.
    #[must_use]
    pub const fn new(store: Arc<S>, transaction: Arc<TransactionSlot>) -> Self {
        Self {
            store,
            transaction,
            entity: PhantomData,
        }
    }

    /// Returns every entity matching all `filters`, in store order.
    pub(crate) async fn select(&self, filters: &[Filter]) -> RepositoryResult<Vec<T>> {
        let documents = self.store.query(T::COLLECTION, filters).await?;
        documents.into_iter().map(decode::<T>).collect()
    }

    /// Returns the first entity matching all `filters`.
    pub(crate) async fn select_one(&self, filters: &[Filter]) -> RepositoryResult<Option<T>> {
        Ok(self.select(filters).await?.into_iter().next())
    }

    async fn write(&self, write: WriteOp) -> RepositoryResult<()> {
        let Some(write) = self.transaction.stage(write)? else {
            tracing::trace!(collection = T::COLLECTION, "write staged");
            return Ok(());
        };
        match write {
            WriteOp::Set { id, fields, .. } => self.store.set(T::COLLECTION, &id, fields).await?,
            WriteOp::Delete { id, .. } => self.store.delete(T::COLLECTION, &id).await?,
        }
        Ok(())
    }
}

/// Builds an equality filter on a string-valued field.
pub(crate) fn field_eq(field: &str, value: impl AsRef<str>) -> Filter {
    Filter::eq(field, value.as_ref())
}

fn encode<T: Entity>(entity: &T) -> RepositoryResult<Fields> {
    match serde_json::to_value(entity) {
        Ok(Value::Object(fields)) => Ok(fields),
        Ok(_) => Err(RepositoryError::invalid_document(
            T::COLLECTION,
            <serde_json::Error as serde::ser::Error>::custom("entity did not serialise to an object"),
        )),
        Err(err) => Err(RepositoryError::invalid_document(T::COLLECTION, err)),
    }
}

fn decode<T: Entity>(document: Document) -> RepositoryResult<T> {
    let mut entity: T = serde_json::from_value(Value::Object(document.fields))
        .map_err(|err| RepositoryError::invalid_document(T::COLLECTION, err))?;
    entity.set_id(T::Id::from(document.id));
    Ok(entity)
}

#[async_trait]
impl<T: Entity, S: DocumentStore> Repository<T> for DocumentRepository<T, S> {
    async fn get_all(&self) -> RepositoryResult<Vec<T>> {
        let documents = self.store.stream_all(T::COLLECTION).await?;
        documents.into_iter().map(decode::<T>).collect()
    }

    async fn find_by_id(&self, id: &T::Id) -> RepositoryResult<Option<T>> {
        self.store
            .get(T::COLLECTION, id.as_ref())
            .await?
            .map(decode::<T>)
            .transpose()
    }

    async fn add(&self, mut entity: T) -> RepositoryResult<T> {
        let id = match entity.id() {
            Some(id) => id.as_ref().to_owned(),
            None => self.store.new_document_id(T::COLLECTION),
        };
        let fields = encode(&entity)?;
        self.write(WriteOp::Set {
            collection: T::COLLECTION.to_owned(),
            id: id.clone(),
            fields,
        })
        .await?;
        entity.set_id(T::Id::from(id));
        Ok(entity)
    }

    async fn update(&self, entity: &T) -> RepositoryResult<()> {
        let id = entity.stored_id()?;
        let fields = encode(entity)?;
        self.write(WriteOp::Set {
            collection: T::COLLECTION.to_owned(),
            id: id.as_ref().to_owned(),
            fields,
        })
        .await
    }

    async fn delete(&self, entity: &T) -> RepositoryResult<()> {
        let id = entity.stored_id()?;
        self.write(WriteOp::Delete {
            collection: T::COLLECTION.to_owned(),
            id: id.as_ref().to_owned(),
        })
        .await
    }
}
