//! Unit of work over a shared document store.

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

use super::document::DocumentRepository;
use super::transaction::TransactionSlot;
use crate::domain::{Activity, Attachment, Comment, Member, Task, User};
use crate::ports::{DocumentStore, TransactionMode, UnitOfWork, UnitOfWorkError, UnitOfWorkResult};

/// Unit of work handing out one document repository per entity.
///
/// All repositories share the store handle and the transaction slot, so a
/// staged transaction opened here buffers writes from every repository.
/// Scoped work runs on a [`UnitOfWork::fork`] with a slot of its own.
pub struct DocumentUnitOfWork<S> {
    store: Arc<S>,
    transaction: Arc<TransactionSlot>,
    users: DocumentRepository<User, S>,
    tasks: DocumentRepository<Task, S>,
    members: DocumentRepository<Member, S>,
    comments: DocumentRepository<Comment, S>,
    attachments: DocumentRepository<Attachment, S>,
    activities: DocumentRepository<Activity, S>,
}

impl<S> fmt::Debug for DocumentUnitOfWork<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentUnitOfWork")
            .field("transaction", &self.transaction)
            .finish_non_exhaustive()
    }
}

impl<S: DocumentStore> DocumentUnitOfWork<S> {
    /// Builds the unit of work and its repositories over `store`.
    #[must_use]
    pub fn new(store: Arc<S>, mode: TransactionMode) -> Self {
        let transaction = Arc::new(TransactionSlot::new(mode));
        Self {
            users: DocumentRepository::new(Arc::clone(&store), Arc::clone(&transaction)),
            tasks: DocumentRepository::new(Arc::clone(&store), Arc::clone(&transaction)),
            members: DocumentRepository::new(Arc::clone(&store), Arc::clone(&transaction)),
            comments: DocumentRepository::new(Arc::clone(&store), Arc::clone(&transaction)),
            attachments: DocumentRepository::new(Arc::clone(&store), Arc::clone(&transaction)),
            activities: DocumentRepository::new(Arc::clone(&store), Arc::clone(&transaction)),
            store,
            transaction,
        }
    }

    /// Returns the underlying store handle.
    #[must_use]
    pub const fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Returns the configured transaction mode.
    #[must_use]
    pub fn mode(&self) -> TransactionMode {
        self.transaction.mode()
    }
}

#[async_trait]
impl<S: DocumentStore> UnitOfWork for DocumentUnitOfWork<S> {
    type Users = DocumentRepository<User, S>;
    type Tasks = DocumentRepository<Task, S>;
    type Members = DocumentRepository<Member, S>;
    type Comments = DocumentRepository<Comment, S>;
    type Attachments = DocumentRepository<Attachment, S>;
    type Activities = DocumentRepository<Activity, S>;

    fn users(&self) -> &Self::Users {
        &self.users
    }

    fn tasks(&self) -> &Self::Tasks {
        &self.tasks
    }

    fn members(&self) -> &Self::Members {
        &self.members
    }

    fn comments(&self) -> &Self::Comments {
        &self.comments
    }

    fn attachments(&self) -> &Self::Attachments {
        &self.attachments
    }

    fn activities(&self) -> &Self::Activities {
        &self.activities
    }

    fn begin_transaction(&self) -> UnitOfWorkResult<()> {
        self.transaction.begin()?;
        tracing::debug!(mode = ?self.transaction.mode(), "transaction started");
        Ok(())
    }

    async fn commit(&self) -> UnitOfWorkResult<()> {
        let writes = self.transaction.take()?;
        if writes.is_empty() {
            tracing::debug!("transaction committed with no staged writes");
            return Ok(());
        }
        let count = writes.len();
        self.store.batch_write(writes).await?;
        tracing::debug!(writes = count, "transaction committed");
        Ok(())
    }

    fn rollback(&self) -> UnitOfWorkResult<()> {
        let discarded = self
            .transaction
            .discard()?
            .ok_or(UnitOfWorkError::NoTransaction)?;
        match self.transaction.mode() {
            TransactionMode::Staged => {
                tracing::debug!(discarded, "transaction rolled back");
            }
            TransactionMode::Immediate => {
                tracing::debug!("transaction closed; immediate writes remain applied");
            }
        }
        Ok(())
    }

    fn end_transaction(&self) -> UnitOfWorkResult<()> {
        if let Some(discarded) = self.transaction.discard()? {
            tracing::debug!(discarded, "open transaction ended without commit");
        }
        Ok(())
    }

    fn in_transaction(&self) -> bool {
        self.transaction.is_open()
    }

    fn fork(&self) -> Self {
        Self::new(Arc::clone(&self.store), self.mode())
    }
}
