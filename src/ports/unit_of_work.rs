//! Unit-of-work port bundling the repositories with transaction lifecycle.
//!
//! A unit of work hands out one shared repository per entity type and tracks
//! at most one open transaction. [`TransactionScope`] is the scoped form. It
//! forks a private unit of work over the same store and begins a transaction
//! there, so writes made through the parent never join the scope. It commits
//! when the scoped work succeeds and rolls back when it fails. A scope dropped
//! on any other path clears its transaction.

use super::{
    ActivityRepository, AttachmentRepository, CommentRepository, MemberRepository, StoreError,
    TaskRepository, UserRepository,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for transaction lifecycle operations.
pub type UnitOfWorkResult<T> = Result<T, UnitOfWorkError>;

/// How repository writes behave while a transaction is open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionMode {
    /// Writes are buffered and applied as one atomic batch on commit;
    /// rollback discards them.
    #[default]
    Staged,
    /// Writes reach the store immediately; the transaction is bookkeeping
    /// only and rollback undoes nothing.
    Immediate,
}

/// Repositories plus transaction lifecycle behind one handle.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// User repository type.
    type Users: UserRepository;
    /// Task repository type.
    type Tasks: TaskRepository;
    /// Member repository type.
    type Members: MemberRepository;
    /// Comment repository type.
    type Comments: CommentRepository;
    /// Attachment repository type.
    type Attachments: AttachmentRepository;
    /// Activity repository type.
    type Activities: ActivityRepository;

    /// Returns the shared user repository.
    fn users(&self) -> &Self::Users;

    /// Returns the shared task repository.
    fn tasks(&self) -> &Self::Tasks;

    /// Returns the shared member repository.
    fn members(&self) -> &Self::Members;

    /// Returns the shared comment repository.
    fn comments(&self) -> &Self::Comments;

    /// Returns the shared attachment repository.
    fn attachments(&self) -> &Self::Attachments;

    /// Returns the shared activity repository.
    fn activities(&self) -> &Self::Activities;

    /// Opens a transaction.
    ///
    /// # Errors
    ///
    /// Returns [`UnitOfWorkError::TransactionInProgress`] when one is already
    /// open.
    fn begin_transaction(&self) -> UnitOfWorkResult<()>;

    /// Applies the open transaction and clears it, even when applying fails.
    ///
    /// # Errors
    ///
    /// Returns [`UnitOfWorkError::NoTransaction`] when none is open, or
    /// [`UnitOfWorkError::Store`] when the store rejects the staged writes.
    async fn commit(&self) -> UnitOfWorkResult<()>;

    /// Discards the open transaction.
    ///
    /// # Errors
    ///
    /// Returns [`UnitOfWorkError::NoTransaction`] when none is open.
    fn rollback(&self) -> UnitOfWorkResult<()>;

    /// Rolls back the open transaction, if any.
    ///
    /// # Errors
    ///
    /// Returns [`UnitOfWorkError::StatePoisoned`] when the transaction state
    /// is unusable.
    fn end_transaction(&self) -> UnitOfWorkResult<()>;

    /// Returns `true` while a transaction is open.
    fn in_transaction(&self) -> bool;

    /// Builds a unit of work over the same store with its own transaction
    /// state and repositories.
    #[must_use]
    fn fork(&self) -> Self
    where
        Self: Sized;
}

/// Scoped transaction guard owning a forked unit of work.
///
/// Run the scoped work through [`TransactionScope::uow`], then call
/// [`TransactionScope::finish`] with its outcome. Concurrent scopes forked from
/// one parent never see each other's staged writes. A scope dropped without
/// finishing ends its transaction without committing.
#[must_use = "a transaction scope must be finished to commit its writes"]
pub struct TransactionScope<U: UnitOfWork> {
    uow: U,
    open: bool,
}

impl<U: UnitOfWork> TransactionScope<U> {
    /// Forks `parent` and opens a transaction on the fork.
    ///
    /// # Errors
    ///
    /// Returns [`UnitOfWorkError::StatePoisoned`] when the fork's transaction
    /// state is unusable.
    pub fn begin(parent: &U) -> UnitOfWorkResult<Self> {
        let uow = parent.fork();
        uow.begin_transaction()?;
        tracing::debug!("transaction scope opened");
        Ok(Self { uow, open: true })
    }

    /// Returns the unit of work whose writes belong to this scope.
    #[must_use]
    pub const fn uow(&self) -> &U {
        &self.uow
    }

    /// Commits on `Ok`, rolls back on `Err`.
    ///
    /// # Errors
    ///
    /// Returns [`ScopeError::Aborted`] carrying the scoped error after rolling
    /// back, or [`ScopeError::Commit`] when committing fails.
    pub async fn finish<T, E>(mut self, outcome: Result<T, E>) -> Result<T, ScopeError<E>> {
        self.open = false;
        match outcome {
            Ok(value) => {
                self.uow.commit().await.map_err(ScopeError::Commit)?;
                tracing::debug!("transaction scope committed");
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = self.uow.rollback() {
                    tracing::warn!(error = %rollback_err, "transaction scope rollback failed");
                } else {
                    tracing::debug!("transaction scope rolled back");
                }
                Err(ScopeError::Aborted(err))
            }
        }
    }
}

impl<U: UnitOfWork> Drop for TransactionScope<U> {
    fn drop(&mut self) {
        if !self.open {
            return;
        }
        if let Err(err) = self.uow.end_transaction() {
            tracing::warn!(error = %err, "dropped transaction scope could not be ended");
        } else {
            tracing::debug!("dropped transaction scope ended without commit");
        }
    }
}

/// Outcome of a failed transaction scope.
#[derive(Debug, Error)]
pub enum ScopeError<E> {
    /// The scoped work failed and the transaction was rolled back.
    #[error(transparent)]
    Aborted(E),

    /// The scoped work succeeded but committing failed.
    #[error("transaction commit failed: {0}")]
    Commit(UnitOfWorkError),
}

/// Errors returned by transaction lifecycle operations.
#[derive(Debug, Clone, Error)]
pub enum UnitOfWorkError {
    /// A transaction is already open.
    #[error("transaction already in progress")]
    TransactionInProgress,

    /// No transaction is open.
    #[error("no transaction in progress")]
    NoTransaction,

    /// The transaction state lock was poisoned.
    #[error("transaction state poisoned: {0}")]
    StatePoisoned(String),

    /// Applying the staged writes failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}
