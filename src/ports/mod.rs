//! Port contracts for persistence.
//!
//! Ports define infrastructure-agnostic interfaces used by the services: the
//! document store collaborator, the repositories layered on it, and the unit
//! of work that bundles them.

pub mod document_store;
pub mod repository;
pub mod unit_of_work;

pub use document_store::{Document, DocumentStore, Fields, Filter, StoreError, StoreResult, WriteOp};
pub use repository::{
    ActivityRepository, AttachmentRepository, CommentRepository, Entity, MemberRepository,
    Repository, RepositoryError, RepositoryResult, TaskRepository, UserRepository,
};
pub use unit_of_work::{
    ScopeError, TransactionMode, TransactionScope, UnitOfWork, UnitOfWorkError, UnitOfWorkResult,
};

#[cfg(test)]
pub use document_store::MockDocumentStore;
