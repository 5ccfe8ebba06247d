//! Repository ports for entity persistence and indexed lookup.
//!
//! [`Repository`] is the generic contract every entity collection offers. The
//! entity-specific traits add the equality and membership lookups services
//! rely on. Lookups for a parent that does not exist return an empty list.

use super::{StoreError, UnitOfWorkError};
use crate::domain::{
    Activity, ActivityType, Attachment, Comment, CommentId, EmailAddress, Member, Task, TaskId,
    TaskPriority, TaskStatus, User, UserId,
};
use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Result type for repository operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// A record stored as a document in a named collection.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Typed identifier of the entity.
    type Id: Clone + Send + Sync + fmt::Display + From<String> + AsRef<str>;

    /// Name of the collection holding this entity.
    const COLLECTION: &'static str;

    /// Returns the identifier, if one has been assigned.
    fn id(&self) -> Option<&Self::Id>;

    /// Assigns the identifier.
    fn set_id(&mut self, id: Self::Id);

    /// Returns the identifier or fails for an entity that was never stored.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::MissingIdentifier`] when no identifier is set.
    fn stored_id(&self) -> RepositoryResult<Self::Id> {
        self.id()
            .cloned()
            .ok_or(RepositoryError::MissingIdentifier(Self::COLLECTION))
    }
}

/// Generic persistence contract shared by every entity collection.
#[async_trait]
pub trait Repository<T: Entity>: Send + Sync {
    /// Returns every stored entity.
    async fn get_all(&self) -> RepositoryResult<Vec<T>>;

    /// Finds an entity by identifier.
    ///
    /// Returns `None` when the entity does not exist.
    async fn find_by_id(&self, id: &T::Id) -> RepositoryResult<Option<T>>;

    /// Stores an entity, returning it with its identifier.
    ///
    /// Entities without an identifier receive a store-generated one; entities
    /// with one are written at that key, overwriting any existing document.
    async fn add(&self, entity: T) -> RepositoryResult<T>;

    /// Overwrites the stored document addressed by the entity's identifier.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::MissingIdentifier`] when the entity was
    /// never stored.
    async fn update(&self, entity: &T) -> RepositoryResult<()>;

    /// Deletes the stored document addressed by the entity's identifier.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::MissingIdentifier`] when the entity was
    /// never stored.
    async fn delete(&self, entity: &T) -> RepositoryResult<()>;
}

/// User lookups.
#[async_trait]
pub trait UserRepository: Repository<User> {
    /// Finds the user registered with `email`.
    async fn find_by_email(&self, email: &EmailAddress) -> RepositoryResult<Option<User>>;

    /// Finds the user holding `username`.
    async fn find_by_username(&self, username: &str) -> RepositoryResult<Option<User>>;
}

/// Task lookups.
#[async_trait]
pub trait TaskRepository: Repository<Task> {
    /// Returns tasks owned by the user.
    async fn find_by_owner(&self, owner_id: &UserId) -> RepositoryResult<Vec<Task>>;

    /// Returns tasks in the given status.
    async fn find_by_status(&self, status: TaskStatus) -> RepositoryResult<Vec<Task>>;

    /// Returns tasks with the given priority.
    async fn find_by_priority(&self, priority: TaskPriority) -> RepositoryResult<Vec<Task>>;

    /// Returns tasks whose tag list contains `tag`.
    async fn find_by_tag(&self, tag: &str) -> RepositoryResult<Vec<Task>>;
}

/// Membership lookups.
#[async_trait]
pub trait MemberRepository: Repository<Member> {
    /// Returns the membership rows of a task.
    async fn find_by_task(&self, task_id: &TaskId) -> RepositoryResult<Vec<Member>>;

    /// Returns the membership rows of a user.
    async fn find_by_user(&self, user_id: &UserId) -> RepositoryResult<Vec<Member>>;

    /// Finds the membership row for a (task, user) pair.
    async fn find_by_task_and_user(
        &self,
        task_id: &TaskId,
        user_id: &UserId,
    ) -> RepositoryResult<Option<Member>>;
}

/// Comment lookups.
#[async_trait]
pub trait CommentRepository: Repository<Comment> {
    /// Returns the comments on a task.
    async fn find_by_task(&self, task_id: &TaskId) -> RepositoryResult<Vec<Comment>>;

    /// Returns the comments written by a user.
    async fn find_by_user(&self, user_id: &UserId) -> RepositoryResult<Vec<Comment>>;

    /// Returns direct replies to a comment.
    async fn find_replies(&self, parent_comment_id: &CommentId) -> RepositoryResult<Vec<Comment>>;
}

/// Attachment lookups.
#[async_trait]
pub trait AttachmentRepository: Repository<Attachment> {
    /// Returns the attachments of a task.
    async fn find_by_task(&self, task_id: &TaskId) -> RepositoryResult<Vec<Attachment>>;

    /// Returns the attachments uploaded by a user.
    async fn find_by_user(&self, user_id: &UserId) -> RepositoryResult<Vec<Attachment>>;

    /// Returns attachments of the given file type.
    async fn find_by_file_type(&self, file_type: &str) -> RepositoryResult<Vec<Attachment>>;
}

/// Activity lookups.
#[async_trait]
pub trait ActivityRepository: Repository<Activity> {
    /// Returns the activities recorded on a task.
    async fn find_by_task(&self, task_id: &TaskId) -> RepositoryResult<Vec<Activity>>;

    /// Returns the activities performed by a user.
    async fn find_by_user(&self, user_id: &UserId) -> RepositoryResult<Vec<Activity>>;

    /// Returns activities of the given type.
    async fn find_by_activity_type(
        &self,
        activity_type: ActivityType,
    ) -> RepositoryResult<Vec<Activity>>;
}

/// Errors returned by repository implementations.
#[derive(Debug, Clone, Error)]
pub enum RepositoryError {
    /// The entity has no identifier, so it cannot be addressed.
    #[error("{0} entity has no identifier")]
    MissingIdentifier(&'static str),

    /// A stored document could not be converted into an entity, or back.
    #[error("invalid document in {collection}: {cause}")]
    InvalidDocument {
        /// Collection the document belongs to.
        collection: &'static str,
        /// Underlying conversion failure.
        cause: Arc<dyn std::error::Error + Send + Sync>,
    },

    /// The write could not be staged in the open transaction.
    #[error(transparent)]
    Transaction(#[from] UnitOfWorkError),

    /// The document store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl RepositoryError {
    /// Wraps a document conversion error.
    pub fn invalid_document(
        collection: &'static str,
        err: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::InvalidDocument {
            collection,
            cause: Arc::new(err),
        }
    }
}
