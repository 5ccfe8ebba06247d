//! Domain model for the task board.
//!
//! Entities are plain records with store-assigned identifiers. Validation of
//! individual values (email syntax, blank titles) lives here; checks that need
//! other records (existence, uniqueness) belong to the services.

mod activity;
mod attachment;
mod comment;
mod error;
mod ids;
mod member;
mod task;
mod user;

pub use activity::{Activity, ActivityMetadata, ActivityType};
pub use attachment::{Attachment, FileDescriptor};
pub use comment::Comment;
pub use error::{DomainError, ParseValueError};
pub use ids::{ActivityId, AttachmentId, CommentId, MemberId, TaskId, UserId};
pub use member::{Member, MemberRole};
pub use task::{FieldChange, Task, TaskChanges, TaskPatch, TaskPriority, TaskStatus};
pub use user::{EmailAddress, User, UserPatch};

#[cfg(test)]
mod tests;
