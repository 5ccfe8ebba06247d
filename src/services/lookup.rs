//! Existence checks shared by the services.

use super::error::{EntityKind, ServiceError, ServiceResult};
use crate::domain::{
    Activity, ActivityId, Attachment, AttachmentId, Comment, CommentId, Member, MemberId, Task,
    TaskId, User, UserId,
};
use crate::ports::{Repository, UnitOfWork};

pub(crate) async fn require_user<U: UnitOfWork>(uow: &U, id: &UserId) -> ServiceResult<User> {
    uow.users()
        .find_by_id(id)
        .await?
        .ok_or_else(|| ServiceError::not_found(EntityKind::User, id))
}

pub(crate) async fn require_task<U: UnitOfWork>(uow: &U, id: &TaskId) -> ServiceResult<Task> {
    uow.tasks()
        .find_by_id(id)
        .await?
        .ok_or_else(|| ServiceError::not_found(EntityKind::Task, id))
}

pub(crate) async fn require_member<U: UnitOfWork>(uow: &U, id: &MemberId) -> ServiceResult<Member> {
    uow.members()
        .find_by_id(id)
        .await?
        .ok_or_else(|| ServiceError::not_found(EntityKind::Member, id))
}

pub(crate) async fn require_comment<U: UnitOfWork>(
    uow: &U,
    id: &CommentId,
) -> ServiceResult<Comment> {
    uow.comments()
        .find_by_id(id)
        .await?
        .ok_or_else(|| ServiceError::not_found(EntityKind::Comment, id))
}

pub(crate) async fn require_attachment<U: UnitOfWork>(
    uow: &U,
    id: &AttachmentId,
) -> ServiceResult<Attachment> {
    uow.attachments()
        .find_by_id(id)
        .await?
        .ok_or_else(|| ServiceError::not_found(EntityKind::Attachment, id))
}

pub(crate) async fn require_activity<U: UnitOfWork>(
    uow: &U,
    id: &ActivityId,
) -> ServiceResult<Activity> {
    uow.activities()
        .find_by_id(id)
        .await?
        .ok_or_else(|| ServiceError::not_found(EntityKind::Activity, id))
}

/// Keeps at most `limit` items; `None` keeps everything.
pub(crate) fn apply_limit<T>(mut items: Vec<T>, limit: Option<usize>) -> Vec<T> {
    if let Some(limit) = limit {
        items.truncate(limit);
    }
    items
}
