//! Collection bindings and indexed lookups for each entity.

use async_trait::async_trait;

use super::repository::{DocumentRepository, field_eq};
use crate::domain::{
    Activity, ActivityId, ActivityType, Attachment, AttachmentId, Comment, CommentId,
    EmailAddress, Member, MemberId, Task, TaskId, TaskPriority, TaskStatus, User, UserId,
};
use crate::ports::{
    ActivityRepository, AttachmentRepository, CommentRepository, DocumentStore, Entity, Filter,
    MemberRepository, RepositoryResult, TaskRepository, UserRepository,
};

macro_rules! document_entity {
    ($entity:ty, $id:ty, $collection:literal) => {
        impl Entity for $entity {
            type Id = $id;

            const COLLECTION: &'static str = $collection;

            fn id(&self) -> Option<&Self::Id> {
                self.id.as_ref()
            }

            fn set_id(&mut self, id: Self::Id) {
                self.id = Some(id);
            }
        }
    };
}

document_entity!(User, UserId, "users");
document_entity!(Task, TaskId, "tasks");
document_entity!(Member, MemberId, "task_members");
document_entity!(Comment, CommentId, "task_comments");
document_entity!(Attachment, AttachmentId, "task_attachments");
document_entity!(Activity, ActivityId, "task_activities");

/// Document-backed user repository.
pub type DocumentUserRepository<S> = DocumentRepository<User, S>;
/// Document-backed task repository.
pub type DocumentTaskRepository<S> = DocumentRepository<Task, S>;
/// Document-backed member repository.
pub type DocumentMemberRepository<S> = DocumentRepository<Member, S>;
/// Document-backed comment repository.
pub type DocumentCommentRepository<S> = DocumentRepository<Comment, S>;
/// Document-backed attachment repository.
pub type DocumentAttachmentRepository<S> = DocumentRepository<Attachment, S>;
/// Document-backed activity repository.
pub type DocumentActivityRepository<S> = DocumentRepository<Activity, S>;

#[async_trait]
impl<S: DocumentStore> UserRepository for DocumentRepository<User, S> {
    async fn find_by_email(&self, email: &EmailAddress) -> RepositoryResult<Option<User>> {
        self.select_one(&[field_eq("email", email.as_str())]).await
    }

    async fn find_by_username(&self, username: &str) -> RepositoryResult<Option<User>> {
        self.select_one(&[field_eq("username", username)]).await
    }
}

#[async_trait]
impl<S: DocumentStore> TaskRepository for DocumentRepository<Task, S> {
    async fn find_by_owner(&self, owner_id: &UserId) -> RepositoryResult<Vec<Task>> {
        self.select(&[field_eq("owner_id", owner_id)]).await
    }

    async fn find_by_status(&self, status: TaskStatus) -> RepositoryResult<Vec<Task>> {
        self.select(&[field_eq("status", status.as_str())]).await
    }

    async fn find_by_priority(&self, priority: TaskPriority) -> RepositoryResult<Vec<Task>> {
        self.select(&[field_eq("priority", priority.as_str())]).await
    }

    async fn find_by_tag(&self, tag: &str) -> RepositoryResult<Vec<Task>> {
        self.select(&[Filter::array_contains("tags", tag)]).await
    }
}

#[async_trait]
impl<S: DocumentStore> MemberRepository for DocumentRepository<Member, S> {
    async fn find_by_task(&self, task_id: &TaskId) -> RepositoryResult<Vec<Member>> {
        self.select(&[field_eq("task_id", task_id)]).await
    }

    async fn find_by_user(&self, user_id: &UserId) -> RepositoryResult<Vec<Member>> {
        self.select(&[field_eq("user_id", user_id)]).await
    }

    async fn find_by_task_and_user(
        &self,
        task_id: &TaskId,
        user_id: &UserId,
    ) -> RepositoryResult<Option<Member>> {
        self.select_one(&[field_eq("task_id", task_id), field_eq("user_id", user_id)])
            .await
    }
}

#[async_trait]
impl<S: DocumentStore> CommentRepository for DocumentRepository<Comment, S> {
    async fn find_by_task(&self, task_id: &TaskId) -> RepositoryResult<Vec<Comment>> {
        self.select(&[field_eq("task_id", task_id)]).await
    }

    async fn find_by_user(&self, user_id: &UserId) -> RepositoryResult<Vec<Comment>> {
        self.select(&[field_eq("user_id", user_id)]).await
    }

    async fn find_replies(&self, parent_comment_id: &CommentId) -> RepositoryResult<Vec<Comment>> {
        self.select(&[field_eq("parent_comment_id", parent_comment_id)])
            .await
    }
}

#[async_trait]
impl<S: DocumentStore> AttachmentRepository for DocumentRepository<Attachment, S> {
    async fn find_by_task(&self, task_id: &TaskId) -> RepositoryResult<Vec<Attachment>> {
        self.select(&[field_eq("task_id", task_id)]).await
    }

    async fn find_by_user(&self, user_id: &UserId) -> RepositoryResult<Vec<Attachment>> {
        self.select(&[field_eq("user_id", user_id)]).await
    }

    async fn find_by_file_type(&self, file_type: &str) -> RepositoryResult<Vec<Attachment>> {
        self.select(&[field_eq("file_type", file_type)]).await
    }
}

#[async_trait]
impl<S: DocumentStore> ActivityRepository for DocumentRepository<Activity, S> {
    async fn find_by_task(&self, task_id: &TaskId) -> RepositoryResult<Vec<Activity>> {
        self.select(&[field_eq("task_id", task_id)]).await
    }

    async fn find_by_user(&self, user_id: &UserId) -> RepositoryResult<Vec<Activity>> {
        self.select(&[field_eq("user_id", user_id)]).await
    }

    async fn find_by_activity_type(
        &self,
        activity_type: ActivityType,
    ) -> RepositoryResult<Vec<Activity>> {
        self.select(&[field_eq("activity_type", activity_type.as_str())])
            .await
    }
}
