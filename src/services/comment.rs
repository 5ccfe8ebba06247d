//! Service layer for task comments and reply threads.

use mockable::Clock;
use serde_json::Value;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use super::activity::{metadata, record_activity};
use super::cascade::{Cascade, delete_each};
use super::error::{LogFailure, ServiceError, ServiceResult};
use super::lookup::{apply_limit, require_comment, require_task, require_user};
use crate::domain::{Activity, ActivityType, Comment, CommentId, TaskId, UserId};
use crate::ports::{CommentRepository, Entity, Repository, TransactionScope, UnitOfWork};

/// Comment creation, editing and thread removal.
#[derive(Clone)]
pub struct CommentService<U, C>
where
    U: UnitOfWork,
    C: Clock + Send + Sync,
{
    uow: Arc<U>,
    clock: Arc<C>,
}

impl<U, C> CommentService<U, C>
where
    U: UnitOfWork,
    C: Clock + Send + Sync,
{
    /// Creates a new comment service.
    #[must_use]
    pub const fn new(uow: Arc<U>, clock: Arc<C>) -> Self {
        Self { uow, clock }
    }

    /// Adds a comment, optionally replying to another comment on the same task.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] when the task, user or parent comment
    /// does not exist, [`ServiceError::Validation`] when the parent belongs to
    /// another task, or a domain error for blank content.
    pub async fn create_comment(
        &self,
        task_id: &TaskId,
        user_id: &UserId,
        content: &str,
        parent_comment_id: Option<&CommentId>,
    ) -> ServiceResult<Comment> {
        self.try_create_comment(task_id, user_id, content, parent_comment_id).await.logged()
    }

    /// Fetches one comment.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] when the comment does not exist.
    pub async fn get_comment(&self, comment_id: &CommentId) -> ServiceResult<Comment> {
        require_comment(self.uow.as_ref(), comment_id).await.logged()
    }

    /// Lists the comments on a task.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] when the task does not exist.
    pub async fn get_task_comments(
        &self,
        task_id: &TaskId,
        limit: Option<usize>,
    ) -> ServiceResult<Vec<Comment>> {
        self.try_get_task_comments(task_id, limit).await.logged()
    }

    /// Lists the comments written by a user.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] when the user does not exist.
    pub async fn get_user_comments(
        &self,
        user_id: &UserId,
        limit: Option<usize>,
    ) -> ServiceResult<Vec<Comment>> {
        self.try_get_user_comments(user_id, limit).await.logged()
    }

    /// Replaces a comment's content and marks it edited.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] when the comment does not exist, or
    /// a domain error for blank content.
    pub async fn update_comment(
        &self,
        comment_id: &CommentId,
        content: &str,
    ) -> ServiceResult<Comment> {
        self.try_update_comment(comment_id, content).await.logged()
    }

    /// Deletes a comment together with every reply beneath it.
    ///
    /// Returns the number of comments removed, including the target.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] when the comment does not exist, or
    /// [`ServiceError::Cascade`] when a deletion step fails.
    pub async fn delete_comment(&self, comment_id: &CommentId) -> ServiceResult<usize> {
        self.try_delete_comment(comment_id).await.logged()
    }

    async fn remove_thread(
        &self,
        uow: &U,
        comment: &Comment,
        comment_id: &CommentId,
    ) -> ServiceResult<usize> {
        let replies = self.collect_replies(comment_id).await?;
        let mut cascade = Cascade::new();
        cascade
            .step("replies", delete_each(uow.comments(), replies))
            .await?;
        cascade
            .step("comment", async {
                uow.comments().delete(comment).await?;
                Ok(1)
            })
            .await?;
        let removed = cascade.finish().total_removed();
        record_activity(
            uow,
            Activity::new(
                comment.task_id.clone(),
                comment.user_id.clone(),
                ActivityType::CommentDeleted,
                metadata([
                    ("comment_id", Value::String(comment_id.to_string())),
                    ("replies_removed", Value::from(removed.saturating_sub(1))),
                ]),
                self.clock.as_ref(),
            ),
        )
        .await?;
        Ok(removed)
    }

    /// Walks the reply tree below `root`, breadth first.
    async fn collect_replies(&self, root: &CommentId) -> ServiceResult<Vec<Comment>> {
        let mut visited = HashSet::from([root.clone()]);
        let mut pending = VecDeque::from([root.clone()]);
        let mut replies = Vec::new();
        while let Some(parent) = pending.pop_front() {
            for reply in self.uow.comments().find_replies(&parent).await? {
                let reply_id = reply.stored_id()?;
                if visited.insert(reply_id.clone()) {
                    pending.push_back(reply_id);
                    replies.push(reply);
                }
            }
        }
        Ok(replies)
    }

    /// Lists direct replies to a comment.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] when the comment does not exist.
    pub async fn get_replies(&self, comment_id: &CommentId) -> ServiceResult<Vec<Comment>> {
        self.try_get_replies(comment_id).await.logged()
    }

    async fn try_create_comment(
        &self,
        task_id: &TaskId,
        user_id: &UserId,
        content: &str,
        parent_comment_id: Option<&CommentId>,
    ) -> ServiceResult<Comment> {
        let uow = self.uow.as_ref();
        require_task(uow, task_id).await?;
        require_user(uow, user_id).await?;

        let mut comment = Comment::new(
            task_id.clone(),
            user_id.clone(),
            content,
            self.clock.as_ref(),
        )?;
        if let Some(parent_id) = parent_comment_id {
            let parent = require_comment(uow, parent_id).await?;
            if parent.task_id != *task_id {
                return Err(ServiceError::validation(format!(
                    "parent comment '{parent_id}' belongs to another task"
                )));
            }
            comment = comment.replying_to(parent_id.clone());
        }

        let comment = uow.comments().add(comment).await?;
        let comment_id = comment.stored_id()?;
        let parent_value =
            parent_comment_id.map_or(Value::Null, |id| Value::String(id.to_string()));
        record_activity(
            uow,
            Activity::new(
                task_id.clone(),
                user_id.clone(),
                ActivityType::CommentAdded,
                metadata([
                    ("comment_id", Value::String(comment_id.to_string())),
                    ("parent_comment_id", parent_value),
                ]),
                self.clock.as_ref(),
            ),
        )
        .await?;
        tracing::info!(comment_id = %comment_id, task_id = %task_id, "comment created");
        Ok(comment)
    }

    async fn try_get_task_comments(
        &self,
        task_id: &TaskId,
        limit: Option<usize>,
    ) -> ServiceResult<Vec<Comment>> {
        require_task(self.uow.as_ref(), task_id).await?;
        let comments = self.uow.comments().find_by_task(task_id).await?;
        Ok(apply_limit(comments, limit))
    }

    async fn try_get_user_comments(
        &self,
        user_id: &UserId,
        limit: Option<usize>,
    ) -> ServiceResult<Vec<Comment>> {
        require_user(self.uow.as_ref(), user_id).await?;
        let comments = self.uow.comments().find_by_user(user_id).await?;
        Ok(apply_limit(comments, limit))
    }

    async fn try_update_comment(
        &self,
        comment_id: &CommentId,
        content: &str,
    ) -> ServiceResult<Comment> {
        let uow = self.uow.as_ref();
        let mut comment = require_comment(uow, comment_id).await?;
        comment.edit(content, self.clock.as_ref())?;
        uow.comments().update(&comment).await?;
        record_activity(
            uow,
            Activity::new(
                comment.task_id.clone(),
                comment.user_id.clone(),
                ActivityType::CommentUpdated,
                metadata([("comment_id", Value::String(comment_id.to_string()))]),
                self.clock.as_ref(),
            ),
        )
        .await?;
        tracing::info!(comment_id = %comment_id, "comment updated");
        Ok(comment)
    }

    async fn try_delete_comment(&self, comment_id: &CommentId) -> ServiceResult<usize> {
        let uow = self.uow.as_ref();
        let comment = require_comment(uow, comment_id).await?;
        let scope = TransactionScope::begin(uow)?;
        let outcome = self.remove_thread(scope.uow(), &comment, comment_id).await;
        let removed = scope.finish(outcome).await?;
        tracing::info!(comment_id = %comment_id, removed, "comment thread deleted");
        Ok(removed)
    }

    async fn try_get_replies(&self, comment_id: &CommentId) -> ServiceResult<Vec<Comment>> {
        require_comment(self.uow.as_ref(), comment_id).await?;
        Ok(self.uow.comments().find_replies(comment_id).await?)
    }
}
