//! Service layer for task attachments.

use mockable::Clock;
use serde_json::Value;
use std::sync::Arc;

use super::activity::{metadata, record_activity};
use super::error::{LogFailure, ServiceResult};
use super::lookup::{apply_limit, require_attachment, require_task, require_user};
use crate::domain::{
    Activity, ActivityType, Attachment, AttachmentId, FileDescriptor, TaskId, UserId,
};
use crate::ports::{AttachmentRepository, Entity, Repository, UnitOfWork};

/// Attachment upload bookkeeping and lookup.
#[derive(Clone)]
pub struct AttachmentService<U, C>
where
    U: UnitOfWork,
    C: Clock + Send + Sync,
{
    uow: Arc<U>,
    clock: Arc<C>,
}

impl<U, C> AttachmentService<U, C>
where
    U: UnitOfWork,
    C: Clock + Send + Sync,
{
    /// Creates a new attachment service.
    #[must_use]
    pub const fn new(uow: Arc<U>, clock: Arc<C>) -> Self {
        Self { uow, clock }
    }

    /// Records an uploaded file against a task.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`](super::ServiceError::NotFound) when
    /// the task or user does not exist, or a domain error for a blank file name.
    pub async fn upload_attachment(
        &self,
        task_id: &TaskId,
        user_id: &UserId,
        file: FileDescriptor,
    ) -> ServiceResult<Attachment> {
        self.try_upload_attachment(task_id, user_id, file).await.logged()
    }

    /// Fetches one attachment.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`](super::ServiceError::NotFound) when
    /// the attachment does not exist.
    pub async fn get_attachment(&self, attachment_id: &AttachmentId) -> ServiceResult<Attachment> {
        require_attachment(self.uow.as_ref(), attachment_id).await.logged()
    }

    /// Lists a task's attachments.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`](super::ServiceError::NotFound) when
    /// the task does not exist.
    pub async fn get_task_attachments(
        &self,
        task_id: &TaskId,
        limit: Option<usize>,
    ) -> ServiceResult<Vec<Attachment>> {
        self.try_get_task_attachments(task_id, limit).await.logged()
    }

    /// Lists attachments uploaded by a user.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`](super::ServiceError::NotFound) when
    /// the user does not exist.
    pub async fn get_user_attachments(
        &self,
        user_id: &UserId,
        limit: Option<usize>,
    ) -> ServiceResult<Vec<Attachment>> {
        self.try_get_user_attachments(user_id, limit).await.logged()
    }

    /// Lists a task's attachments with the given file type.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`](super::ServiceError::NotFound) when
    /// the task does not exist.
    pub async fn get_attachments_by_type(
        &self,
        task_id: &TaskId,
        file_type: &str,
    ) -> ServiceResult<Vec<Attachment>> {
        self.try_get_attachments_by_type(task_id, file_type).await.logged()
    }

    /// Deletes an attachment record.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`](super::ServiceError::NotFound) when
    /// the attachment does not exist.
    pub async fn delete_attachment(&self, attachment_id: &AttachmentId) -> ServiceResult<()> {
        self.try_delete_attachment(attachment_id).await.logged()
    }

    async fn try_upload_attachment(
        &self,
        task_id: &TaskId,
        user_id: &UserId,
        file: FileDescriptor,
    ) -> ServiceResult<Attachment> {
        let uow = self.uow.as_ref();
        require_task(uow, task_id).await?;
        require_user(uow, user_id).await?;

        let attachment = Attachment::new(task_id.clone(), user_id.clone(), file, self.clock.as_ref())?;
        let attachment = uow.attachments().add(attachment).await?;
        let attachment_id = attachment.stored_id()?;
        record_activity(
            uow,
            Activity::new(
                task_id.clone(),
                user_id.clone(),
                ActivityType::AttachmentAdded,
                metadata([
                    ("attachment_id", Value::String(attachment_id.to_string())),
                    ("file_name", Value::String(attachment.file_name.clone())),
                    ("file_type", Value::String(attachment.file_type.clone())),
                    ("file_size", Value::from(attachment.file_size)),
                ]),
                self.clock.as_ref(),
            ),
        )
        .await?;
        tracing::info!(
            attachment_id = %attachment_id,
            task_id = %task_id,
            file_size = attachment.file_size,
            "attachment uploaded"
        );
        Ok(attachment)
    }

    async fn try_get_task_attachments(
        &self,
        task_id: &TaskId,
        limit: Option<usize>,
    ) -> ServiceResult<Vec<Attachment>> {
        require_task(self.uow.as_ref(), task_id).await?;
        let attachments = self.uow.attachments().find_by_task(task_id).await?;
        Ok(apply_limit(attachments, limit))
    }

    async fn try_get_user_attachments(
        &self,
        user_id: &UserId,
        limit: Option<usize>,
    ) -> ServiceResult<Vec<Attachment>> {
        require_user(self.uow.as_ref(), user_id).await?;
        let attachments = self.uow.attachments().find_by_user(user_id).await?;
        Ok(apply_limit(attachments, limit))
    }

    async fn try_get_attachments_by_type(
        &self,
        task_id: &TaskId,
        file_type: &str,
    ) -> ServiceResult<Vec<Attachment>> {
        require_task(self.uow.as_ref(), task_id).await?;
        let mut attachments = self.uow.attachments().find_by_file_type(file_type).await?;
        attachments.retain(|attachment| attachment.task_id == *task_id);
        Ok(attachments)
    }

    async fn try_delete_attachment(&self, attachment_id: &AttachmentId) -> ServiceResult<()> {
        let uow = self.uow.as_ref();
        let attachment = require_attachment(uow, attachment_id).await?;
        uow.attachments().delete(&attachment).await?;
        record_activity(
            uow,
            Activity::new(
                attachment.task_id.clone(),
                attachment.user_id.clone(),
                ActivityType::AttachmentDeleted,
                metadata([
                    ("attachment_id", Value::String(attachment_id.to_string())),
                    ("file_name", Value::String(attachment.file_name.clone())),
                ]),
                self.clock.as_ref(),
            ),
        )
        .await?;
        tracing::info!(attachment_id = %attachment_id, "attachment deleted");
        Ok(())
    }
}
