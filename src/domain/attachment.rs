//! File attachments on tasks.

use super::{AttachmentId, DomainError, TaskId, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Describes an uploaded file before it is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDescriptor {
    /// Original file name.
    pub file_name: String,
    /// Location of the stored file.
    pub file_url: String,
    /// MIME type or extension.
    pub file_type: String,
    /// Size in bytes.
    pub file_size: u64,
}

impl FileDescriptor {
    /// Creates a file descriptor.
    #[must_use]
    pub fn new(
        file_name: impl Into<String>,
        file_url: impl Into<String>,
        file_type: impl Into<String>,
        file_size: u64,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            file_url: file_url.into(),
            file_type: file_type.into(),
            file_size,
        }
    }
}

/// A file attached to a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Store-assigned identifier; `None` until persisted.
    #[serde(skip)]
    pub id: Option<AttachmentId>,
    /// Task the file is attached to.
    pub task_id: TaskId,
    /// Uploader.
    pub user_id: UserId,
    /// Original file name.
    pub file_name: String,
    /// Location of the stored file.
    pub file_url: String,
    /// MIME type or extension.
    pub file_type: String,
    /// Size in bytes.
    pub file_size: u64,
    /// Upload timestamp.
    pub uploaded_at: DateTime<Utc>,
}

impl Attachment {
    /// Creates an unsaved attachment uploaded now.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::EmptyFileName`] when the file name is blank.
    pub fn new(
        task_id: TaskId,
        user_id: UserId,
        file: FileDescriptor,
        clock: &impl Clock,
    ) -> Result<Self, DomainError> {
        if file.file_name.trim().is_empty() {
            return Err(DomainError::EmptyFileName);
        }
        Ok(Self {
            id: None,
            task_id,
            user_id,
            file_name: file.file_name,
            file_url: file.file_url,
            file_type: file.file_type,
            file_size: file.file_size,
            uploaded_at: clock.utc(),
        })
    }
}
