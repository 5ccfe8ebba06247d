//! Task comments and replies.

use super::{CommentId, DomainError, TaskId, UserId, task::advance};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// A comment on a task, optionally replying to another comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Store-assigned identifier; `None` until persisted.
    #[serde(skip)]
    pub id: Option<CommentId>,
    /// Task the comment belongs to.
    pub task_id: TaskId,
    /// Author.
    pub user_id: UserId,
    /// Comment body.
    pub content: String,
    /// Comment this one replies to, on the same task.
    pub parent_comment_id: Option<CommentId>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Latest edit timestamp.
    pub updated_at: DateTime<Utc>,
    /// Whether the content was edited after posting.
    pub is_edited: bool,
}

impl Comment {
    /// Creates an unsaved top-level comment.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::EmptyCommentContent`] when the content is blank.
    pub fn new(
        task_id: TaskId,
        user_id: UserId,
        content: impl Into<String>,
        clock: &impl Clock,
    ) -> Result<Self, DomainError> {
        let content = validated_content(content.into())?;
        let timestamp = clock.utc();
        Ok(Self {
            id: None,
            task_id,
            user_id,
            content,
            parent_comment_id: None,
            created_at: timestamp,
            updated_at: timestamp,
            is_edited: false,
        })
    }

    /// Marks the comment as a reply to `parent`.
    #[must_use]
    pub fn replying_to(mut self, parent: CommentId) -> Self {
        self.parent_comment_id = Some(parent);
        self
    }

    /// Replaces the content and flags the comment as edited.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::EmptyCommentContent`] when the content is blank.
    pub fn edit(&mut self, content: impl Into<String>, clock: &impl Clock) -> Result<(), DomainError> {
        self.content = validated_content(content.into())?;
        self.is_edited = true;
        self.updated_at = advance(self.updated_at, clock.utc());
        Ok(())
    }
}

fn validated_content(content: String) -> Result<String, DomainError> {
    if content.trim().is_empty() {
        return Err(DomainError::EmptyCommentContent);
    }
    Ok(content)
}
