//! Append-only activity log entries.

use super::{ActivityId, ParseValueError, TaskId, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Free-form activity metadata.
pub type ActivityMetadata = Map<String, Value>;

/// Kind of action an activity records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    /// A task was created.
    TaskCreated,
    /// Task fields or members changed.
    TaskUpdated,
    /// A task was deleted.
    TaskDeleted,
    /// A comment was posted.
    CommentAdded,
    /// A comment was edited.
    CommentUpdated,
    /// A comment was deleted.
    CommentDeleted,
    /// A file was attached.
    AttachmentAdded,
    /// An attachment was removed.
    AttachmentDeleted,
    /// A member joined the task.
    MemberAdded,
    /// A member left the task.
    MemberRemoved,
    /// A member's role changed.
    MemberRoleUpdated,
    /// A membership was soft-deactivated.
    MemberDeactivated,
    /// A membership was reactivated.
    MemberReactivated,
    /// The task status changed.
    StatusChanged,
    /// The task assignee changed.
    AssigneeChanged,
}

impl ActivityType {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TaskCreated => "task_created",
            Self::TaskUpdated => "task_updated",
            Self::TaskDeleted => "task_deleted",
            Self::CommentAdded => "comment_added",
            Self::CommentUpdated => "comment_updated",
            Self::CommentDeleted => "comment_deleted",
            Self::AttachmentAdded => "attachment_added",
            Self::AttachmentDeleted => "attachment_deleted",
            Self::MemberAdded => "member_added",
            Self::MemberRemoved => "member_removed",
            Self::MemberRoleUpdated => "member_role_updated",
            Self::MemberDeactivated => "member_deactivated",
            Self::MemberReactivated => "member_reactivated",
            Self::StatusChanged => "status_changed",
            Self::AssigneeChanged => "assignee_changed",
        }
    }
}

impl TryFrom<&str> for ActivityType {
    type Error = ParseValueError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "task_created" => Ok(Self::TaskCreated),
            "task_updated" => Ok(Self::TaskUpdated),
            "task_deleted" => Ok(Self::TaskDeleted),
            "comment_added" => Ok(Self::CommentAdded),
            "comment_updated" => Ok(Self::CommentUpdated),
            "comment_deleted" => Ok(Self::CommentDeleted),
            "attachment_added" => Ok(Self::AttachmentAdded),
            "attachment_deleted" => Ok(Self::AttachmentDeleted),
            "member_added" => Ok(Self::MemberAdded),
            "member_removed" => Ok(Self::MemberRemoved),
            "member_role_updated" => Ok(Self::MemberRoleUpdated),
            "member_deactivated" => Ok(Self::MemberDeactivated),
            "member_reactivated" => Ok(Self::MemberReactivated),
            "status_changed" => Ok(Self::StatusChanged),
            "assignee_changed" => Ok(Self::AssigneeChanged),
            _ => Err(ParseValueError::new("activity type", value)),
        }
    }
}

/// One immutable audit entry attached to a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    /// Store-assigned identifier; `None` until persisted.
    #[serde(skip)]
    pub id: Option<ActivityId>,
    /// Task the action happened on.
    pub task_id: TaskId,
    /// Acting user.
    pub user_id: UserId,
    /// Kind of action.
    pub activity_type: ActivityType,
    /// Human-readable summary.
    pub description: String,
    /// When the action happened.
    pub created_at: DateTime<Utc>,
    /// Action-specific details.
    #[serde(default)]
    pub metadata: ActivityMetadata,
}

impl Activity {
    /// Creates an unsaved activity timestamped now.
    #[must_use]
    pub fn new(
        task_id: TaskId,
        user_id: UserId,
        activity_type: ActivityType,
        metadata: ActivityMetadata,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id: None,
            task_id,
            user_id,
            activity_type,
            description: default_description(activity_type).to_owned(),
            created_at: clock.utc(),
            metadata,
        }
    }

    /// Overrides the generated description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

const fn default_description(activity_type: ActivityType) -> &'static str {
    match activity_type {
        ActivityType::TaskCreated => "Task created",
        ActivityType::TaskUpdated => "Task updated",
        ActivityType::TaskDeleted => "Task deleted",
        ActivityType::CommentAdded => "Comment added",
        ActivityType::CommentUpdated => "Comment updated",
        ActivityType::CommentDeleted => "Comment deleted",
        ActivityType::AttachmentAdded => "Attachment added",
        ActivityType::AttachmentDeleted => "Attachment deleted",
        ActivityType::MemberAdded => "Member added",
        ActivityType::MemberRemoved => "Member removed",
        ActivityType::MemberRoleUpdated => "Member role updated",
        ActivityType::MemberDeactivated => "Member deactivated",
        ActivityType::MemberReactivated => "Member reactivated",
        ActivityType::StatusChanged => "Status changed",
        ActivityType::AssigneeChanged => "Assignee changed",
    }
}
