//! Transfer objects for stored entities and their mappings.
//!
//! Transfer objects carry identifiers and enum values as plain strings so they
//! can cross an API boundary. Mapping an entity to its transfer object and
//! back reproduces every field.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::TransferError;
use crate::domain::{
    Activity, ActivityId, ActivityMetadata, ActivityType, Attachment, AttachmentId, Comment,
    CommentId, EmailAddress, Member, MemberId, MemberRole, Task, TaskId, TaskPriority,
    TaskStatus, User, UserId,
};

fn id_string<I: AsRef<str>>(id: Option<I>) -> Option<String> {
    id.map(|value| value.as_ref().to_owned())
}

/// User transfer object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDto {
    /// Identifier, absent for unsaved users.
    pub id: Option<String>,
    /// Email address.
    pub email: String,
    /// Username.
    pub username: Option<String>,
    /// Profile picture URL.
    pub profile_picture: Option<String>,
    /// Registration time.
    pub created_at: DateTime<Utc>,
    /// Most recent sign-in.
    pub last_login: Option<DateTime<Utc>>,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: id_string(user.id),
            email: user.email.as_str().to_owned(),
            username: user.username,
            profile_picture: user.profile_picture,
            created_at: user.created_at,
            last_login: user.last_login,
        }
    }
}

impl TryFrom<UserDto> for User {
    type Error = TransferError;

    fn try_from(dto: UserDto) -> Result<Self, Self::Error> {
        Ok(Self {
            id: dto.id.map(UserId::from),
            email: EmailAddress::new(dto.email)?,
            username: dto.username,
            profile_picture: dto.profile_picture,
            created_at: dto.created_at,
            last_login: dto.last_login,
        })
    }
}

/// Task transfer object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDto {
    /// Identifier, absent for unsaved tasks.
    pub id: Option<String>,
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Status in storage form, such as `in_progress`.
    pub status: String,
    /// Priority in storage form.
    pub priority: String,
    /// Owning user.
    pub owner_id: String,
    /// Deadline.
    pub due_date: Option<DateTime<Utc>>,
    /// Tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Latest modification time.
    pub updated_at: DateTime<Utc>,
}

impl From<Task> for TaskDto {
    fn from(task: Task) -> Self {
        Self {
            id: id_string(task.id),
            title: task.title,
            description: task.description,
            status: task.status.as_str().to_owned(),
            priority: task.priority.as_str().to_owned(),
            owner_id: task.owner_id.as_str().to_owned(),
            due_date: task.due_date,
            tags: task.tags,
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }
}

impl TryFrom<TaskDto> for Task {
    type Error = TransferError;

    fn try_from(dto: TaskDto) -> Result<Self, Self::Error> {
        Ok(Self {
            id: dto.id.map(TaskId::from),
            title: dto.title,
            description: dto.description,
            status: TaskStatus::try_from(dto.status.as_str())?,
            priority: TaskPriority::try_from(dto.priority.as_str())?,
            owner_id: UserId::from(dto.owner_id),
            due_date: dto.due_date,
            tags: dto.tags,
            created_at: dto.created_at,
            updated_at: dto.updated_at,
        })
    }
}

/// Membership transfer object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberDto {
    /// Identifier, absent for unsaved rows.
    pub id: Option<String>,
    /// Member user.
    pub user_id: String,
    /// Task joined.
    pub task_id: String,
    /// Role in storage form.
    pub role: String,
    /// Inviting user.
    pub invited_by: Option<String>,
    /// Join time.
    pub joined_at: DateTime<Utc>,
    /// Whether the membership is active.
    pub is_active: bool,
    /// Last activity time.
    pub last_active: DateTime<Utc>,
}

impl From<Member> for MemberDto {
    fn from(member: Member) -> Self {
        Self {
            id: id_string(member.id),
            user_id: member.user_id.as_str().to_owned(),
            task_id: member.task_id.as_str().to_owned(),
            role: member.role.as_str().to_owned(),
            invited_by: id_string(member.invited_by),
            joined_at: member.joined_at,
            is_active: member.is_active,
            last_active: member.last_active,
        }
    }
}

impl TryFrom<MemberDto> for Member {
    type Error = TransferError;

    fn try_from(dto: MemberDto) -> Result<Self, Self::Error> {
        Ok(Self {
            id: dto.id.map(MemberId::from),
            user_id: UserId::from(dto.user_id),
            task_id: TaskId::from(dto.task_id),
            role: MemberRole::try_from(dto.role.as_str())?,
            invited_by: dto.invited_by.map(UserId::from),
            joined_at: dto.joined_at,
            is_active: dto.is_active,
            last_active: dto.last_active,
        })
    }
}

/// Comment transfer object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentDto {
    /// Identifier, absent for unsaved comments.
    pub id: Option<String>,
    /// Task commented on.
    pub task_id: String,
    /// Author.
    pub user_id: String,
    /// Text.
    pub content: String,
    /// Comment replied to.
    pub parent_comment_id: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Latest edit time.
    pub updated_at: DateTime<Utc>,
    /// Whether the comment was edited.
    pub is_edited: bool,
}

impl From<Comment> for CommentDto {
    fn from(comment: Comment) -> Self {
        Self {
            id: id_string(comment.id),
            task_id: comment.task_id.as_str().to_owned(),
            user_id: comment.user_id.as_str().to_owned(),
            content: comment.content,
            parent_comment_id: id_string(comment.parent_comment_id),
            created_at: comment.created_at,
            updated_at: comment.updated_at,
            is_edited: comment.is_edited,
        }
    }
}

impl From<CommentDto> for Comment {
    fn from(dto: CommentDto) -> Self {
        Self {
            id: dto.id.map(CommentId::from),
            task_id: TaskId::from(dto.task_id),
            user_id: UserId::from(dto.user_id),
            content: dto.content,
            parent_comment_id: dto.parent_comment_id.map(CommentId::from),
            created_at: dto.created_at,
            updated_at: dto.updated_at,
            is_edited: dto.is_edited,
        }
    }
}

/// Attachment transfer object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentDto {
    /// Identifier, absent for unsaved attachments.
    pub id: Option<String>,
    /// Task the file belongs to.
    pub task_id: String,
    /// Uploader.
    pub user_id: String,
    /// File name.
    pub file_name: String,
    /// Download URL.
    pub file_url: String,
    /// MIME type or extension.
    pub file_type: String,
    /// Size in bytes.
    pub file_size: u64,
    /// Upload time.
    pub uploaded_at: DateTime<Utc>,
}

impl From<Attachment> for AttachmentDto {
    fn from(attachment: Attachment) -> Self {
        Self {
            id: id_string(attachment.id),
            task_id: attachment.task_id.as_str().to_owned(),
            user_id: attachment.user_id.as_str().to_owned(),
            file_name: attachment.file_name,
            file_url: attachment.file_url,
            file_type: attachment.file_type,
            file_size: attachment.file_size,
            uploaded_at: attachment.uploaded_at,
        }
    }
}

impl From<AttachmentDto> for Attachment {
    fn from(dto: AttachmentDto) -> Self {
        Self {
            id: dto.id.map(AttachmentId::from),
            task_id: TaskId::from(dto.task_id),
            user_id: UserId::from(dto.user_id),
            file_name: dto.file_name,
            file_url: dto.file_url,
            file_type: dto.file_type,
            file_size: dto.file_size,
            uploaded_at: dto.uploaded_at,
        }
    }
}

/// Activity transfer object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityDto {
    /// Identifier, absent for unsaved activities.
    pub id: Option<String>,
    /// Task the activity belongs to.
    pub task_id: String,
    /// Acting user.
    pub user_id: String,
    /// Activity type in storage form.
    pub activity_type: String,
    /// Summary.
    pub description: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Free-form details.
    #[serde(default)]
    pub metadata: ActivityMetadata,
}

impl From<Activity> for ActivityDto {
    fn from(activity: Activity) -> Self {
        Self {
            id: id_string(activity.id),
            task_id: activity.task_id.as_str().to_owned(),
            user_id: activity.user_id.as_str().to_owned(),
            activity_type: activity.activity_type.as_str().to_owned(),
            description: activity.description,
            created_at: activity.created_at,
            metadata: activity.metadata,
        }
    }
}

impl TryFrom<ActivityDto> for Activity {
    type Error = TransferError;

    fn try_from(dto: ActivityDto) -> Result<Self, Self::Error> {
        Ok(Self {
            id: dto.id.map(ActivityId::from),
            task_id: TaskId::from(dto.task_id),
            user_id: UserId::from(dto.user_id),
            activity_type: ActivityType::try_from(dto.activity_type.as_str())?,
            description: dto.description,
            created_at: dto.created_at,
            metadata: dto.metadata,
        })
    }
}
