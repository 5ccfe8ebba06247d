//! Task membership rows linking users to tasks.

use super::{MemberId, ParseValueError, TaskId, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Role a member holds on a task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    /// Owns the task.
    Owner,
    /// May manage the task and its members.
    Admin,
    /// Regular collaborator.
    #[default]
    Member,
    /// Read-only participant.
    Viewer,
}

impl MemberRole {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Admin => "admin",
            Self::Member => "member",
            Self::Viewer => "viewer",
        }
    }
}

impl TryFrom<&str> for MemberRole {
    type Error = ParseValueError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "owner" => Ok(Self::Owner),
            "admin" => Ok(Self::Admin),
            "member" => Ok(Self::Member),
            "viewer" => Ok(Self::Viewer),
            _ => Err(ParseValueError::new("member role", value)),
        }
    }
}

/// A user's membership in one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// Store-assigned identifier; `None` until persisted.
    #[serde(skip)]
    pub id: Option<MemberId>,
    /// Member user.
    pub user_id: UserId,
    /// Task the user belongs to.
    pub task_id: TaskId,
    /// Role on the task.
    pub role: MemberRole,
    /// User who added this member, if recorded.
    pub invited_by: Option<UserId>,
    /// When the membership was created.
    pub joined_at: DateTime<Utc>,
    /// Soft-deactivation flag.
    pub is_active: bool,
    /// Last time the member was seen on the task.
    pub last_active: DateTime<Utc>,
}

impl Member {
    /// Creates an unsaved, active membership starting now.
    #[must_use]
    pub fn new(task_id: TaskId, user_id: UserId, role: MemberRole, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id: None,
            user_id,
            task_id,
            role,
            invited_by: None,
            joined_at: timestamp,
            is_active: true,
            last_active: timestamp,
        }
    }

    /// Records who invited the member.
    #[must_use]
    pub fn invited_by(mut self, inviter: UserId) -> Self {
        self.invited_by = Some(inviter);
        self
    }
}
