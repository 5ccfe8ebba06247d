//! Inbound request payloads and their conversion into service requests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::error::TransferError;
use crate::domain::{ParseValueError, TaskPatch, TaskPriority, TaskStatus, UserId, UserPatch};
use crate::services::{CreateTaskRequest, RegisterUserRequest};

fn parse_optional<T>(value: Option<&str>) -> Result<Option<T>, TransferError>
where
    T: for<'a> TryFrom<&'a str, Error = ParseValueError>,
{
    value.map(T::try_from).transpose().map_err(TransferError::from)
}

/// Wraps any present value, `null` included, so an absent field stays `None`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Payload for creating a task.
///
/// Omitted status and priority fall back to the board's configured defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateTaskDto {
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Initial status.
    pub status: Option<String>,
    /// Initial priority.
    pub priority: Option<String>,
    /// Deadline.
    pub due_date: Option<DateTime<Utc>>,
    /// Tags.
    pub tags: Vec<String>,
    /// Users to add as members.
    pub member_ids: Vec<String>,
}

impl TryFrom<CreateTaskDto> for CreateTaskRequest {
    type Error = TransferError;

    fn try_from(dto: CreateTaskDto) -> Result<Self, Self::Error> {
        let mut request = Self::new(dto.title)
            .with_description(dto.description)
            .with_tags(dto.tags)
            .with_member_ids(dto.member_ids.into_iter().map(UserId::from));
        if let Some(status) = parse_optional::<TaskStatus>(dto.status.as_deref())? {
            request = request.with_status(status);
        }
        if let Some(priority) = parse_optional::<TaskPriority>(dto.priority.as_deref())? {
            request = request.with_priority(priority);
        }
        if let Some(due_date) = dto.due_date {
            request = request.with_due_date(due_date);
        }
        Ok(request)
    }
}

/// Partial task update. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateTaskDto {
    /// Replacement title.
    pub title: Option<String>,
    /// Replacement description.
    pub description: Option<String>,
    /// Replacement status.
    pub status: Option<String>,
    /// Replacement priority.
    pub priority: Option<String>,
    /// Replacement deadline; an explicit `null` clears it.
    #[serde(
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<Option<DateTime<Utc>>>,
    /// Replacement tags.
    pub tags: Option<Vec<String>>,
    /// Desired member list.
    pub member_ids: Option<Vec<String>>,
}

impl TryFrom<UpdateTaskDto> for TaskPatch {
    type Error = TransferError;

    fn try_from(dto: UpdateTaskDto) -> Result<Self, Self::Error> {
        Ok(Self {
            title: dto.title,
            description: dto.description,
            status: parse_optional(dto.status.as_deref())?,
            priority: parse_optional(dto.priority.as_deref())?,
            due_date: dto.due_date,
            tags: dto.tags,
            member_ids: dto
                .member_ids
                .map(|ids| ids.into_iter().map(UserId::from).collect()),
        })
    }
}

/// Payload for registering a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterUserDto {
    /// Email address.
    pub email: String,
    /// Username.
    #[serde(default)]
    pub username: Option<String>,
    /// Profile picture URL.
    #[serde(default)]
    pub profile_picture: Option<String>,
    /// Identifier issued by an identity provider.
    #[serde(default)]
    pub external_id: Option<String>,
}

impl From<RegisterUserDto> for RegisterUserRequest {
    fn from(dto: RegisterUserDto) -> Self {
        let mut request = Self::new(dto.email);
        if let Some(username) = dto.username {
            request = request.with_username(username);
        }
        if let Some(url) = dto.profile_picture {
            request = request.with_profile_picture(url);
        }
        if let Some(id) = dto.external_id {
            request = request.with_external_id(UserId::from(id));
        }
        request
    }
}

/// Partial profile update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateUserDto {
    /// Replacement email.
    pub email: Option<String>,
    /// Replacement username.
    pub username: Option<String>,
    /// Replacement profile picture URL.
    pub profile_picture: Option<String>,
}

impl From<UpdateUserDto> for UserPatch {
    fn from(dto: UpdateUserDto) -> Self {
        Self {
            email: dto.email,
            username: dto.username,
            profile_picture: dto.profile_picture,
        }
    }
}
