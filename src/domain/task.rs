//! Task records, their status and priority, and partial-update diffs.

use super::{DomainError, ParseValueError, TaskId, UserId};
use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet};

/// Task workflow status.
///
/// Any status may be set from any other; no transition table is enforced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not started.
    Todo,
    /// Being worked on.
    InProgress,
    /// Awaiting review.
    Review,
    /// Finished.
    Done,
    /// Open, default for newly created tasks.
    #[default]
    Active,
}

impl TaskStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in_progress",
            Self::Review => "review",
            Self::Done => "done",
            Self::Active => "active",
        }
    }

    /// Returns `true` for the status that ends a task's work.
    #[must_use]
    pub const fn is_completed(self) -> bool {
        matches!(self, Self::Done)
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseValueError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "todo" => Ok(Self::Todo),
            "in_progress" => Ok(Self::InProgress),
            "review" => Ok(Self::Review),
            "done" => Ok(Self::Done),
            "active" => Ok(Self::Active),
            _ => Err(ParseValueError::new("task status", value)),
        }
    }
}

/// Task priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    /// Can wait.
    Low,
    /// Normal priority.
    #[default]
    Medium,
    /// Should be handled soon.
    High,
    /// Needs immediate attention.
    Urgent,
}

impl TaskPriority {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

impl TryFrom<&str> for TaskPriority {
    type Error = ParseValueError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "urgent" => Ok(Self::Urgent),
            _ => Err(ParseValueError::new("task priority", value)),
        }
    }
}

/// A unit of work owned by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Store-assigned identifier; `None` until persisted.
    #[serde(skip)]
    pub id: Option<TaskId>,
    /// Short summary.
    pub title: String,
    /// Free-form details.
    pub description: String,
    /// Workflow status.
    pub status: TaskStatus,
    /// Priority.
    pub priority: TaskPriority,
    /// Owning user.
    pub owner_id: UserId,
    /// Deadline, if any.
    pub due_date: Option<DateTime<Utc>>,
    /// Distinct labels in insertion order.
    pub tags: Vec<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Latest modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates an unsaved task owned by `owner_id`.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::EmptyTaskTitle`] when the title is blank.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        owner_id: UserId,
        clock: &impl Clock,
    ) -> Result<Self, DomainError> {
        let title = validated_title(title.into())?;
        let timestamp = clock.utc();
        Ok(Self {
            id: None,
            title,
            description: description.into(),
            status: TaskStatus::default(),
            priority: TaskPriority::default(),
            owner_id,
            due_date: None,
            tags: Vec::new(),
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Sets the initial status.
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets the initial priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the deadline.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Sets the tags, dropping blanks and repeats.
    #[must_use]
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = String>) -> Self {
        self.tags = normalize_tags(tags);
        self
    }

    /// Returns `true` when the task carries `tag`.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|existing| existing == tag)
    }

    /// Returns `true` when the deadline has passed and the task is not done.
    #[must_use]
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.status.is_completed() && self.due_date.is_some_and(|due| due < now)
    }

    /// Returns `true` when the deadline falls within `[start, end]`.
    #[must_use]
    pub fn is_due_between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.due_date.is_some_and(|due| start <= due && due <= end)
    }

    /// Case-insensitive substring match against title and description.
    #[must_use]
    pub fn matches_text(&self, query: &str) -> bool {
        let needle = query.to_lowercase();
        self.title.to_lowercase().contains(&needle)
            || self.description.to_lowercase().contains(&needle)
    }

    /// Applies the field part of `patch`, returning what changed.
    ///
    /// Only fields present in the patch and different from the current value
    /// are recorded. `updated_at` always advances, even when nothing changed.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::EmptyTaskTitle`] when the patch carries a blank
    /// title; the task is left untouched in that case.
    pub fn apply_patch(
        &mut self,
        patch: &TaskPatch,
        clock: &impl Clock,
    ) -> Result<TaskChanges, DomainError> {
        let title = patch.title.clone().map(validated_title).transpose()?;
        let mut changes = TaskChanges::default();

        if let Some(new_title) = title
            && new_title != self.title
        {
            changes.record("title", text(&self.title), text(&new_title));
            self.title = new_title;
        }
        if let Some(description) = &patch.description
            && *description != self.description
        {
            changes.record("description", text(&self.description), text(description));
            self.description.clone_from(description);
        }
        if let Some(status) = patch.status
            && status != self.status
        {
            changes.record("status", text(self.status.as_str()), text(status.as_str()));
            self.status = status;
        }
        if let Some(priority) = patch.priority
            && priority != self.priority
        {
            changes.record(
                "priority",
                text(self.priority.as_str()),
                text(priority.as_str()),
            );
            self.priority = priority;
        }
        if let Some(due_date) = patch.due_date
            && due_date != self.due_date
        {
            changes.record("due_date", timestamp(self.due_date), timestamp(due_date));
            self.due_date = due_date;
        }
        if let Some(tags) = &patch.tags {
            let tags = normalize_tags(tags.iter().cloned());
            if tags != self.tags {
                changes.record("tags", string_list(&self.tags), string_list(&tags));
                self.tags = tags;
            }
        }

        self.touch(clock);
        Ok(changes)
    }

    /// Advances `updated_at` to the clock time, keeping it strictly increasing.
    pub fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = advance(self.updated_at, clock.utc());
    }
}

/// Partial update for a task; only `Some` fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    /// Replacement title.
    pub title: Option<String>,
    /// Replacement description.
    pub description: Option<String>,
    /// Replacement status.
    pub status: Option<TaskStatus>,
    /// Replacement priority.
    pub priority: Option<TaskPriority>,
    /// Replacement deadline; `Some(None)` clears it.
    pub due_date: Option<Option<DateTime<Utc>>>,
    /// Replacement tag list.
    pub tags: Option<Vec<String>>,
    /// Full desired member list; the owner is never removed.
    pub member_ids: Option<Vec<UserId>>,
}

impl TaskPatch {
    /// Sets the replacement title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the replacement description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the replacement status.
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets the replacement priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Sets the replacement deadline.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(Some(due_date));
        self
    }

    /// Removes the deadline.
    #[must_use]
    pub const fn clear_due_date(mut self) -> Self {
        self.due_date = Some(None);
        self
    }

    /// Sets the replacement tag list.
    #[must_use]
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = String>) -> Self {
        self.tags = Some(tags.into_iter().collect());
        self
    }

    /// Sets the desired member list.
    #[must_use]
    pub fn with_member_ids(mut self, member_ids: impl IntoIterator<Item = UserId>) -> Self {
        self.member_ids = Some(member_ids.into_iter().collect());
        self
    }
}

/// Old and new value of one changed field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldChange {
    /// Value before the update.
    pub old: Value,
    /// Value after the update.
    pub new: Value,
}

/// Structured diff produced by a task update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskChanges {
    /// Changed scalar and list fields keyed by field name.
    pub fields: BTreeMap<&'static str, FieldChange>,
    /// Users who became members.
    pub members_added: Vec<UserId>,
    /// Users whose membership was removed.
    pub members_removed: Vec<UserId>,
}

impl TaskChanges {
    fn record(&mut self, field: &'static str, old: Value, new: Value) {
        self.fields.insert(field, FieldChange { old, new });
    }

    /// Returns `true` when the update changed nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.members_added.is_empty() && self.members_removed.is_empty()
    }

    /// Renders the diff as activity metadata under a `changes` key.
    #[must_use]
    pub fn to_metadata(&self) -> Map<String, Value> {
        let mut changes = Map::new();
        for (field, change) in &self.fields {
            let mut pair = Map::new();
            pair.insert("old".to_owned(), change.old.clone());
            pair.insert("new".to_owned(), change.new.clone());
            changes.insert((*field).to_owned(), Value::Object(pair));
        }
        if !self.members_added.is_empty() || !self.members_removed.is_empty() {
            let mut members = Map::new();
            if !self.members_added.is_empty() {
                members.insert("added".to_owned(), id_list(&self.members_added));
            }
            if !self.members_removed.is_empty() {
                members.insert("removed".to_owned(), id_list(&self.members_removed));
            }
            changes.insert("members".to_owned(), Value::Object(members));
        }
        let mut metadata = Map::new();
        metadata.insert("changes".to_owned(), Value::Object(changes));
        metadata
    }
}

fn validated_title(title: String) -> Result<String, DomainError> {
    if title.trim().is_empty() {
        return Err(DomainError::EmptyTaskTitle);
    }
    Ok(title)
}

/// Drops blank and repeated tags while keeping first-seen order.
fn normalize_tags(tags: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    tags.into_iter()
        .filter(|tag| !tag.trim().is_empty())
        .filter(|tag| seen.insert(tag.clone()))
        .collect()
}

/// Returns `now`, or one microsecond past `previous` when the clock lags.
pub(crate) fn advance(previous: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    if now > previous {
        now
    } else {
        previous + TimeDelta::microseconds(1)
    }
}

fn text(value: &str) -> Value {
    Value::String(value.to_owned())
}

fn timestamp(value: Option<DateTime<Utc>>) -> Value {
    value.map_or(Value::Null, |at| Value::String(at.to_rfc3339()))
}

fn string_list(values: &[String]) -> Value {
    Value::Array(values.iter().cloned().map(Value::String).collect())
}

fn id_list(ids: &[UserId]) -> Value {
    Value::Array(
        ids.iter()
            .map(|id| Value::String(id.as_str().to_owned()))
            .collect(),
    )
}
