//! Service layer for the task lifecycle.
//!
//! [`TaskService`] creates tasks with their initial members, applies partial
//! updates while recording a field-level diff in the activity log, removes a
//! task's whole aggregate inside a transaction scope, and answers the per-user
//! task views.

use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;

use super::activity::{metadata, record_activity};
use super::cascade::{Cascade, CascadeReport, remove_task_aggregate};
use super::error::{ServiceError, ServiceResult};
use super::lookup::{require_task, require_user};
use super::response::ServiceResponse;
use crate::domain::{
    Activity, ActivityType, DomainError, Member, MemberRole, Task, TaskChanges, TaskId,
    TaskPatch, TaskPriority, TaskStatus, UserId,
};
use crate::ports::{
    Entity, MemberRepository, Repository, TaskRepository, TransactionScope, UnitOfWork,
};

/// Defaults applied to newly created tasks and their members.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskSettings {
    /// Status given to tasks created without one.
    pub default_status: TaskStatus,
    /// Priority given to tasks created without one.
    pub default_priority: TaskPriority,
    /// Role given to members added through task creation or update.
    pub member_role: MemberRole,
}

/// Request payload for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    title: String,
    description: String,
    status: Option<TaskStatus>,
    priority: Option<TaskPriority>,
    due_date: Option<DateTime<Utc>>,
    tags: Vec<String>,
    member_ids: Vec<UserId>,
}

impl CreateTaskRequest {
    /// Creates a request with the required title.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            status: None,
            priority: None,
            due_date: None,
            tags: Vec::new(),
            member_ids: Vec::new(),
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the initial status.
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets the initial priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Sets the deadline.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Sets the tags.
    #[must_use]
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = String>) -> Self {
        self.tags = tags.into_iter().collect();
        self
    }

    /// Sets the initial member list. A non-empty list always gains the owner.
    #[must_use]
    pub fn with_member_ids(mut self, member_ids: impl IntoIterator<Item = UserId>) -> Self {
        self.member_ids = member_ids.into_iter().collect();
        self
    }
}

/// Task lifecycle orchestration service.
#[derive(Clone)]
pub struct TaskService<U, C>
where
    U: UnitOfWork,
    C: Clock + Send + Sync,
{
    uow: Arc<U>,
    clock: Arc<C>,
    settings: TaskSettings,
}

impl<U, C> TaskService<U, C>
where
    U: UnitOfWork,
    C: Clock + Send + Sync,
{
    /// Creates a new task service with default settings.
    #[must_use]
    pub fn new(uow: Arc<U>, clock: Arc<C>) -> Self {
        Self {
            uow,
            clock,
            settings: TaskSettings::default(),
        }
    }

    /// Replaces the creation defaults.
    #[must_use]
    pub const fn with_settings(mut self, settings: TaskSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Creates a task owned by `owner_id`.
    ///
    /// When the request carries members, the owner is added too and every
    /// listed user that exists becomes a member; unknown users are skipped.
    /// Fails with 404 for an unknown owner and 400 for a blank title.
    pub async fn create_task(
        &self,
        request: CreateTaskRequest,
        owner_id: &UserId,
    ) -> ServiceResponse<Task> {
        ServiceResponse::from_result(
            self.try_create(request, owner_id).await,
            "Task created successfully",
        )
    }

    async fn try_create(&self, request: CreateTaskRequest, owner_id: &UserId) -> ServiceResult<Task> {
        let CreateTaskRequest {
            title,
            description,
            status,
            priority,
            due_date,
            tags,
            member_ids,
        } = request;
        let uow = self.uow.as_ref();
        require_user(uow, owner_id).await?;

        let mut task = Task::new(title, description, owner_id.clone(), self.clock.as_ref())?
            .with_status(status.unwrap_or(self.settings.default_status))
            .with_priority(priority.unwrap_or(self.settings.default_priority))
            .with_tags(tags);
        if let Some(due) = due_date {
            task = task.with_due_date(due);
        }
        let task = uow.tasks().add(task).await?;
        let task_id = task.stored_id()?;

        let added = if member_ids.is_empty() {
            Vec::new()
        } else {
            let listed = std::iter::once(owner_id.clone()).chain(member_ids);
            self.add_members(&task_id, distinct(listed)).await?
        };

        let mut details = metadata([("title", Value::String(task.title.clone()))]);
        if !added.is_empty() {
            details.insert("members".to_owned(), id_values(&added));
        }
        record_activity(
            uow,
            Activity::new(
                task_id.clone(),
                owner_id.clone(),
                ActivityType::TaskCreated,
                details,
                self.clock.as_ref(),
            ),
        )
        .await?;
        tracing::info!(task_id = %task_id, owner_id = %owner_id, members = added.len(), "task created");
        Ok(task)
    }

    /// Fetches a task.
    pub async fn get_task(&self, task_id: &TaskId) -> ServiceResponse<Task> {
        ServiceResponse::from_result(
            require_task(self.uow.as_ref(), task_id).await,
            "Task retrieved successfully",
        )
    }

    /// Applies a partial update.
    ///
    /// Only fields present in the patch are written. A member list in the
    /// patch is reconciled: listed users who exist and are not yet members are
    /// added, and members not listed are removed, except the owner. One
    /// `task_updated` activity carrying the diff is written when anything
    /// changed. Fails with 404 for an unknown task and 400 for a blank title.
    pub async fn update_task(&self, task_id: &TaskId, patch: TaskPatch) -> ServiceResponse<Task> {
        ServiceResponse::from_result(
            self.try_update(task_id, patch).await,
            "Task updated successfully",
        )
    }

    async fn try_update(&self, task_id: &TaskId, patch: TaskPatch) -> ServiceResult<Task> {
        let uow = self.uow.as_ref();
        let mut task = require_task(uow, task_id).await?;
        let mut changes = task.apply_patch(&patch, self.clock.as_ref())?;
        if let Some(member_ids) = patch.member_ids {
            self.reconcile_members(&task, task_id, member_ids, &mut changes)
                .await?;
        }
        uow.tasks().update(&task).await?;

        if changes.is_empty() {
            tracing::debug!(task_id = %task_id, "task update changed nothing");
            return Ok(task);
        }
        record_activity(
            uow,
            Activity::new(
                task_id.clone(),
                task.owner_id.clone(),
                ActivityType::TaskUpdated,
                changes.to_metadata(),
                self.clock.as_ref(),
            ),
        )
        .await?;
        tracing::info!(
            task_id = %task_id,
            fields = changes.fields.len(),
            members_added = changes.members_added.len(),
            members_removed = changes.members_removed.len(),
            "task updated"
        );
        Ok(task)
    }

    async fn reconcile_members(
        &self,
        task: &Task,
        task_id: &TaskId,
        member_ids: Vec<UserId>,
        changes: &mut TaskChanges,
    ) -> ServiceResult<()> {
        let uow = self.uow.as_ref();
        let desired = distinct(member_ids);
        let existing = uow.members().find_by_task(task_id).await?;
        let current: HashSet<&UserId> = existing.iter().map(|member| &member.user_id).collect();

        let missing: Vec<UserId> = desired
            .iter()
            .filter(|user_id| !current.contains(user_id))
            .cloned()
            .collect();
        changes.members_added = self.add_members(task_id, missing).await?;

        for member in &existing {
            if member.user_id == task.owner_id || desired.contains(&member.user_id) {
                continue;
            }
            uow.members().delete(member).await?;
            changes.members_removed.push(member.user_id.clone());
        }
        Ok(())
    }

    /// Adds a membership for each existing user, returning who was added.
    async fn add_members(&self, task_id: &TaskId, user_ids: Vec<UserId>) -> ServiceResult<Vec<UserId>> {
        let uow = self.uow.as_ref();
        let mut added = Vec::new();
        for user_id in user_ids {
            if uow.users().find_by_id(&user_id).await?.is_none() {
                tracing::debug!(task_id = %task_id, user_id = %user_id, "skipping unknown member");
                continue;
            }
            let member = Member::new(
                task_id.clone(),
                user_id.clone(),
                self.settings.member_role,
                self.clock.as_ref(),
            );
            uow.members().add(member).await?;
            added.push(user_id);
        }
        Ok(added)
    }

    /// Deletes a task with its members, comments, activities and attachments.
    ///
    /// The steps run in that order inside one transaction scope. The report
    /// lists how many records each step removed. Fails with 404 for an unknown
    /// task and 500 when a step fails, naming the completed steps.
    pub async fn delete_task(&self, task_id: &TaskId) -> ServiceResponse<CascadeReport> {
        ServiceResponse::from_result(self.try_delete(task_id).await, "Task deleted successfully")
    }

    async fn try_delete(&self, task_id: &TaskId) -> ServiceResult<CascadeReport> {
        let uow = self.uow.as_ref();
        let task = require_task(uow, task_id).await?;
        let scope = TransactionScope::begin(uow)?;
        let mut cascade = Cascade::new();
        let outcome = remove_task_aggregate(scope.uow(), &task, task_id, &mut cascade)
            .await
            .map_err(ServiceError::from);
        scope.finish(outcome).await?;
        let report = cascade.finish();
        tracing::info!(task_id = %task_id, removed = report.total_removed(), "task deleted");
        Ok(report)
    }

    /// Returns the user's owned tasks followed by tasks where they hold an
    /// active membership, without repeating a task.
    ///
    /// Fails with 404 for an unknown user.
    pub async fn get_user_tasks(
        &self,
        user_id: &UserId,
        include_member_tasks: bool,
    ) -> ServiceResponse<Vec<Task>> {
        ServiceResponse::from_result(
            self.user_tasks(user_id, include_member_tasks).await,
            "Tasks retrieved successfully",
        )
    }

    async fn user_tasks(&self, user_id: &UserId, include_member_tasks: bool) -> ServiceResult<Vec<Task>> {
        let uow = self.uow.as_ref();
        require_user(uow, user_id).await?;
        let mut tasks = uow.tasks().find_by_owner(user_id).await?;
        if !include_member_tasks {
            return Ok(tasks);
        }

        let mut seen: HashSet<TaskId> = tasks.iter().filter_map(|task| task.id.clone()).collect();
        for membership in uow.members().find_by_user(user_id).await? {
            if !membership.is_active || !seen.insert(membership.task_id.clone()) {
                continue;
            }
            if let Some(task) = uow.tasks().find_by_id(&membership.task_id).await? {
                tasks.push(task);
            }
        }
        Ok(tasks)
    }

    async fn filtered_view(
        &self,
        user_id: &UserId,
        keep: impl Fn(&Task) -> bool + Send,
    ) -> ServiceResponse<Vec<Task>> {
        let result = self.user_tasks(user_id, true).await.map(|mut tasks| {
            tasks.retain(|task| keep(task));
            tasks
        });
        ServiceResponse::from_result(result, "Tasks retrieved successfully")
    }

    /// The user's tasks in `status`.
    pub async fn tasks_by_status(
        &self,
        user_id: &UserId,
        status: TaskStatus,
    ) -> ServiceResponse<Vec<Task>> {
        self.filtered_view(user_id, |task| task.status == status)
            .await
    }

    /// The user's tasks with `priority`.
    pub async fn tasks_by_priority(
        &self,
        user_id: &UserId,
        priority: TaskPriority,
    ) -> ServiceResponse<Vec<Task>> {
        self.filtered_view(user_id, |task| task.priority == priority)
            .await
    }

    /// The user's tasks carrying `tag`.
    pub async fn tasks_by_tag(&self, user_id: &UserId, tag: &str) -> ServiceResponse<Vec<Task>> {
        self.filtered_view(user_id, |task| task.has_tag(tag)).await
    }

    /// The user's tasks due within `[start, end]`.
    ///
    /// Fails with 400 when `start` is after `end`.
    pub async fn tasks_by_due_date(
        &self,
        user_id: &UserId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> ServiceResponse<Vec<Task>> {
        if start > end {
            return ServiceResponse::from_error(&DomainError::InvalidDateRange { start, end }.into());
        }
        self.filtered_view(user_id, |task| task.is_due_between(start, end))
            .await
    }

    /// The user's tasks whose title or description contains `query`,
    /// ignoring case.
    pub async fn search_tasks(&self, user_id: &UserId, query: &str) -> ServiceResponse<Vec<Task>> {
        self.filtered_view(user_id, |task| task.matches_text(query))
            .await
    }

    /// The user's tasks past their deadline and not done.
    pub async fn overdue_tasks(&self, user_id: &UserId) -> ServiceResponse<Vec<Task>> {
        let now = self.clock.utc();
        self.filtered_view(user_id, |task| task.is_overdue(now)).await
    }
}

/// Drops repeated identifiers, keeping first-seen order.
fn distinct(ids: impl IntoIterator<Item = UserId>) -> Vec<UserId> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(id.clone())).collect()
}

fn id_values(ids: &[UserId]) -> Value {
    Value::Array(
        ids.iter()
            .map(|id| Value::String(id.as_str().to_owned()))
            .collect(),
    )
}
