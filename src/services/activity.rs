//! Service layer for the task activity log.

use chrono::{DateTime, Utc};
use mockable::Clock;
use serde_json::Value;
use std::sync::Arc;

use super::cascade::delete_each;
use super::error::{LogFailure, ServiceResult};
use super::lookup::{apply_limit, require_activity, require_task, require_user};
use crate::domain::{
    Activity, ActivityId, ActivityMetadata, ActivityType, DomainError, TaskId, UserId,
};
use crate::ports::{ActivityRepository, Repository, UnitOfWork};

/// Appends an activity and returns it with its identifier.
pub(crate) async fn record_activity<U: UnitOfWork>(
    uow: &U,
    activity: Activity,
) -> ServiceResult<Activity> {
    let stored = uow.activities().add(activity).await?;
    tracing::debug!(
        task_id = %stored.task_id,
        activity_type = stored.activity_type.as_str(),
        "activity recorded"
    );
    Ok(stored)
}

/// Builds activity metadata from key/value pairs.
pub(crate) fn metadata<const N: usize>(pairs: [(&str, Value); N]) -> ActivityMetadata {
    pairs
        .into_iter()
        .map(|(key, value)| (key.to_owned(), value))
        .collect()
}

/// Read and maintenance operations on the activity log.
#[derive(Clone)]
pub struct ActivityService<U, C>
where
    U: UnitOfWork,
    C: Clock + Send + Sync,
{
    uow: Arc<U>,
    clock: Arc<C>,
}

impl<U, C> ActivityService<U, C>
where
    U: UnitOfWork,
    C: Clock + Send + Sync,
{
    /// Creates a new activity service.
    #[must_use]
    pub const fn new(uow: Arc<U>, clock: Arc<C>) -> Self {
        Self { uow, clock }
    }

    /// Records an activity on an existing task by an existing user.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`](super::ServiceError::NotFound) when
    /// the task or user does not exist.
    pub async fn create_activity(
        &self,
        task_id: &TaskId,
        user_id: &UserId,
        activity_type: ActivityType,
        metadata: ActivityMetadata,
    ) -> ServiceResult<Activity> {
        self.try_create_activity(task_id, user_id, activity_type, metadata).await.logged()
    }

    /// Fetches one activity.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`](super::ServiceError::NotFound) when
    /// the activity does not exist.
    pub async fn get_activity(&self, activity_id: &ActivityId) -> ServiceResult<Activity> {
        require_activity(self.uow.as_ref(), activity_id).await.logged()
    }

    /// Lists activities recorded on a task.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`](super::ServiceError::NotFound) when
    /// the task does not exist.
    pub async fn get_task_activities(
        &self,
        task_id: &TaskId,
        limit: Option<usize>,
    ) -> ServiceResult<Vec<Activity>> {
        self.try_get_task_activities(task_id, limit).await.logged()
    }

    /// Lists activities performed by a user.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`](super::ServiceError::NotFound) when
    /// the user does not exist.
    pub async fn get_user_activities(
        &self,
        user_id: &UserId,
        limit: Option<usize>,
    ) -> ServiceResult<Vec<Activity>> {
        self.try_get_user_activities(user_id, limit).await.logged()
    }

    /// Lists a task's activities of one type.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`](super::ServiceError::NotFound) when
    /// the task does not exist.
    pub async fn get_activities_by_type(
        &self,
        task_id: &TaskId,
        activity_type: ActivityType,
    ) -> ServiceResult<Vec<Activity>> {
        self.try_get_activities_by_type(task_id, activity_type).await.logged()
    }

    /// Lists a task's activities created within `[start, end]`.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`](super::ServiceError::NotFound) when
    /// the task does not exist, or a domain error when `start` is after `end`.
    pub async fn get_activities_by_date_range(
        &self,
        task_id: &TaskId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> ServiceResult<Vec<Activity>> {
        self.try_get_activities_by_date_range(task_id, start, end).await.logged()
    }

    /// Deletes one activity.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`](super::ServiceError::NotFound) when
    /// the activity does not exist.
    pub async fn delete_activity(&self, activity_id: &ActivityId) -> ServiceResult<()> {
        self.try_delete_activity(activity_id).await.logged()
    }

    /// Deletes every activity on a task, returning how many were removed.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`](super::ServiceError::NotFound) when
    /// the task does not exist.
    pub async fn delete_task_activities(&self, task_id: &TaskId) -> ServiceResult<usize> {
        self.try_delete_task_activities(task_id).await.logged()
    }

    async fn try_create_activity(
        &self,
        task_id: &TaskId,
        user_id: &UserId,
        activity_type: ActivityType,
        metadata: ActivityMetadata,
    ) -> ServiceResult<Activity> {
        require_task(self.uow.as_ref(), task_id).await?;
        require_user(self.uow.as_ref(), user_id).await?;
        let activity = Activity::new(
            task_id.clone(),
            user_id.clone(),
            activity_type,
            metadata,
            self.clock.as_ref(),
        );
        record_activity(self.uow.as_ref(), activity).await
    }

    async fn try_get_task_activities(
        &self,
        task_id: &TaskId,
        limit: Option<usize>,
    ) -> ServiceResult<Vec<Activity>> {
        require_task(self.uow.as_ref(), task_id).await?;
        let activities = self.uow.activities().find_by_task(task_id).await?;
        Ok(apply_limit(activities, limit))
    }

    async fn try_get_user_activities(
        &self,
        user_id: &UserId,
        limit: Option<usize>,
    ) -> ServiceResult<Vec<Activity>> {
        require_user(self.uow.as_ref(), user_id).await?;
        let activities = self.uow.activities().find_by_user(user_id).await?;
        Ok(apply_limit(activities, limit))
    }

    async fn try_get_activities_by_type(
        &self,
        task_id: &TaskId,
        activity_type: ActivityType,
    ) -> ServiceResult<Vec<Activity>> {
        require_task(self.uow.as_ref(), task_id).await?;
        let mut activities = self
            .uow
            .activities()
            .find_by_activity_type(activity_type)
            .await?;
        activities.retain(|activity| activity.task_id == *task_id);
        Ok(activities)
    }

    async fn try_get_activities_by_date_range(
        &self,
        task_id: &TaskId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> ServiceResult<Vec<Activity>> {
        require_task(self.uow.as_ref(), task_id).await?;
        if start > end {
            return Err(DomainError::InvalidDateRange { start, end }.into());
        }
        let mut activities = self.uow.activities().find_by_task(task_id).await?;
        activities.retain(|activity| start <= activity.created_at && activity.created_at <= end);
        Ok(activities)
    }

    async fn try_delete_activity(&self, activity_id: &ActivityId) -> ServiceResult<()> {
        let activity = require_activity(self.uow.as_ref(), activity_id).await?;
        self.uow.activities().delete(&activity).await?;
        tracing::info!(activity_id = %activity_id, "activity deleted");
        Ok(())
    }

    async fn try_delete_task_activities(&self, task_id: &TaskId) -> ServiceResult<usize> {
        require_task(self.uow.as_ref(), task_id).await?;
        let activities = self.uow.activities().find_by_task(task_id).await?;
        let removed = delete_each(self.uow.activities(), activities).await?;
        tracing::info!(task_id = %task_id, removed, "task activities deleted");
        Ok(removed)
    }
}
