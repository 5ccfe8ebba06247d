//! Ordered cascade deletion with per-step accounting.
//!
//! A cascade runs named steps one after another. Each step reports how many
//! records it removed. The first failing step stops the cascade, and the
//! error carries the steps that had already completed.

use std::future::Future;
use thiserror::Error;

use crate::domain::{Task, TaskId, UserId};
use crate::ports::{
    ActivityRepository, AttachmentRepository, CommentRepository, Entity, MemberRepository,
    Repository, RepositoryError, RepositoryResult, UnitOfWork,
};

/// One completed cascade step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CascadeStep {
    /// What the step removed, for example `members` or `task`.
    pub target: &'static str,
    /// Number of records removed.
    pub removed: usize,
}

/// Steps completed by a cascade, in execution order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CascadeReport {
    /// Completed steps.
    pub steps: Vec<CascadeStep>,
}

impl CascadeReport {
    /// Total records removed for `target` across all steps.
    #[must_use]
    pub fn removed(&self, target: &str) -> usize {
        self.steps
            .iter()
            .filter(|step| step.target == target)
            .map(|step| step.removed)
            .sum()
    }

    /// Total records removed by every step.
    #[must_use]
    pub fn total_removed(&self) -> usize {
        self.steps.iter().map(|step| step.removed).sum()
    }
}

/// A cascade step failed.
#[derive(Debug, Clone, Error)]
#[error("cascade step '{failed}' failed after {} completed steps: {source}", .completed.len())]
pub struct CascadeError {
    /// Steps that completed before the failure.
    pub completed: Vec<CascadeStep>,
    /// Target of the failing step.
    pub failed: &'static str,
    /// Underlying repository failure.
    pub source: RepositoryError,
}

/// Runs cascade steps and accumulates the report.
#[derive(Debug, Default)]
pub(crate) struct Cascade {
    report: CascadeReport,
}

impl Cascade {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Runs one step, recording it on success.
    pub(crate) async fn step(
        &mut self,
        target: &'static str,
        run: impl Future<Output = RepositoryResult<usize>>,
    ) -> Result<(), CascadeError> {
        match run.await {
            Ok(removed) => {
                tracing::debug!(target_name = target, removed, "cascade step completed");
                self.report.steps.push(CascadeStep { target, removed });
                Ok(())
            }
            Err(source) => Err(CascadeError {
                completed: self.report.steps.clone(),
                failed: target,
                source,
            }),
        }
    }

    pub(crate) fn finish(self) -> CascadeReport {
        self.report
    }
}

/// Deletes every entity in `entities`, returning how many were deleted.
pub(crate) async fn delete_each<T, R>(repository: &R, entities: Vec<T>) -> RepositoryResult<usize>
where
    T: Entity,
    R: Repository<T> + ?Sized,
{
    let count = entities.len();
    for entity in &entities {
        repository.delete(entity).await?;
    }
    Ok(count)
}

/// Removes a task and everything that references it.
///
/// Order: members, comments, activities, attachments, then the task.
pub(crate) async fn remove_task_aggregate<U: UnitOfWork>(
    uow: &U,
    task: &Task,
    task_id: &TaskId,
    cascade: &mut Cascade,
) -> Result<(), CascadeError> {
    cascade
        .step("members", async {
            let rows = uow.members().find_by_task(task_id).await?;
            delete_each(uow.members(), rows).await
        })
        .await?;
    cascade
        .step("comments", async {
            let rows = uow.comments().find_by_task(task_id).await?;
            delete_each(uow.comments(), rows).await
        })
        .await?;
    cascade
        .step("activities", async {
            let rows = uow.activities().find_by_task(task_id).await?;
            delete_each(uow.activities(), rows).await
        })
        .await?;
    cascade
        .step("attachments", async {
            let rows = uow.attachments().find_by_task(task_id).await?;
            delete_each(uow.attachments(), rows).await
        })
        .await?;
    cascade
        .step("task", async {
            uow.tasks().delete(task).await?;
            Ok(1)
        })
        .await
}

/// Removes a user's rows on tasks the user does not own, then the user.
///
/// Rows on `owned` tasks are skipped because their aggregates are removed
/// separately.
pub(crate) async fn remove_user_footprint<U: UnitOfWork>(
    uow: &U,
    user_id: &UserId,
    owned: &[TaskId],
    cascade: &mut Cascade,
) -> Result<(), CascadeError> {
    let elsewhere = |task_id: &TaskId| !owned.contains(task_id);
    cascade
        .step("members", async {
            let mut rows = uow.members().find_by_user(user_id).await?;
            rows.retain(|row| elsewhere(&row.task_id));
            delete_each(uow.members(), rows).await
        })
        .await?;
    cascade
        .step("comments", async {
            let mut rows = uow.comments().find_by_user(user_id).await?;
            rows.retain(|row| elsewhere(&row.task_id));
            delete_each(uow.comments(), rows).await
        })
        .await?;
    cascade
        .step("attachments", async {
            let mut rows = uow.attachments().find_by_user(user_id).await?;
            rows.retain(|row| elsewhere(&row.task_id));
            delete_each(uow.attachments(), rows).await
        })
        .await?;
    cascade
        .step("activities", async {
            let mut rows = uow.activities().find_by_user(user_id).await?;
            rows.retain(|row| elsewhere(&row.task_id));
            delete_each(uow.activities(), rows).await
        })
        .await
}
