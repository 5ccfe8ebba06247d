//! Service layer for task membership.

use mockable::Clock;
use serde_json::Value;
use std::sync::Arc;

use super::activity::{metadata, record_activity};
use super::error::{LogFailure, ServiceError, ServiceResult};
use super::lookup::{apply_limit, require_member, require_task, require_user};
use crate::domain::{
    Activity, ActivityMetadata, ActivityType, Member, MemberId, MemberRole, TaskId, UserId,
};
use crate::ports::{Entity, MemberRepository, Repository, UnitOfWork};

/// Membership management for tasks.
///
/// At most one membership row exists per (task, user) pair. Deactivation is
/// soft: the row stays and can be reactivated.
#[derive(Clone)]
pub struct MemberService<U, C>
where
    U: UnitOfWork,
    C: Clock + Send + Sync,
{
    uow: Arc<U>,
    clock: Arc<C>,
}

impl<U, C> MemberService<U, C>
where
    U: UnitOfWork,
    C: Clock + Send + Sync,
{
    /// Creates a new member service.
    #[must_use]
    pub const fn new(uow: Arc<U>, clock: Arc<C>) -> Self {
        Self { uow, clock }
    }

    /// Adds a user to a task.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] when the task, user or inviter does
    /// not exist, or [`ServiceError::Validation`] when the user already has a
    /// membership row on the task.
    pub async fn add_member(
        &self,
        task_id: &TaskId,
        user_id: &UserId,
        role: MemberRole,
        invited_by: Option<&UserId>,
    ) -> ServiceResult<Member> {
        self.try_add_member(task_id, user_id, role, invited_by).await.logged()
    }

    /// Fetches one membership row.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] when the row does not exist.
    pub async fn get_member(&self, member_id: &MemberId) -> ServiceResult<Member> {
        require_member(self.uow.as_ref(), member_id).await.logged()
    }

    /// Lists a task's membership rows.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] when the task does not exist.
    pub async fn get_task_members(
        &self,
        task_id: &TaskId,
        limit: Option<usize>,
    ) -> ServiceResult<Vec<Member>> {
        self.try_get_task_members(task_id, limit).await.logged()
    }

    /// Lists a user's membership rows.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] when the user does not exist.
    pub async fn get_user_memberships(
        &self,
        user_id: &UserId,
        limit: Option<usize>,
    ) -> ServiceResult<Vec<Member>> {
        self.try_get_user_memberships(user_id, limit).await.logged()
    }

    /// Changes a member's role.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] when the row does not exist.
    pub async fn update_member_role(
        &self,
        member_id: &MemberId,
        role: MemberRole,
    ) -> ServiceResult<Member> {
        self.try_update_member_role(member_id, role).await.logged()
    }

    /// Deletes a membership row.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] when the row does not exist.
    pub async fn remove_member(&self, member_id: &MemberId) -> ServiceResult<()> {
        self.try_remove_member(member_id).await.logged()
    }

    /// Marks a membership inactive; a no-op when it already is.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] when the row does not exist.
    pub async fn deactivate_member(&self, member_id: &MemberId) -> ServiceResult<Member> {
        self.set_active(member_id, false).await.logged()
    }

    /// Marks a membership active again; a no-op when it already is.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] when the row does not exist.
    pub async fn reactivate_member(&self, member_id: &MemberId) -> ServiceResult<Member> {
        self.set_active(member_id, true).await.logged()
    }

    /// Stamps the member's `last_active` with the current time.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] when the row does not exist.
    pub async fn touch_last_active(&self, member_id: &MemberId) -> ServiceResult<Member> {
        self.try_touch_last_active(member_id).await.logged()
    }

    async fn set_active(&self, member_id: &MemberId, active: bool) -> ServiceResult<Member> {
        let uow = self.uow.as_ref();
        let mut member = require_member(uow, member_id).await?;
        if member.is_active == active {
            tracing::debug!(member_id = %member_id, active, "membership already in requested state");
            return Ok(member);
        }
        member.is_active = active;
        if active {
            member.last_active = self.clock.utc();
        }
        uow.members().update(&member).await?;
        let activity_type = if active {
            ActivityType::MemberReactivated
        } else {
            ActivityType::MemberDeactivated
        };
        self.record(
            &member,
            activity_type,
            metadata([("member_id", Value::String(member_id.to_string()))]),
        )
        .await?;
        tracing::info!(member_id = %member_id, active, "membership state changed");
        Ok(member)
    }

    async fn record(
        &self,
        member: &Member,
        activity_type: ActivityType,
        details: ActivityMetadata,
    ) -> ServiceResult<Activity> {
        record_activity(
            self.uow.as_ref(),
            Activity::new(
                member.task_id.clone(),
                member.user_id.clone(),
                activity_type,
                details,
                self.clock.as_ref(),
            ),
        )
        .await
    }

    async fn try_add_member(
        &self,
        task_id: &TaskId,
        user_id: &UserId,
        role: MemberRole,
        invited_by: Option<&UserId>,
    ) -> ServiceResult<Member> {
        let uow = self.uow.as_ref();
        require_task(uow, task_id).await?;
        require_user(uow, user_id).await?;
        if let Some(inviter) = invited_by {
            require_user(uow, inviter).await?;
        }
        if uow
            .members()
            .find_by_task_and_user(task_id, user_id)
            .await?
            .is_some()
        {
            return Err(ServiceError::validation(format!(
                "user '{user_id}' is already a member of task '{task_id}'"
            )));
        }

        let mut member = Member::new(task_id.clone(), user_id.clone(), role, self.clock.as_ref());
        if let Some(inviter) = invited_by {
            member = member.invited_by(inviter.clone());
        }
        let member = uow.members().add(member).await?;
        let member_id = member.stored_id()?;
        let inviter_value = invited_by.map_or(Value::Null, |id| Value::String(id.to_string()));
        record_activity(
            uow,
            Activity::new(
                task_id.clone(),
                user_id.clone(),
                ActivityType::MemberAdded,
                metadata([
                    ("member_id", Value::String(member_id.to_string())),
                    ("role", Value::String(role.as_str().to_owned())),
                    ("invited_by", inviter_value),
                ]),
                self.clock.as_ref(),
            ),
        )
        .await?;
        tracing::info!(member_id = %member_id, task_id = %task_id, user_id = %user_id, "member added");
        Ok(member)
    }

    async fn try_get_task_members(
        &self,
        task_id: &TaskId,
        limit: Option<usize>,
    ) -> ServiceResult<Vec<Member>> {
        require_task(self.uow.as_ref(), task_id).await?;
        let members = self.uow.members().find_by_task(task_id).await?;
        Ok(apply_limit(members, limit))
    }

    async fn try_get_user_memberships(
        &self,
        user_id: &UserId,
        limit: Option<usize>,
    ) -> ServiceResult<Vec<Member>> {
        require_user(self.uow.as_ref(), user_id).await?;
        let members = self.uow.members().find_by_user(user_id).await?;
        Ok(apply_limit(members, limit))
    }

    async fn try_update_member_role(
        &self,
        member_id: &MemberId,
        role: MemberRole,
    ) -> ServiceResult<Member> {
        let uow = self.uow.as_ref();
        let mut member = require_member(uow, member_id).await?;
        let previous = member.role;
        member.role = role;
        uow.members().update(&member).await?;
        self.record(
            &member,
            ActivityType::MemberRoleUpdated,
            metadata([
                ("member_id", Value::String(member_id.to_string())),
                ("old_role", Value::String(previous.as_str().to_owned())),
                ("new_role", Value::String(role.as_str().to_owned())),
            ]),
        )
        .await?;
        tracing::info!(member_id = %member_id, role = role.as_str(), "member role updated");
        Ok(member)
    }

    async fn try_remove_member(&self, member_id: &MemberId) -> ServiceResult<()> {
        let uow = self.uow.as_ref();
        let member = require_member(uow, member_id).await?;
        uow.members().delete(&member).await?;
        self.record(
            &member,
            ActivityType::MemberRemoved,
            metadata([("member_id", Value::String(member_id.to_string()))]),
        )
        .await?;
        tracing::info!(member_id = %member_id, "member removed");
        Ok(())
    }

    async fn try_touch_last_active(&self, member_id: &MemberId) -> ServiceResult<Member> {
        let uow = self.uow.as_ref();
        let mut member = require_member(uow, member_id).await?;
        member.last_active = self.clock.utc();
        uow.members().update(&member).await?;
        Ok(member)
    }
}
