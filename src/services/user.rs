//! Service layer for user registration, profile maintenance and removal.

use mockable::Clock;
use std::sync::Arc;

use super::cascade::{Cascade, CascadeReport, remove_task_aggregate, remove_user_footprint};
use super::error::{EntityKind, ServiceError, ServiceResult};
use super::lookup::require_user;
use super::response::ServiceResponse;
use crate::domain::{
    Activity, Comment, EmailAddress, Member, Task, TaskId, User, UserId, UserPatch,
};
use crate::ports::{
    ActivityRepository, CommentRepository, Entity, MemberRepository, Repository, TaskRepository,
    TransactionScope, UnitOfWork, UserRepository,
};

/// Request payload for registering a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterUserRequest {
    email: String,
    username: Option<String>,
    profile_picture: Option<String>,
    external_id: Option<UserId>,
}

impl RegisterUserRequest {
    /// Creates a request for `email`.
    #[must_use]
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            username: None,
            profile_picture: None,
            external_id: None,
        }
    }

    /// Sets the username.
    #[must_use]
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Sets the profile picture URL.
    #[must_use]
    pub fn with_profile_picture(mut self, url: impl Into<String>) -> Self {
        self.profile_picture = Some(url.into());
        self
    }

    /// Stores the user under an identifier issued by an identity provider
    /// instead of a store-generated one.
    #[must_use]
    pub fn with_external_id(mut self, id: UserId) -> Self {
        self.external_id = Some(id);
        self
    }
}

/// A user together with the records that reference them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDetails {
    /// The user.
    pub user: User,
    /// Tasks the user owns.
    pub owned_tasks: Vec<Task>,
    /// The user's membership rows.
    pub memberships: Vec<Member>,
    /// Comments the user wrote.
    pub comments: Vec<Comment>,
    /// Activities the user performed.
    pub activities: Vec<Activity>,
}

/// User registration and profile orchestration.
#[derive(Clone)]
pub struct UserService<U, C>
where
    U: UnitOfWork,
    C: Clock + Send + Sync,
{
    uow: Arc<U>,
    clock: Arc<C>,
}

impl<U, C> UserService<U, C>
where
    U: UnitOfWork,
    C: Clock + Send + Sync,
{
    /// Creates a new user service.
    #[must_use]
    pub const fn new(uow: Arc<U>, clock: Arc<C>) -> Self {
        Self { uow, clock }
    }

    /// Registers a user with a unique email and, optionally, a unique username.
    ///
    /// Fails with 400 for a malformed email and 409 when the email, username
    /// or external identifier is taken.
    pub async fn register_user(&self, request: RegisterUserRequest) -> ServiceResponse<User> {
        ServiceResponse::from_result(
            self.try_register(request).await,
            "User registered successfully",
        )
    }

    async fn try_register(&self, request: RegisterUserRequest) -> ServiceResult<User> {
        let RegisterUserRequest {
            email,
            username,
            profile_picture,
            external_id,
        } = request;
        let uow = self.uow.as_ref();
        let email = EmailAddress::new(email)?;
        self.ensure_email_free(&email, None).await?;
        if let Some(name) = username.as_deref() {
            self.ensure_username_free(name, None).await?;
        }
        if let Some(id) = external_id.as_ref()
            && uow.users().find_by_id(id).await?.is_some()
        {
            return Err(ServiceError::conflict(format!("user id '{id}' already registered")));
        }

        let mut user = User::new(email, username, self.clock.as_ref());
        user.profile_picture = profile_picture;
        user.id = external_id;
        let user = uow.users().add(user).await?;
        let user_id = user.stored_id()?;
        tracing::info!(user_id = %user_id, "user registered");
        Ok(user)
    }

    /// Fetches a user.
    pub async fn get_user(&self, user_id: &UserId) -> ServiceResponse<User> {
        ServiceResponse::from_result(
            require_user(self.uow.as_ref(), user_id).await,
            "User retrieved successfully",
        )
    }

    /// Fetches a user with owned tasks, memberships, comments and activities.
    pub async fn get_user_details(&self, user_id: &UserId) -> ServiceResponse<UserDetails> {
        ServiceResponse::from_result(
            self.try_details(user_id).await,
            "User details retrieved successfully",
        )
    }

    async fn try_details(&self, user_id: &UserId) -> ServiceResult<UserDetails> {
        let uow = self.uow.as_ref();
        let user = require_user(uow, user_id).await?;
        Ok(UserDetails {
            user,
            owned_tasks: uow.tasks().find_by_owner(user_id).await?,
            memberships: uow.members().find_by_user(user_id).await?,
            comments: uow.comments().find_by_user(user_id).await?,
            activities: uow.activities().find_by_user(user_id).await?,
        })
    }

    /// Looks a user up by email address.
    pub async fn find_by_email(&self, email: &str) -> ServiceResponse<User> {
        let result: ServiceResult<User> = async {
            let address = EmailAddress::new(email)?;
            self.uow
                .users()
                .find_by_email(&address)
                .await?
                .ok_or_else(|| ServiceError::not_found(EntityKind::User, address))
        }
        .await;
        ServiceResponse::from_result(result, "User retrieved successfully")
    }

    /// Looks a user up by username.
    pub async fn find_by_username(&self, username: &str) -> ServiceResponse<User> {
        let result: ServiceResult<User> = async {
            self.uow
                .users()
                .find_by_username(username)
                .await?
                .ok_or_else(|| ServiceError::not_found(EntityKind::User, username))
        }
        .await;
        ServiceResponse::from_result(result, "User retrieved successfully")
    }

    /// Applies a profile patch.
    ///
    /// Fails with 404 for an unknown user, 400 for a malformed email and 409
    /// when the email or username belongs to another user.
    pub async fn update_user(&self, user_id: &UserId, patch: UserPatch) -> ServiceResponse<User> {
        ServiceResponse::from_result(
            self.try_update(user_id, patch).await,
            "User details updated successfully",
        )
    }

    async fn try_update(&self, user_id: &UserId, patch: UserPatch) -> ServiceResult<User> {
        let UserPatch {
            email,
            username,
            profile_picture,
        } = patch;
        let mut user = require_user(self.uow.as_ref(), user_id).await?;
        if let Some(email) = email {
            let email = EmailAddress::new(email)?;
            self.ensure_email_free(&email, Some(user_id)).await?;
            user.email = email;
        }
        if let Some(name) = username {
            self.ensure_username_free(&name, Some(user_id)).await?;
            user.username = Some(name);
        }
        if let Some(url) = profile_picture {
            user.profile_picture = Some(url);
        }
        self.uow.users().update(&user).await?;
        tracing::info!(user_id = %user_id, "user updated");
        Ok(user)
    }

    /// Stamps the user's last sign-in time.
    pub async fn record_login(&self, user_id: &UserId) -> ServiceResponse<User> {
        let result = async {
            let mut user = require_user(self.uow.as_ref(), user_id).await?;
            user.last_login = Some(self.clock.utc());
            self.uow.users().update(&user).await?;
            tracing::debug!(user_id = %user_id, "login recorded");
            Ok::<User, ServiceError>(user)
        }
        .await;
        ServiceResponse::from_result(result, "Login recorded")
    }

    /// Deletes a user, the aggregates of every task they own, and their rows
    /// on other tasks.
    pub async fn delete_user(&self, user_id: &UserId) -> ServiceResponse<CascadeReport> {
        ServiceResponse::from_result(self.try_delete(user_id).await, "User deleted successfully")
    }

    async fn try_delete(&self, user_id: &UserId) -> ServiceResult<CascadeReport> {
        let uow = self.uow.as_ref();
        let user = require_user(uow, user_id).await?;
        let owned = uow.tasks().find_by_owner(user_id).await?;
        let owned_ids = owned
            .iter()
            .map(Entity::stored_id)
            .collect::<Result<Vec<TaskId>, _>>()?;

        let scope = TransactionScope::begin(uow)?;
        let scoped = scope.uow();
        let mut cascade = Cascade::new();
        let outcome = async {
            for (task, task_id) in owned.iter().zip(&owned_ids) {
                remove_task_aggregate(scoped, task, task_id, &mut cascade).await?;
            }
            remove_user_footprint(scoped, user_id, &owned_ids, &mut cascade).await?;
            cascade
                .step("user", async {
                    scoped.users().delete(&user).await?;
                    Ok(1)
                })
                .await?;
            Ok::<(), ServiceError>(())
        }
        .await;
        scope.finish(outcome).await?;
        let report = cascade.finish();
        tracing::info!(
            user_id = %user_id,
            tasks = owned_ids.len(),
            removed = report.total_removed(),
            "user deleted"
        );
        Ok(report)
    }

    async fn ensure_email_free(
        &self,
        email: &EmailAddress,
        owner: Option<&UserId>,
    ) -> ServiceResult<()> {
        let existing = self.uow.users().find_by_email(email).await?;
        if existing.is_some_and(|user| user.id.as_ref() != owner) {
            return Err(ServiceError::conflict(format!("email '{email}' already in use")));
        }
        Ok(())
    }

    async fn ensure_username_free(
        &self,
        username: &str,
        owner: Option<&UserId>,
    ) -> ServiceResult<()> {
        let existing = self.uow.users().find_by_username(username).await?;
        if existing.is_some_and(|user| user.id.as_ref() != owner) {
            return Err(ServiceError::conflict(format!(
                "username '{username}' already in use"
            )));
        }
        Ok(())
    }
}
