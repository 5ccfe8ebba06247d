//! Composition root wiring the store, units of work and services.
//!
//! Every service handed out by [`TaskBoard`] gets a [`DocumentUnitOfWork`]
//! over the shared store. Cascades stage their writes on a fork of that unit
//! of work, so one service can be shared across concurrently running tasks.

use mockable::{Clock, DefaultClock};
use std::sync::Arc;

use crate::adapters::DocumentUnitOfWork;
use crate::adapters::memory::InMemoryDocumentStore;
use crate::config::BoardConfig;
use crate::ports::DocumentStore;
use crate::services::{
    ActivityService, AttachmentService, CommentService, MemberService, TaskService, UserService,
};

/// Unit of work type produced by [`TaskBoard`].
pub type BoardUnitOfWork<S> = DocumentUnitOfWork<S>;

/// Shared handles from which services are built.
#[derive(Debug)]
pub struct TaskBoard<S, C = DefaultClock> {
    store: Arc<S>,
    clock: Arc<C>,
    config: BoardConfig,
}

impl<S, C> Clone for TaskBoard<S, C> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            clock: Arc::clone(&self.clock),
            config: self.config.clone(),
        }
    }
}

impl TaskBoard<InMemoryDocumentStore> {
    /// Builds a board over a fresh in-memory store and the system clock.
    #[must_use]
    pub fn in_memory(config: BoardConfig) -> Self {
        Self::new(
            Arc::new(InMemoryDocumentStore::new()),
            Arc::new(DefaultClock),
            config,
        )
    }
}

impl<S, C> TaskBoard<S, C>
where
    S: DocumentStore,
    C: Clock + Send + Sync,
{
    /// Builds a board over an existing store and clock.
    #[must_use]
    pub const fn new(store: Arc<S>, clock: Arc<C>, config: BoardConfig) -> Self {
        Self {
            store,
            clock,
            config,
        }
    }

    /// Returns the active configuration.
    #[must_use]
    pub const fn config(&self) -> &BoardConfig {
        &self.config
    }

    /// Returns the shared store handle.
    #[must_use]
    pub const fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Builds a new unit of work in the configured transaction mode.
    #[must_use]
    pub fn unit_of_work(&self) -> Arc<BoardUnitOfWork<S>> {
        Arc::new(DocumentUnitOfWork::new(
            Arc::clone(&self.store),
            self.config.unit_of_work.mode,
        ))
    }

    /// Builds a task service applying the configured task defaults.
    #[must_use]
    pub fn task_service(&self) -> TaskService<BoardUnitOfWork<S>, C> {
        TaskService::new(self.unit_of_work(), Arc::clone(&self.clock))
            .with_settings(self.config.tasks)
    }

    /// Builds a user service.
    #[must_use]
    pub fn user_service(&self) -> UserService<BoardUnitOfWork<S>, C> {
        UserService::new(self.unit_of_work(), Arc::clone(&self.clock))
    }

    /// Builds a comment service.
    #[must_use]
    pub fn comment_service(&self) -> CommentService<BoardUnitOfWork<S>, C> {
        CommentService::new(self.unit_of_work(), Arc::clone(&self.clock))
    }

    /// Builds an attachment service.
    #[must_use]
    pub fn attachment_service(&self) -> AttachmentService<BoardUnitOfWork<S>, C> {
        AttachmentService::new(self.unit_of_work(), Arc::clone(&self.clock))
    }

    /// Builds a member service.
    #[must_use]
    pub fn member_service(&self) -> MemberService<BoardUnitOfWork<S>, C> {
        MemberService::new(self.unit_of_work(), Arc::clone(&self.clock))
    }

    /// Builds an activity service.
    #[must_use]
    pub fn activity_service(&self) -> ActivityService<BoardUnitOfWork<S>, C> {
        ActivityService::new(self.unit_of_work(), Arc::clone(&self.clock))
    }
}
