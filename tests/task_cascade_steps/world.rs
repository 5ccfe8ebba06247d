//! Shared world state for cascading deletion BDD scenarios.

use std::collections::HashMap;

use mockable::DefaultClock;
use rstest::fixture;
use taskboard::{
    adapters::memory::InMemoryDocumentStore,
    app::TaskBoard,
    config::BoardConfig,
    domain::{TaskId, UserId},
    services::{CascadeReport, ServiceResponse},
};

/// Board type used by the BDD world.
pub type TestBoard = TaskBoard<InMemoryDocumentStore, DefaultClock>;

/// Scenario world for cascade behaviour tests.
pub struct CascadeWorld {
    pub board: TestBoard,
    pub users: HashMap<String, UserId>,
    pub task: Option<TaskId>,
    pub last_deletion: Option<ServiceResponse<CascadeReport>>,
}

impl CascadeWorld {
    /// Creates a world over an empty board.
    #[must_use]
    pub fn new() -> Self {
        Self {
            board: TaskBoard::in_memory(BoardConfig::default()),
            users: HashMap::new(),
            task: None,
            last_deletion: None,
        }
    }

    /// Looks up a user registered earlier in the scenario.
    ///
    /// # Errors
    ///
    /// Returns an error if no user with `email` was registered.
    pub fn user(&self, email: &str) -> Result<UserId, eyre::Report> {
        self.users
            .get(email)
            .cloned()
            .ok_or_else(|| eyre::eyre!("user {email} was not registered in this scenario"))
    }

    /// Returns the task created earlier in the scenario.
    ///
    /// # Errors
    ///
    /// Returns an error if no task was created.
    pub fn task(&self) -> Result<TaskId, eyre::Report> {
        self.task
            .clone()
            .ok_or_else(|| eyre::eyre!("missing task in scenario world"))
    }
}

impl Default for CascadeWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> CascadeWorld {
    CascadeWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
