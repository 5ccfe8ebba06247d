//! Shared test helpers for in-memory board integration tests.

use mockable::DefaultClock;
use rstest::fixture;
use taskboard::{
    adapters::memory::InMemoryDocumentStore,
    app::TaskBoard,
    config::BoardConfig,
    domain::{TaskId, UserId},
    services::{CreateTaskRequest, RegisterUserRequest, ServiceResponse},
};

/// Board type used by the integration tests.
pub type TestBoard = TaskBoard<InMemoryDocumentStore, DefaultClock>;

/// Provides a fresh board with default configuration.
#[fixture]
pub fn board() -> TestBoard {
    TaskBoard::in_memory(BoardConfig::default())
}

/// Extracts the payload of a successful response.
///
/// # Errors
///
/// Returns an error carrying the response message when the call failed.
pub fn payload<T>(response: ServiceResponse<T>) -> Result<T, eyre::Report> {
    if !response.success {
        return Err(eyre::eyre!(
            "service call failed with {:?}: {}",
            response.error_code,
            response.message
        ));
    }
    response
        .into_payload()
        .ok_or_else(|| eyre::eyre!("successful response without payload"))
}

/// Registers a user and returns the identifier.
///
/// # Errors
///
/// Returns an error if registration fails.
pub async fn register(board: &TestBoard, email: &str) -> Result<UserId, eyre::Report> {
    let user = payload(
        board
            .user_service()
            .register_user(RegisterUserRequest::new(email))
            .await,
    )?;
    user.id.ok_or_else(|| eyre::eyre!("registered user has no identifier"))
}

/// Creates a task owned by `owner` and returns the identifier.
///
/// # Errors
///
/// Returns an error if task creation fails.
pub async fn create_task(
    board: &TestBoard,
    owner: &UserId,
    request: CreateTaskRequest,
) -> Result<TaskId, eyre::Report> {
    let task = payload(board.task_service().create_task(request, owner).await)?;
    task.id.ok_or_else(|| eyre::eyre!("created task has no identifier"))
}
