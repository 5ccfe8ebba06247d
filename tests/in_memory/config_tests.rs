//! Integration tests for boards built from configuration text.

use taskboard::{
    app::TaskBoard,
    config::BoardConfig,
    domain::{TaskPriority, TaskStatus},
    ports::TransactionMode,
    services::{CreateTaskRequest, RegisterUserRequest},
};
use super::helpers::payload;

#[tokio::test(flavor = "multi_thread")]
async fn configured_defaults_apply_to_new_tasks() -> Result<(), eyre::Report> {
    let config = BoardConfig::from_toml_str(
        r#"
        [unit_of_work]
        mode = "immediate"

        [tasks]
        default_status = "review"
        default_priority = "high"
        "#,
    )?;
    let board = TaskBoard::in_memory(config);
    eyre::ensure!(
        board.config().unit_of_work.mode == TransactionMode::Immediate,
        "mode not applied"
    );

    let owner = payload(
        board
            .user_service()
            .register_user(RegisterUserRequest::new("cfg@example.com"))
            .await,
    )?;
    let owner_id = owner.id.ok_or_else(|| eyre::eyre!("missing user id"))?;
    let task = payload(
        board
            .task_service()
            .create_task(CreateTaskRequest::new("Configured"), &owner_id)
            .await,
    )?;

    eyre::ensure!(task.status == TaskStatus::Review, "default status ignored");
    eyre::ensure!(task.priority == TaskPriority::High, "default priority ignored");
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn immediate_mode_cascades_complete() -> Result<(), eyre::Report> {
    let config = BoardConfig::from_toml_str("[unit_of_work]\nmode = \"immediate\"\n")?;
    let board = TaskBoard::in_memory(config);
    let owner = payload(
        board
            .user_service()
            .register_user(RegisterUserRequest::new("imm@example.com"))
            .await,
    )?;
    let owner_id = owner.id.ok_or_else(|| eyre::eyre!("missing user id"))?;
    let task = payload(
        board
            .task_service()
            .create_task(CreateTaskRequest::new("Gone soon"), &owner_id)
            .await,
    )?;
    let task_id = task.id.ok_or_else(|| eyre::eyre!("missing task id"))?;

    let report = payload(board.task_service().delete_task(&task_id).await)?;

    eyre::ensure!(report.removed("activities") == 1, "creation activity not removed");
    Ok(())
}
