//! Integration tests feeding transfer objects through live services.

use super::helpers::{TestBoard, board, payload, register};
use rstest::rstest;
use serde_json::json;
use taskboard::{
    domain::{TaskPatch, TaskPriority, UserPatch},
    services::{CreateTaskRequest, RegisterUserRequest},
    transfer::{CreateTaskDto, RegisterUserDto, TaskDto, UpdateTaskDto, UpdateUserDto, UserDto},
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn json_payloads_drive_task_lifecycle(board: TestBoard) -> Result<(), eyre::Report> {
    let owner = register(&board, "owner@example.com").await?;
    let create: CreateTaskDto = serde_json::from_value(json!({
        "title": "From JSON",
        "priority": "urgent",
        "tags": ["api", "api", "json"]
    }))?;
    let request = CreateTaskRequest::try_from(create)?;
    let task = payload(board.task_service().create_task(request, &owner).await)?;
    let task_id = task.id.clone().ok_or_else(|| eyre::eyre!("missing task id"))?;

    let update: UpdateTaskDto = serde_json::from_value(json!({"status": "in_progress"}))?;
    let updated = payload(
        board
            .task_service()
            .update_task(&task_id, TaskPatch::try_from(update)?)
            .await,
    )?;
    let dto = TaskDto::from(updated);

    eyre::ensure!(task.priority == TaskPriority::Urgent, "priority not parsed");
    eyre::ensure!(dto.tags == ["api", "json"], "tags not normalised: {:?}", dto.tags);
    eyre::ensure!(dto.status == "in_progress", "status not updated");
    eyre::ensure!(dto.id.as_deref() == Some(task_id.as_str()), "id not carried");
    Ok(())
}

#[rstest]
fn unknown_priority_is_rejected() {
    let dto = CreateTaskDto {
        title: "Bad".to_owned(),
        priority: Some("someday".to_owned()),
        ..CreateTaskDto::default()
    };

    let result = CreateTaskRequest::try_from(dto);

    assert!(result.is_err());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn user_payloads_round_trip_through_service(board: TestBoard) -> Result<(), eyre::Report> {
    let register_dto: RegisterUserDto = serde_json::from_value(json!({
        "email": "dto@example.com",
        "username": "dto"
    }))?;
    let user = payload(
        board
            .user_service()
            .register_user(RegisterUserRequest::from(register_dto))
            .await,
    )?;
    let user_id = user.id.clone().ok_or_else(|| eyre::eyre!("missing user id"))?;

    let update = UpdateUserDto {
        profile_picture: Some("https://img.example.com/dto.png".to_owned()),
        ..UpdateUserDto::default()
    };
    let updated = payload(
        board
            .user_service()
            .update_user(&user_id, UserPatch::from(update))
            .await,
    )?;
    let encoded = serde_json::to_value(UserDto::from(updated))?;

    eyre::ensure!(encoded["username"] == json!("dto"), "username lost");
    eyre::ensure!(
        encoded["profile_picture"] == json!("https://img.example.com/dto.png"),
        "profile picture not updated"
    );
    eyre::ensure!(encoded["id"] == json!(user_id.as_str()), "id not serialised");
    Ok(())
}
