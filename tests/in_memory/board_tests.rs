//! Integration tests exercising services built from one board.

use super::helpers::{TestBoard, board, create_task, payload, register};
use taskboard::{
    domain::{ActivityType, FileDescriptor, MemberRole, TaskPatch, TaskStatus},
    services::CreateTaskRequest,
};
use rstest::rstest;
use serde_json::json;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn services_share_one_store(board: TestBoard) -> Result<(), eyre::Report> {
    let owner = register(&board, "owner@example.com").await?;
    let helper = register(&board, "helper@example.com").await?;
    let task = create_task(
        &board,
        &owner,
        CreateTaskRequest::new("Ship release").with_member_ids([helper.clone()]),
    )
    .await?;

    let members = board.member_service().get_task_members(&task, None).await?;
    let memberships = board
        .member_service()
        .get_user_memberships(&helper, None)
        .await?;

    eyre::ensure!(members.len() == 2, "expected owner and helper rows");
    eyre::ensure!(
        memberships
            .first()
            .is_some_and(|row| row.role == MemberRole::Member),
        "helper should hold the configured member role"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn status_change_is_logged(board: TestBoard) -> Result<(), eyre::Report> {
    let owner = register(&board, "owner@example.com").await?;
    let task = create_task(&board, &owner, CreateTaskRequest::new("Write docs")).await?;

    let updated = payload(
        board
            .task_service()
            .update_task(&task, TaskPatch::default().with_status(TaskStatus::Done))
            .await,
    )?;
    let updates = board
        .activity_service()
        .get_activities_by_type(&task, ActivityType::TaskUpdated)
        .await?;

    eyre::ensure!(updated.status == TaskStatus::Done, "status not applied");
    let update = updates
        .first()
        .ok_or_else(|| eyre::eyre!("expected a task_updated activity"))?;
    eyre::ensure!(
        update.metadata.get("changes").and_then(|changes| changes.get("status"))
            == Some(&json!({"old": "active", "new": "done"})),
        "status diff missing from {:?}",
        update.metadata
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deleting_task_clears_dependents(board: TestBoard) -> Result<(), eyre::Report> {
    let owner = register(&board, "owner@example.com").await?;
    let task = create_task(&board, &owner, CreateTaskRequest::new("Short lived")).await?;
    board
        .comment_service()
        .create_comment(&task, &owner, "Note", None)
        .await?;
    board
        .attachment_service()
        .upload_attachment(
            &task,
            &owner,
            FileDescriptor::new("plan.txt", "https://files.example.com/plan.txt", "text/plain", 12),
        )
        .await?;

    let report = payload(board.task_service().delete_task(&task).await)?;

    eyre::ensure!(report.removed("task") == 1, "task step missing");
    eyre::ensure!(report.removed("comments") == 1, "comment not removed");
    eyre::ensure!(report.removed("attachments") == 1, "attachment not removed");
    let comments = board.comment_service().get_user_comments(&owner, None).await?;
    eyre::ensure!(comments.is_empty(), "orphaned comments remain");
    let lookup = board.task_service().get_task(&task).await;
    eyre::ensure!(lookup.error_code == Some(404), "task still resolvable");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deleting_user_removes_owned_tasks(board: TestBoard) -> Result<(), eyre::Report> {
    let owner = register(&board, "owner@example.com").await?;
    let other = register(&board, "other@example.com").await?;
    let owned = create_task(&board, &owner, CreateTaskRequest::new("Mine")).await?;
    let foreign = create_task(&board, &other, CreateTaskRequest::new("Theirs")).await?;
    board
        .comment_service()
        .create_comment(&foreign, &owner, "Drive-by", None)
        .await?;

    let report = payload(board.user_service().delete_user(&owner).await)?;

    eyre::ensure!(report.removed("task") == 1, "owned task not removed");
    eyre::ensure!(
        board.task_service().get_task(&owned).await.error_code == Some(404),
        "owned task still present"
    );
    let remaining = board
        .comment_service()
        .get_task_comments(&foreign, None)
        .await?;
    eyre::ensure!(remaining.is_empty(), "comment on foreign task survived");
    eyre::ensure!(
        board.task_service().get_task(&foreign).await.success,
        "foreign task should survive"
    );
    Ok(())
}
