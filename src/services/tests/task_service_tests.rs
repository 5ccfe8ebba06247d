//! Tests for task creation, updates, cascades and per-user views.

use std::sync::Arc;

use super::fixtures::{Harness, harness};
use crate::domain::{
    ActivityType, FileDescriptor, MemberRole, TaskId, TaskPatch, TaskPriority, TaskStatus, UserId,
};
use crate::ports::{
    AttachmentRepository, CommentRepository, MemberRepository, Repository, UnitOfWork,
};
use crate::services::{CreateTaskRequest, TaskService, TaskSettings};
use chrono::TimeDelta;
use rstest::rstest;
use serde_json::json;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_task_applies_defaults_and_logs(harness: Harness) {
    let owner = harness.user("owner@example.com").await;

    let response = harness
        .tasks()
        .create_task(
            CreateTaskRequest::new("Plan launch").with_tags(["launch".to_owned()]),
            &owner,
        )
        .await;

    assert!(response.success);
    assert_eq!(response.message, "Task created successfully");
    assert_eq!(response.error_code, None);
    let task = response.payload.expect("task payload");
    let task_id = task.id.clone().expect("identifier assigned");
    assert_eq!(task.status, TaskStatus::Active);
    assert_eq!(task.priority, TaskPriority::Medium);
    assert_eq!(task.owner_id, owner);

    let log = harness.activity_log(&task_id).await;
    assert_eq!(log.len(), 1);
    let created = log.first().expect("one activity");
    assert_eq!(created.activity_type, ActivityType::TaskCreated);
    assert_eq!(created.metadata.get("title"), Some(&json!("Plan launch")));
    assert!(
        harness
            .uow
            .members()
            .find_by_task(&task_id)
            .await
            .expect("members readable")
            .is_empty()
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_task_for_unknown_owner_is_not_found(harness: Harness) {
    let response = harness
        .tasks()
        .create_task(CreateTaskRequest::new("Orphan"), &UserId::new("ghost"))
        .await;

    assert!(!response.success);
    assert_eq!(response.error_code, Some(404));
    assert_eq!(response.payload, None);
    assert!(harness.uow.tasks().get_all().await.expect("readable").is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_task_with_blank_title_is_rejected(harness: Harness) {
    let owner = harness.user("owner@example.com").await;

    let response = harness
        .tasks()
        .create_task(CreateTaskRequest::new("   "), &owner)
        .await;

    assert_eq!(response.error_code, Some(400));
    assert_eq!(response.message, "task title must not be empty");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_task_adds_owner_and_known_members(harness: Harness) {
    let owner = harness.user("owner@example.com").await;
    let teammate = harness.user("mate@example.com").await;

    let task = harness
        .tasks()
        .create_task(
            CreateTaskRequest::new("Team task").with_member_ids([
                teammate.clone(),
                UserId::new("ghost"),
                teammate.clone(),
            ]),
            &owner,
        )
        .await
        .into_payload()
        .expect("task created");
    let task_id = task.id.expect("identifier assigned");

    let members = harness
        .uow
        .members()
        .find_by_task(&task_id)
        .await
        .expect("members readable");
    let users: Vec<&UserId> = members.iter().map(|member| &member.user_id).collect();
    assert_eq!(users, vec![&owner, &teammate]);
    assert!(members.iter().all(|member| member.role == MemberRole::Member));

    let log = harness.activity_log(&task_id).await;
    assert_eq!(log.len(), 1);
    assert_eq!(
        log.first().and_then(|activity| activity.metadata.get("members")),
        Some(&json!([owner.as_str(), teammate.as_str()]))
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn configured_settings_shape_new_tasks(harness: Harness) {
    let owner = harness.user("owner@example.com").await;
    let mate = harness.user("mate@example.com").await;
    let service = TaskService::new(Arc::clone(&harness.uow), Arc::clone(&harness.clock))
        .with_settings(TaskSettings {
            default_status: TaskStatus::Todo,
            default_priority: TaskPriority::Low,
            member_role: MemberRole::Viewer,
        });

    let task = service
        .create_task(CreateTaskRequest::new("Configured").with_member_ids([mate]), &owner)
        .await
        .into_payload()
        .expect("task created");

    assert_eq!(task.status, TaskStatus::Todo);
    assert_eq!(task.priority, TaskPriority::Low);
    let members = harness
        .uow
        .members()
        .find_by_task(task.id.as_ref().expect("identifier assigned"))
        .await
        .expect("members readable");
    assert!(members.iter().all(|member| member.role == MemberRole::Viewer));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn update_records_field_diff(harness: Harness) {
    let owner = harness.user("owner@example.com").await;
    let task_id = harness.task(&owner, "Draft").await;

    let response = harness
        .tasks()
        .update_task(
            &task_id,
            TaskPatch::default()
                .with_status(TaskStatus::InProgress)
                .with_title("Draft"),
        )
        .await;

    assert!(response.success);
    assert_eq!(response.message, "Task updated successfully");
    let log = harness.activity_log(&task_id).await;
    let updated = log.last().expect("update logged");
    assert_eq!(updated.activity_type, ActivityType::TaskUpdated);
    assert_eq!(updated.user_id, owner);
    assert_eq!(
        updated.metadata.get("changes"),
        Some(&json!({ "status": { "old": "active", "new": "in_progress" } }))
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn update_can_clear_due_date(harness: Harness) {
    let owner = harness.user("owner@example.com").await;
    let due = harness.clock.0 + TimeDelta::days(2);
    let task_id = harness
        .tasks()
        .create_task(CreateTaskRequest::new("Deadline").with_due_date(due), &owner)
        .await
        .into_payload()
        .and_then(|task| task.id)
        .expect("task created");

    let updated = harness
        .tasks()
        .update_task(&task_id, TaskPatch::default().clear_due_date())
        .await
        .into_payload()
        .expect("task updated");

    assert_eq!(updated.due_date, None);
    let stored = harness
        .tasks()
        .get_task(&task_id)
        .await
        .into_payload()
        .expect("task exists");
    assert_eq!(stored.due_date, None);
    let log = harness.activity_log(&task_id).await;
    assert_eq!(
        log.last().and_then(|activity| activity.metadata.get("changes")),
        Some(&json!({ "due_date": { "old": due.to_rfc3339(), "new": null } }))
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn update_without_changes_skips_activity(harness: Harness) {
    let owner = harness.user("owner@example.com").await;
    let task_id = harness.task(&owner, "Stable").await;
    let before = harness
        .tasks()
        .get_task(&task_id)
        .await
        .into_payload()
        .expect("task exists");

    let after = harness
        .tasks()
        .update_task(&task_id, TaskPatch::default().with_title("Stable"))
        .await
        .into_payload()
        .expect("task updated");

    assert!(after.updated_at > before.updated_at);
    assert_eq!(
        harness.activity_types(&task_id).await,
        vec![ActivityType::TaskCreated]
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn update_reconciles_member_list(harness: Harness) {
    let owner = harness.user("owner@example.com").await;
    let leaving = harness.user("leaving@example.com").await;
    let joining = harness.user("joining@example.com").await;
    let task_id = harness
        .tasks()
        .create_task(
            CreateTaskRequest::new("Rotating").with_member_ids([leaving.clone()]),
            &owner,
        )
        .await
        .into_payload()
        .and_then(|task| task.id)
        .expect("task created");

    harness
        .tasks()
        .update_task(
            &task_id,
            TaskPatch::default().with_member_ids([joining.clone()]),
        )
        .await
        .into_payload()
        .expect("task updated");

    let mut users: Vec<UserId> = harness
        .uow
        .members()
        .find_by_task(&task_id)
        .await
        .expect("members readable")
        .into_iter()
        .map(|member| member.user_id)
        .collect();
    users.sort();
    let mut expected = vec![owner.clone(), joining.clone()];
    expected.sort();
    assert_eq!(users, expected);

    let log = harness.activity_log(&task_id).await;
    assert_eq!(
        log.last().and_then(|activity| activity.metadata.get("changes")),
        Some(&json!({
            "members": { "added": [joining.as_str()], "removed": [leaving.as_str()] }
        }))
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn update_unknown_task_is_not_found(harness: Harness) {
    let response = harness
        .tasks()
        .update_task(&TaskId::new("missing"), TaskPatch::default())
        .await;
    assert_eq!(response.error_code, Some(404));
    assert_eq!(response.message, "task 'missing' not found");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn delete_removes_whole_aggregate_in_order(harness: Harness) {
    let owner = harness.user("owner@example.com").await;
    let mate = harness.user("mate@example.com").await;
    let doomed = harness.task(&owner, "Doomed").await;
    let survivor = harness.task(&owner, "Survivor").await;
    harness.join(&doomed, &mate).await;
    harness
        .comments()
        .create_comment(&doomed, &mate, "bye", None)
        .await
        .expect("comment created");
    harness
        .attachments()
        .upload_attachment(
            &doomed,
            &mate,
            FileDescriptor::new("notes.txt", "https://files.example.com/n", "text/plain", 12),
        )
        .await
        .expect("attachment uploaded");

    let report = harness
        .tasks()
        .delete_task(&doomed)
        .await
        .into_payload()
        .expect("task deleted");

    let targets: Vec<&str> = report.steps.iter().map(|step| step.target).collect();
    assert_eq!(
        targets,
        vec!["members", "comments", "activities", "attachments", "task"]
    );
    assert_eq!(report.removed("members"), 1);
    assert_eq!(report.removed("comments"), 1);
    assert_eq!(report.removed("activities"), 4);
    assert_eq!(report.removed("attachments"), 1);
    assert_eq!(report.removed("task"), 1);

    let uow = harness.uow.as_ref();
    assert!(uow.tasks().find_by_id(&doomed).await.expect("readable").is_none());
    assert!(uow.members().find_by_task(&doomed).await.expect("readable").is_empty());
    assert!(uow.comments().find_by_task(&doomed).await.expect("readable").is_empty());
    assert!(uow.attachments().find_by_task(&doomed).await.expect("readable").is_empty());
    assert!(harness.activity_log(&doomed).await.is_empty());
    assert!(!uow.in_transaction());
    assert!(uow.tasks().find_by_id(&survivor).await.expect("readable").is_some());
    assert_eq!(harness.activity_log(&survivor).await.len(), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn delete_unknown_task_is_not_found(harness: Harness) {
    let response = harness.tasks().delete_task(&TaskId::new("missing")).await;
    assert_eq!(response.error_code, Some(404));
    assert!(!harness.uow.in_transaction());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn user_tasks_merge_owned_and_active_memberships(harness: Harness) {
    let ada = harness.user("ada@example.com").await;
    let bob = harness.user("bob@example.com").await;
    let owned = harness.task(&ada, "Owned").await;
    let shared = harness.task(&bob, "Shared").await;
    let dropped = harness.task(&bob, "Dropped").await;
    harness.join(&owned, &ada).await;
    harness.join(&shared, &ada).await;
    harness.join(&dropped, &ada).await;
    let inactive = harness
        .members()
        .get_user_memberships(&ada, None)
        .await
        .expect("memberships readable")
        .into_iter()
        .find(|member| member.task_id == dropped)
        .and_then(|member| member.id)
        .expect("membership exists");
    harness
        .members()
        .deactivate_member(&inactive)
        .await
        .expect("deactivated");

    let titles: Vec<String> = harness
        .tasks()
        .get_user_tasks(&ada, true)
        .await
        .into_payload()
        .expect("tasks listed")
        .into_iter()
        .map(|task| task.title)
        .collect();
    let owned_only = harness
        .tasks()
        .get_user_tasks(&ada, false)
        .await
        .into_payload()
        .expect("tasks listed");

    assert_eq!(titles, vec!["Owned".to_owned(), "Shared".to_owned()]);
    assert_eq!(owned_only.len(), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn user_tasks_for_unknown_user_is_not_found(harness: Harness) {
    let response = harness
        .tasks()
        .get_user_tasks(&UserId::new("ghost"), true)
        .await;
    assert_eq!(response.error_code, Some(404));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn filtered_views_narrow_user_tasks(harness: Harness) {
    let owner = harness.user("owner@example.com").await;
    let now = harness.clock.0;
    let service = harness.tasks();
    for request in [
        CreateTaskRequest::new("Fix login bug")
            .with_priority(TaskPriority::Urgent)
            .with_tags(["bug".to_owned()])
            .with_due_date(now - TimeDelta::days(2)),
        CreateTaskRequest::new("Write docs")
            .with_description("Explain the LOGIN flow")
            .with_status(TaskStatus::Done)
            .with_due_date(now - TimeDelta::days(1)),
        CreateTaskRequest::new("Plan roadmap").with_due_date(now + TimeDelta::days(3)),
    ] {
        service
            .create_task(request, &owner)
            .await
            .into_payload()
            .expect("task created");
    }
    let titles = |tasks: Option<Vec<crate::domain::Task>>| -> Vec<String> {
        tasks
            .expect("view succeeds")
            .into_iter()
            .map(|task| task.title)
            .collect()
    };

    assert_eq!(
        titles(service.tasks_by_status(&owner, TaskStatus::Done).await.into_payload()),
        vec!["Write docs"]
    );
    assert_eq!(
        titles(service.tasks_by_priority(&owner, TaskPriority::Urgent).await.into_payload()),
        vec!["Fix login bug"]
    );
    assert_eq!(
        titles(service.tasks_by_tag(&owner, "bug").await.into_payload()),
        vec!["Fix login bug"]
    );
    assert_eq!(
        titles(service.search_tasks(&owner, "login").await.into_payload()),
        vec!["Fix login bug", "Write docs"]
    );
    assert_eq!(
        titles(service.overdue_tasks(&owner).await.into_payload()),
        vec!["Fix login bug"]
    );
    assert_eq!(
        titles(
            service
                .tasks_by_due_date(&owner, now, now + TimeDelta::days(7))
                .await
                .into_payload()
        ),
        vec!["Plan roadmap"]
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn inverted_due_range_is_rejected(harness: Harness) {
    let owner = harness.user("owner@example.com").await;
    let now = harness.clock.0;

    let response = harness
        .tasks()
        .tasks_by_due_date(&owner, now, now - TimeDelta::days(1))
        .await;

    assert_eq!(response.error_code, Some(400));
}
