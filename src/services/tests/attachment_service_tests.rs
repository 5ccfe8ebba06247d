//! Tests for attachment bookkeeping.

use super::fixtures::{Harness, harness};
use crate::domain::{ActivityType, FileDescriptor, TaskId};
use crate::services::{EntityKind, ServiceError};
use rstest::rstest;
use serde_json::json;

fn pdf(name: &str) -> FileDescriptor {
    FileDescriptor::new(name, format!("https://files.example.com/{name}"), "application/pdf", 2048)
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn upload_records_file_metadata(harness: Harness) {
    let owner = harness.user("owner@example.com").await;
    let task = harness.task(&owner, "Paperwork").await;

    let attachment = harness
        .attachments()
        .upload_attachment(&task, &owner, pdf("brief.pdf"))
        .await
        .expect("attachment uploaded");

    assert_eq!(attachment.uploaded_at, harness.clock.0);
    let log = harness.activity_log(&task).await;
    let added = log.last().expect("activity written");
    assert_eq!(added.activity_type, ActivityType::AttachmentAdded);
    assert_eq!(added.metadata.get("file_name"), Some(&json!("brief.pdf")));
    assert_eq!(added.metadata.get("file_type"), Some(&json!("application/pdf")));
    assert_eq!(added.metadata.get("file_size"), Some(&json!(2048)));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn blank_file_name_is_rejected(harness: Harness) {
    let owner = harness.user("owner@example.com").await;
    let task = harness.task(&owner, "Paperwork").await;

    let error = harness
        .attachments()
        .upload_attachment(&task, &owner, pdf(" "))
        .await
        .expect_err("blank name");

    assert_eq!(error.code(), 400);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn upload_to_unknown_task_is_not_found(harness: Harness) {
    let owner = harness.user("owner@example.com").await;

    let result = harness
        .attachments()
        .upload_attachment(&TaskId::new("missing"), &owner, pdf("brief.pdf"))
        .await;

    assert!(matches!(
        result,
        Err(ServiceError::NotFound {
            kind: EntityKind::Task,
            ..
        })
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn listings_filter_by_task_and_type(harness: Harness) {
    let owner = harness.user("owner@example.com").await;
    let task = harness.task(&owner, "Paperwork").await;
    let other = harness.task(&owner, "Elsewhere").await;
    let service = harness.attachments();
    service
        .upload_attachment(&task, &owner, pdf("a.pdf"))
        .await
        .expect("uploaded");
    service
        .upload_attachment(
            &task,
            &owner,
            FileDescriptor::new("b.png", "https://files.example.com/b.png", "image/png", 10),
        )
        .await
        .expect("uploaded");
    service
        .upload_attachment(&other, &owner, pdf("c.pdf"))
        .await
        .expect("uploaded");

    let pdfs = service
        .get_attachments_by_type(&task, "application/pdf")
        .await
        .expect("listed");
    let on_task = service
        .get_task_attachments(&task, None)
        .await
        .expect("listed");
    let by_owner = service
        .get_user_attachments(&owner, Some(2))
        .await
        .expect("listed");

    assert_eq!(
        pdfs.iter().map(|a| a.file_name.as_str()).collect::<Vec<_>>(),
        vec!["a.pdf"]
    );
    assert_eq!(on_task.len(), 2);
    assert_eq!(by_owner.len(), 2);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn delete_logs_removed_file(harness: Harness) {
    let owner = harness.user("owner@example.com").await;
    let task = harness.task(&owner, "Paperwork").await;
    let service = harness.attachments();
    let attachment_id = service
        .upload_attachment(&task, &owner, pdf("old.pdf"))
        .await
        .expect("uploaded")
        .id
        .expect("identifier assigned");

    service
        .delete_attachment(&attachment_id)
        .await
        .expect("deleted");

    assert!(matches!(
        service.get_attachment(&attachment_id).await,
        Err(ServiceError::NotFound {
            kind: EntityKind::Attachment,
            ..
        })
    ));
    let log = harness.activity_log(&task).await;
    let deleted = log.last().expect("deletion logged");
    assert_eq!(deleted.activity_type, ActivityType::AttachmentDeleted);
    assert_eq!(deleted.metadata.get("file_name"), Some(&json!("old.pdf")));
}
