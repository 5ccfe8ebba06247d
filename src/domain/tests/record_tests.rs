//! Tests for members, comments, attachments and activities.

use crate::domain::{
    Activity, ActivityType, Attachment, Comment, CommentId, DomainError, FileDescriptor, Member,
    MemberRole, TaskId, UserId,
};
use crate::test_support::FixedClock;
use rstest::{fixture, rstest};
use serde_json::json;

#[fixture]
fn clock() -> FixedClock {
    FixedClock::on(2026, 5, 1)
}

#[rstest]
fn membership_starts_active(clock: FixedClock) {
    let member = Member::new(
        TaskId::new("t1"),
        UserId::new("u1"),
        MemberRole::Viewer,
        &clock,
    )
    .invited_by(UserId::new("u0"));

    assert!(member.is_active);
    assert_eq!(member.joined_at, member.last_active);
    assert_eq!(member.invited_by, Some(UserId::new("u0")));
}

#[rstest]
#[case("owner", MemberRole::Owner)]
#[case("Admin", MemberRole::Admin)]
#[case("viewer", MemberRole::Viewer)]
fn roles_parse_case_insensitively(#[case] raw: &str, #[case] expected: MemberRole) {
    assert_eq!(MemberRole::try_from(raw), Ok(expected));
    assert!(MemberRole::try_from("guest").is_err());
}

#[rstest]
fn comment_edit_marks_edited(clock: FixedClock) {
    let mut comment = Comment::new(TaskId::new("t1"), UserId::new("u1"), "First", &clock)
        .expect("valid comment")
        .replying_to(CommentId::new("c0"));
    assert!(!comment.is_edited);

    comment.edit("Second", &clock).expect("edit applies");

    assert!(comment.is_edited);
    assert_eq!(comment.content, "Second");
    assert!(comment.updated_at > comment.created_at);
    assert_eq!(comment.parent_comment_id, Some(CommentId::new("c0")));
}

#[rstest]
fn blank_comment_is_rejected(clock: FixedClock) {
    let result = Comment::new(TaskId::new("t1"), UserId::new("u1"), "\n", &clock);
    assert_eq!(result, Err(DomainError::EmptyCommentContent));
}

#[rstest]
fn attachment_copies_descriptor(clock: FixedClock) {
    let file = FileDescriptor::new("plan.pdf", "https://files.example.com/plan", "application/pdf", 2048);
    let attachment =
        Attachment::new(TaskId::new("t1"), UserId::new("u1"), file, &clock).expect("valid file");

    assert_eq!(attachment.file_name, "plan.pdf");
    assert_eq!(attachment.file_size, 2048);
    assert_eq!(attachment.uploaded_at, clock.0);
}

#[rstest]
fn attachment_requires_file_name(clock: FixedClock) {
    let file = FileDescriptor::new(" ", "https://files.example.com/x", "text/plain", 1);
    let result = Attachment::new(TaskId::new("t1"), UserId::new("u1"), file, &clock);
    assert_eq!(result, Err(DomainError::EmptyFileName));
}

#[rstest]
fn activity_serializes_type_in_snake_case(clock: FixedClock) {
    let activity = Activity::new(
        TaskId::new("t1"),
        UserId::new("u1"),
        ActivityType::MemberRoleUpdated,
        serde_json::Map::new(),
        &clock,
    )
    .with_description("Role changed");

    let value = serde_json::to_value(&activity).expect("serializable");

    assert_eq!(value.get("activity_type"), Some(&json!("member_role_updated")));
    assert_eq!(value.get("description"), Some(&json!("Role changed")));
    assert!(value.get("id").is_none());
    assert_eq!(
        ActivityType::try_from("member_role_updated"),
        Ok(ActivityType::MemberRoleUpdated)
    );
}
