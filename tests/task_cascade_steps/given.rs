//! Given steps for cascading deletion BDD scenarios.

use super::world::{CascadeWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::given;
use taskboard::{
    domain::FileDescriptor,
    services::{CreateTaskRequest, RegisterUserRequest},
};

#[given(r#"a registered user "{email}""#)]
fn registered_user(world: &mut CascadeWorld, email: String) -> Result<(), eyre::Report> {
    let response = run_async(
        world
            .board
            .user_service()
            .register_user(RegisterUserRequest::new(email.clone())),
    );
    let user_id = response
        .into_payload()
        .and_then(|user| user.id)
        .ok_or_else(|| eyre::eyre!("registering {email} failed"))?;
    world.users.insert(email, user_id);
    Ok(())
}

#[given(r#"a task "{title}" owned by "{email}""#)]
fn task_owned_by(world: &mut CascadeWorld, title: String, email: String) -> Result<(), eyre::Report> {
    let owner = world.user(&email)?;
    let response = run_async(
        world
            .board
            .task_service()
            .create_task(CreateTaskRequest::new(title), &owner),
    );
    let task_id = response
        .into_payload()
        .and_then(|task| task.id)
        .ok_or_else(|| eyre::eyre!("creating task for {email} failed"))?;
    world.task = Some(task_id);
    Ok(())
}

#[given(r#"the task has a comment "{content}" by "{email}""#)]
fn task_has_comment(world: &mut CascadeWorld, content: String, email: String) -> Result<(), eyre::Report> {
    let task = world.task()?;
    let author = world.user(&email)?;
    run_async(
        world
            .board
            .comment_service()
            .create_comment(&task, &author, &content, None),
    )
    .wrap_err("add comment in scenario setup")?;
    Ok(())
}

#[given(r#"the task has an attachment "{file_name}""#)]
fn task_has_attachment(world: &mut CascadeWorld, file_name: String) -> Result<(), eyre::Report> {
    let task = world.task()?;
    let owner = run_async(world.board.task_service().get_task(&task))
        .into_payload()
        .map(|found| found.owner_id)
        .ok_or_else(|| eyre::eyre!("task lookup failed in scenario setup"))?;
    let url = format!("https://files.example.com/{file_name}");
    run_async(world.board.attachment_service().upload_attachment(
        &task,
        &owner,
        FileDescriptor::new(file_name, url, "application/pdf", 1024),
    ))
    .wrap_err("upload attachment in scenario setup")?;
    Ok(())
}
