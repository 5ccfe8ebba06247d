//! Then steps for cascading deletion BDD scenarios.

use super::world::{CascadeWorld, run_async};
use rstest_bdd_macros::then;
use taskboard::services::{CascadeReport, ServiceResponse};

fn last_deletion(world: &CascadeWorld) -> Result<&ServiceResponse<CascadeReport>, eyre::Report> {
    world
        .last_deletion
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing deletion result"))
}

#[then("the deletion succeeds")]
fn deletion_succeeds(world: &CascadeWorld) -> Result<(), eyre::Report> {
    let response = last_deletion(world)?;
    if !response.success {
        return Err(eyre::eyre!("deletion failed: {}", response.message));
    }
    Ok(())
}

#[then("the deletion fails with code {code:u16}")]
fn deletion_fails_with(world: &CascadeWorld, code: u16) -> Result<(), eyre::Report> {
    let response = last_deletion(world)?;
    if response.success || response.error_code != Some(code) {
        return Err(eyre::eyre!(
            "expected failure code {code}, got {:?} ({})",
            response.error_code,
            response.message
        ));
    }
    Ok(())
}

#[then(r#"the report removed {count:usize} "{target}""#)]
fn report_removed(world: &CascadeWorld, count: usize, target: String) -> Result<(), eyre::Report> {
    let report = last_deletion(world)?
        .payload
        .as_ref()
        .ok_or_else(|| eyre::eyre!("deletion returned no report"))?;
    let removed = report.removed(&target);
    if removed != count {
        return Err(eyre::eyre!("expected {count} {target} removed, got {removed}"));
    }
    Ok(())
}

#[then("the task can no longer be found")]
fn task_is_gone(world: &CascadeWorld) -> Result<(), eyre::Report> {
    let task = world.task()?;
    let response = run_async(world.board.task_service().get_task(&task));
    if response.error_code != Some(404) {
        return Err(eyre::eyre!("task still resolvable: {}", response.message));
    }
    Ok(())
}

#[then("the task can still be found")]
fn task_survives(world: &CascadeWorld) -> Result<(), eyre::Report> {
    let task = world.task()?;
    let response = run_async(world.board.task_service().get_task(&task));
    if !response.success {
        return Err(eyre::eyre!("task lookup failed: {}", response.message));
    }
    Ok(())
}

#[then("the task has {count:usize} comments")]
fn task_comment_count(world: &CascadeWorld, count: usize) -> Result<(), eyre::Report> {
    let task = world.task()?;
    let comments = run_async(
        world
            .board
            .comment_service()
            .get_task_comments(&task, None),
    )?;
    if comments.len() != count {
        return Err(eyre::eyre!("expected {count} comments, got {}", comments.len()));
    }
    Ok(())
}
