//! When steps for cascading deletion BDD scenarios.

use super::world::{CascadeWorld, run_async};
use rstest_bdd_macros::when;
use taskboard::domain::TaskId;

#[when("the task is deleted")]
fn delete_task(world: &mut CascadeWorld) -> Result<(), eyre::Report> {
    let task = world.task()?;
    world.last_deletion = Some(run_async(world.board.task_service().delete_task(&task)));
    Ok(())
}

#[when(r#"the task "{task_id}" is deleted"#)]
fn delete_task_by_id(world: &mut CascadeWorld, task_id: String) {
    let task = TaskId::new(task_id);
    world.last_deletion = Some(run_async(world.board.task_service().delete_task(&task)));
}

#[when(r#"the user "{email}" is deleted"#)]
fn delete_user(world: &mut CascadeWorld, email: String) -> Result<(), eyre::Report> {
    let user = world.user(&email)?;
    world.last_deletion = Some(run_async(world.board.user_service().delete_user(&user)));
    Ok(())
}
