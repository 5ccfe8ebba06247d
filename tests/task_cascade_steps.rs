//! Behaviour tests for cascading task and user deletion.

#[path = "task_cascade_steps/mod.rs"]
mod task_cascade_steps_defs;

use rstest_bdd_macros::scenario;
use task_cascade_steps_defs::world::{CascadeWorld, world};

#[scenario(
    path = "tests/features/task_cascade.feature",
    name = "Delete a task with dependents"
)]
#[tokio::test(flavor = "multi_thread")]
async fn delete_task_with_dependents(world: CascadeWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/task_cascade.feature",
    name = "Delete a missing task"
)]
#[tokio::test(flavor = "multi_thread")]
async fn delete_missing_task(world: CascadeWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/task_cascade.feature",
    name = "Delete a user who commented elsewhere"
)]
#[tokio::test(flavor = "multi_thread")]
async fn delete_user_who_commented_elsewhere(world: CascadeWorld) {
    let _ = world;
}
