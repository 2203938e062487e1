//! When steps for task lifecycle BDD scenarios.

use super::world::TaskApiWorld;
use axum::http::Method;
use rstest_bdd_macros::when;
use serde_json::json;
use uuid::Uuid;

#[when(r#"the client creates a task named "{name}" with text "{text}""#)]
fn create_task(world: &mut TaskApiWorld, name: String, text: String) -> Result<(), eyre::Report> {
    let body = json!({ "name": name, "text": text });
    world.last_response = Some(world.send(Method::POST, "/tasks/", Some(&body))?);
    Ok(())
}

#[when("the client creates a task with a blank name")]
fn create_task_with_blank_name(world: &mut TaskApiWorld) -> Result<(), eyre::Report> {
    let body = json!({ "name": "", "text": "x" });
    world.last_response = Some(world.send(Method::POST, "/tasks/", Some(&body))?);
    Ok(())
}

#[when("the client sends an empty update for the task")]
fn send_empty_update(world: &mut TaskApiWorld) -> Result<(), eyre::Report> {
    let uri = world.task_uri()?;
    world.last_response = Some(world.send(Method::PUT, &uri, Some(&json!({})))?);
    Ok(())
}

#[when(r#"the client sets the status of an unknown task to "{status}""#)]
fn update_unknown_task(world: &mut TaskApiWorld, status: String) -> Result<(), eyre::Report> {
    let uri = format!("/tasks/{}", Uuid::new_v4());
    let body = json!({ "status": status });
    world.last_response = Some(world.send(Method::PUT, &uri, Some(&body))?);
    Ok(())
}

#[when("the client lists tasks")]
fn list_tasks(world: &mut TaskApiWorld) -> Result<(), eyre::Report> {
    world.last_response = Some(world.send(Method::GET, "/tasks/", None)?);
    Ok(())
}

#[when("the client deletes the task")]
fn delete_task(world: &mut TaskApiWorld) -> Result<(), eyre::Report> {
    let uri = world.task_uri()?;
    world.last_response = Some(world.send(Method::DELETE, &uri, None)?);
    Ok(())
}
