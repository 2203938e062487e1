//! Task route handlers and router assembly.

use axum::{
    Json, Router,
    extract::{
        Path,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    middleware,
    response::Redirect,
    routing::{any, get},
};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use uuid::Uuid;

use super::{
    auth::require_bearer,
    docs::{self, BearerAuth},
    dto::{CreateTaskRequest, DeleteTaskResponse, TaskResponse, UpdateTaskRequest},
    error::{ApiError, ErrorDetail, ErrorResponse, FieldViolation},
    state::{AppState, TaskSession},
};
use crate::task::{
    domain::{TaskId, TaskStatus},
    ports::TaskRepositoryError,
};

type ApiResult<T> = Result<T, ApiError>;

/// Collection path. `/tasks` redirects here with a 307, which keeps the
/// method and body.
const TASKS_PATH: &str = "/tasks/";

/// `OpenAPI` description assembled from the handler annotations below.
#[derive(OpenApi)]
#[openapi(
    info(title = "Task Manager API", description = "Bearer-protected task CRUD service"),
    paths(list_tasks, create_task, get_task, update_task, delete_task),
    components(schemas(
        TaskStatus,
        CreateTaskRequest,
        UpdateTaskRequest,
        TaskResponse,
        DeleteTaskResponse,
        ErrorResponse,
        ErrorDetail,
        FieldViolation,
    )),
    modifiers(&BearerAuth),
    security(("bearer" = [])),
    tags((name = "tasks", description = "Task management"))
)]
pub struct ApiDoc;

/// Builds the application router with authentication and request tracing.
#[must_use]
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/tasks", any(|| async { Redirect::temporary(TASKS_PATH) }))
        .route(TASKS_PATH, get(list_tasks).post(create_task))
        .route(
            "/tasks/{task_id}",
            get(get_task).put(update_task).delete(delete_task),
        )
        .merge(docs::router::<AppState>())
        .layer(middleware::from_fn_with_state(state.clone(), require_bearer))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/tasks/",
    tag = "tasks",
    responses(
        (status = 200, description = "All tasks, oldest first", body = [TaskResponse]),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorResponse),
    )
)]
#[tracing::instrument(skip_all)]
async fn list_tasks(TaskSession(repository): TaskSession) -> ApiResult<Json<Vec<TaskResponse>>> {
    let tasks = repository.get_all().await?;
    tracing::debug!(count = tasks.len(), "listed tasks");
    Ok(Json(tasks.into_iter().map(TaskResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/tasks/{task_id}",
    tag = "tasks",
    params(("task_id" = Uuid, Path, description = "Task identifier")),
    responses(
        (status = 200, description = "The task, or null when it does not exist",
            body = Option<TaskResponse>),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorResponse),
        (status = 422, description = "Malformed identifier", body = ErrorResponse),
    )
)]
#[tracing::instrument(skip_all)]
async fn get_task(
    task_id: Result<Path<Uuid>, PathRejection>,
    TaskSession(repository): TaskSession,
) -> ApiResult<Json<Option<TaskResponse>>> {
    let Path(id) = task_id?;
    let task = repository.get_by_id(TaskId::from_uuid(id)).await?;
    tracing::debug!(task_id = %id, found = task.is_some(), "fetched task");
    Ok(Json(task.map(TaskResponse::from)))
}

#[utoipa::path(
    post,
    path = "/tasks/",
    tag = "tasks",
    request_body = CreateTaskRequest,
    responses(
        (status = 201, description = "Created task", body = TaskResponse),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorResponse),
        (status = 422, description = "Field violations", body = ErrorResponse),
    )
)]
#[tracing::instrument(skip_all)]
async fn create_task(
    TaskSession(repository): TaskSession,
    body: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<TaskResponse>)> {
    let Json(request) = body?;
    let new_task = request.into_new_task().map_err(ApiError::Unprocessable)?;
    let task = repository
        .create(new_task)
        .await
        .map_err(ApiError::from_create)?;
    tracing::info!(task_id = %task.id(), "created task");
    Ok((StatusCode::CREATED, Json(task.into())))
}

#[utoipa::path(
    put,
    path = "/tasks/{task_id}",
    tag = "tasks",
    params(("task_id" = Uuid, Path, description = "Task identifier")),
    request_body = UpdateTaskRequest,
    responses(
        (status = 200, description = "Updated task", body = TaskResponse),
        (status = 400, description = "Empty update, or the merged task is invalid",
            body = ErrorResponse),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorResponse),
        (status = 404, description = "Task not found", body = ErrorResponse),
        (status = 422, description = "Field violations or malformed identifier",
            body = ErrorResponse),
    )
)]
#[tracing::instrument(skip_all)]
async fn update_task(
    task_id: Result<Path<Uuid>, PathRejection>,
    TaskSession(repository): TaskSession,
    body: Result<Json<UpdateTaskRequest>, JsonRejection>,
) -> ApiResult<Json<TaskResponse>> {
    let Path(id) = task_id?;
    let Json(request) = body?;
    let patch = request.into_patch().map_err(ApiError::Unprocessable)?;
    if patch.is_empty() {
        return Err(TaskRepositoryError::EmptyUpdate.into());
    }
    let task = repository.update(TaskId::from_uuid(id), patch).await?;
    tracing::info!(task_id = %id, "updated task");
    Ok(Json(task.into()))
}

#[utoipa::path(
    delete,
    path = "/tasks/{task_id}",
    tag = "tasks",
    params(("task_id" = Uuid, Path, description = "Task identifier")),
    responses(
        (status = 200, description = "Deletion confirmation", body = DeleteTaskResponse),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorResponse),
        (status = 404, description = "Task not found", body = ErrorResponse),
        (status = 422, description = "Malformed identifier", body = ErrorResponse),
    )
)]
#[tracing::instrument(skip_all)]
async fn delete_task(
    task_id: Result<Path<Uuid>, PathRejection>,
    TaskSession(repository): TaskSession,
) -> ApiResult<Json<DeleteTaskResponse>> {
    let Path(id) = task_id?;
    let target = TaskId::from_uuid(id);
    if !repository.delete(target).await? {
        return Err(TaskRepositoryError::NotFound(target).into());
    }
    tracing::info!(task_id = %id, "deleted task");
    Ok(Json(DeleteTaskResponse {
        message: format!("Task {id} deleted successfully"),
    }))
}
