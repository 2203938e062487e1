//! Shared world state for task lifecycle BDD scenarios.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use rstest::fixture;
use serde_json::Value;
use taskmgr::{
    api::{self, AppState, BearerSecret},
    task::adapters::memory::InMemoryTaskRepository,
};
use tower::ServiceExt;

/// Bearer secret configured for the scenario router.
pub const TOKEN: &str = "scenario-secret";

/// Response captured by a `when` step.
#[derive(Debug)]
pub struct CapturedResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

/// Scenario world for task lifecycle behaviour tests.
pub struct TaskApiWorld {
    pub router: Router,
    pub authorization: Option<String>,
    pub task_id: Option<String>,
    pub last_response: Option<CapturedResponse>,
}

impl TaskApiWorld {
    /// Creates a world around a router with an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        let state = AppState::new(
            Arc::new(InMemoryTaskRepository::new()),
            BearerSecret::new(TOKEN),
        );
        Self {
            router: api::router(state),
            authorization: None,
            task_id: None,
            last_response: None,
        }
    }

    /// Sends a request with the world's credentials and returns the response.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be built or the router fails.
    pub fn send(
        &self,
        method: Method,
        uri: &str,
        body: Option<&Value>,
    ) -> Result<CapturedResponse, eyre::Report> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(value) = &self.authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        let payload = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(serde_json::to_vec(json)?)
            }
            None => Body::empty(),
        };
        let request = builder.body(payload)?;

        run_async(async {
            let response = self.router.clone().oneshot(request).await?;
            let status = response.status();
            let headers = response.headers().clone();
            let bytes = response.into_body().collect().await?.to_bytes();
            let body = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes)?
            };
            Ok::<_, eyre::Report>(CapturedResponse {
                status,
                headers,
                body,
            })
        })
    }

    /// Returns the identifier of the task created in a `given` step.
    ///
    /// # Errors
    ///
    /// Returns an error if no task has been created.
    pub fn task_uri(&self) -> Result<String, eyre::Report> {
        let id = self
            .task_id
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing task id in scenario world"))?;
        Ok(format!("/tasks/{id}"))
    }

    /// Returns the last captured response.
    ///
    /// # Errors
    ///
    /// Returns an error if no request has been sent.
    pub fn response(&self) -> Result<&CapturedResponse, eyre::Report> {
        self.last_response
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing response in scenario world"))
    }
}

impl Default for TaskApiWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> TaskApiWorld {
    TaskApiWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
