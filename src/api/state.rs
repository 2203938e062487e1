//! Shared router state and the per-request repository session.

use std::sync::Arc;

use axum::{extract::FromRequestParts, http::request::Parts};

use super::{auth::BearerSecret, error::ApiError};
use crate::task::ports::{TaskRepository, TaskRepositoryFactory};

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    repositories: Arc<dyn TaskRepositoryFactory>,
    bearer: BearerSecret,
}

impl AppState {
    /// Creates router state from a repository factory and the bearer secret.
    #[must_use]
    pub const fn new(repositories: Arc<dyn TaskRepositoryFactory>, bearer: BearerSecret) -> Self {
        Self {
            repositories,
            bearer,
        }
    }

    /// Returns the configured bearer secret.
    #[must_use]
    pub const fn bearer(&self) -> &BearerSecret {
        &self.bearer
    }
}

/// Repository bound to the current request.
///
/// The session is opened when a handler asks for it and released when the
/// handler returns, so each request runs in its own unit of work.
pub struct TaskSession(pub Box<dyn TaskRepository>);

impl FromRequestParts<AppState> for TaskSession {
    type Rejection = ApiError;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let repository = state.repositories.session().await?;
        Ok(Self(repository))
    }
}
