//! Repository port for task persistence and its unit-of-work factory.

use crate::task::domain::{NewTask, Task, TaskDomainError, TaskId, TaskPatch};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// Task persistence contract.
///
/// The repository is the sole writer of `created_at` and `updated_at`.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Returns every task in storage order.
    async fn get_all(&self) -> TaskRepositoryResult<Vec<Task>>;

    /// Finds a task by identifier.
    ///
    /// Returns `None` when the task does not exist.
    async fn get_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>>;

    /// Validates and stores a new task, returning the stored record.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::Validation`] when a field rule is
    /// violated or [`TaskRepositoryError::DuplicateTask`] when a
    /// caller-chosen identifier is already taken.
    async fn create(&self, new_task: NewTask) -> TaskRepositoryResult<Task>;

    /// Applies a partial update and returns the full updated record.
    ///
    /// Only the patched fields and `updated_at` are written.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not
    /// exist, [`TaskRepositoryError::EmptyUpdate`] when the patch names no
    /// fields, or [`TaskRepositoryError::Validation`] when the merged record
    /// violates a field rule.
    async fn update(&self, id: TaskId, patch: TaskPatch) -> TaskRepositoryResult<Task>;

    /// Removes a task.
    ///
    /// Returns `true` when a record was removed.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not exist.
    async fn delete(&self, id: TaskId) -> TaskRepositoryResult<bool>;
}

/// Produces repositories bound to one request-level session.
///
/// The session is released when the returned repository is dropped.
#[async_trait]
pub trait TaskRepositoryFactory: Send + Sync {
    /// Opens a session and returns a repository scoped to it.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::Persistence`] when the backing store
    /// cannot provide a session.
    async fn session(&self) -> TaskRepositoryResult<Box<dyn TaskRepository>>;
}

/// Errors returned by task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// The task was not found.
    #[error("Task with id {0} not found")]
    NotFound(TaskId),

    /// An update named no fields.
    #[error("No fields provided for update")]
    EmptyUpdate,

    /// The candidate record violates a field rule.
    #[error("Validation error: {0}")]
    Validation(#[from] TaskDomainError),

    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// The caller went away before the operation committed.
    #[error("operation cancelled before commit")]
    Cancelled,

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
