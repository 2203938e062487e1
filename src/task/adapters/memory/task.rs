//! In-memory repository for task tests and local runs.

use async_trait::async_trait;
use mockable::{Clock, DefaultClock};
use std::sync::{Arc, PoisonError, RwLock};

use crate::task::{
    domain::{NewTask, Task, TaskId, TaskPatch},
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryFactory, TaskRepositoryResult},
};

/// Thread-safe in-memory task repository.
///
/// Clones share the same store, so the repository also acts as its own
/// [`TaskRepositoryFactory`]: every session sees one task list kept in
/// insertion order.
#[derive(Debug)]
pub struct InMemoryTaskRepository<C = DefaultClock> {
    tasks: Arc<RwLock<Vec<Task>>>,
    clock: Arc<C>,
}

impl InMemoryTaskRepository<DefaultClock> {
    /// Creates an empty in-memory repository using the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(DefaultClock))
    }
}

impl Default for InMemoryTaskRepository<DefaultClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Clone for InMemoryTaskRepository<C> {
    fn clone(&self) -> Self {
        Self {
            tasks: Arc::clone(&self.tasks),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<C> InMemoryTaskRepository<C>
where
    C: Clock + Send + Sync + 'static,
{
    /// Creates an empty in-memory repository driven by `clock`.
    #[must_use]
    pub fn with_clock(clock: Arc<C>) -> Self {
        Self {
            tasks: Arc::new(RwLock::new(Vec::new())),
            clock,
        }
    }

    /// Inserts a record exactly as given, bypassing validation.
    ///
    /// Stands in for rows written by other tools, so tests can exercise
    /// reads and updates over data the service would not produce itself.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateTask`] when the identifier is
    /// already stored.
    pub fn insert_persisted(&self, task: Task) -> TaskRepositoryResult<()> {
        let mut tasks = self.tasks.write().map_err(poisoned)?;
        if tasks.iter().any(|stored| stored.id() == task.id()) {
            return Err(TaskRepositoryError::DuplicateTask(task.id()));
        }
        tasks.push(task);
        Ok(())
    }
}

fn poisoned<T>(err: PoisonError<T>) -> TaskRepositoryError {
    TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl<C> TaskRepository for InMemoryTaskRepository<C>
where
    C: Clock + Send + Sync + 'static,
{
    async fn get_all(&self) -> TaskRepositoryResult<Vec<Task>> {
        let tasks = self.tasks.read().map_err(poisoned)?;
        Ok(tasks.clone())
    }

    async fn get_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        let tasks = self.tasks.read().map_err(poisoned)?;
        Ok(tasks.iter().find(|task| task.id() == id).cloned())
    }

    async fn create(&self, new_task: NewTask) -> TaskRepositoryResult<Task> {
        let task = Task::create(new_task, &*self.clock)?;
        self.insert_persisted(task.clone())?;
        Ok(task)
    }

    async fn update(&self, id: TaskId, patch: TaskPatch) -> TaskRepositoryResult<Task> {
        let mut tasks = self.tasks.write().map_err(poisoned)?;
        let stored = tasks
            .iter_mut()
            .find(|task| task.id() == id)
            .ok_or(TaskRepositoryError::NotFound(id))?;
        if patch.is_empty() {
            return Err(TaskRepositoryError::EmptyUpdate);
        }

        let merged = stored.apply_patch(&patch, &*self.clock)?;
        *stored = merged.clone();
        Ok(merged)
    }

    async fn delete(&self, id: TaskId) -> TaskRepositoryResult<bool> {
        let mut tasks = self.tasks.write().map_err(poisoned)?;
        let position = tasks
            .iter()
            .position(|task| task.id() == id)
            .ok_or(TaskRepositoryError::NotFound(id))?;
        tasks.remove(position);
        Ok(true)
    }
}

#[async_trait]
impl<C> TaskRepositoryFactory for InMemoryTaskRepository<C>
where
    C: Clock + Send + Sync + 'static,
{
    async fn session(&self) -> TaskRepositoryResult<Box<dyn TaskRepository>> {
        Ok(Box::new(self.clone()))
    }
}
