//! `PostgreSQL` repository implementation for task storage.

use super::{
    models::{NewTaskRow, TaskChangeset, TaskRow},
    schema::tasks,
};
use crate::task::{
    domain::{NewTask, PersistedTaskData, Task, TaskId, TaskPatch, TaskStatus},
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryFactory, TaskRepositoryResult},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool, PooledConnection};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use mockable::{Clock, DefaultClock};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// `PostgreSQL` connection pool type used by task adapters.
pub type TaskPgPool = Pool<ConnectionManager<PgConnection>>;

type PooledConn = PooledConnection<ConnectionManager<PgConnection>>;

impl From<DieselError> for TaskRepositoryError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}

/// Opens one pooled connection per request session.
#[derive(Debug)]
pub struct PostgresTaskRepositoryFactory<C = DefaultClock> {
    pool: TaskPgPool,
    clock: Arc<C>,
}

impl<C> PostgresTaskRepositoryFactory<C>
where
    C: Clock + Send + Sync + 'static,
{
    /// Creates a factory drawing sessions from `pool`.
    #[must_use]
    pub const fn new(pool: TaskPgPool, clock: Arc<C>) -> Self {
        Self { pool, clock }
    }
}

#[async_trait]
impl<C> TaskRepositoryFactory for PostgresTaskRepositoryFactory<C>
where
    C: Clock + Send + Sync + 'static,
{
    async fn session(&self) -> TaskRepositoryResult<Box<dyn TaskRepository>> {
        let pool = self.pool.clone();
        let connection = tokio::task::spawn_blocking(move || pool.get())
            .await
            .map_err(TaskRepositoryError::persistence)?
            .map_err(TaskRepositoryError::persistence)?;

        Ok(Box::new(PostgresTaskRepository {
            connection: Arc::new(Mutex::new(connection)),
            clock: Arc::clone(&self.clock),
        }))
    }
}

/// `PostgreSQL`-backed task repository bound to one pooled connection.
///
/// The connection returns to the pool once the repository and any in-flight
/// operation have been dropped. Each operation runs in its own transaction,
/// which rolls back on error or when the awaiting caller is dropped before
/// the commit point.
pub struct PostgresTaskRepository<C = DefaultClock> {
    connection: Arc<Mutex<PooledConn>>,
    clock: Arc<C>,
}

impl<C> PostgresTaskRepository<C>
where
    C: Clock + Send + Sync + 'static,
{
    async fn in_transaction<F, T>(&self, operation: F) -> TaskRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection, &C) -> TaskRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let connection = Arc::clone(&self.connection);
        let clock = Arc::clone(&self.clock);
        let mut guard = CancelOnDrop::new();
        let cancelled = guard.flag();

        let result = tokio::task::spawn_blocking(move || {
            let mut pooled = connection.lock().map_err(|err| {
                TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
            })?;
            let conn: &mut PgConnection = &mut pooled;
            conn.transaction::<_, TaskRepositoryError, _>(|tx| {
                let value = operation(tx, &*clock)?;
                if cancelled.load(Ordering::Acquire) {
                    return Err(TaskRepositoryError::Cancelled);
                }
                Ok(value)
            })
        })
        .await
        .map_err(TaskRepositoryError::persistence)?;

        guard.disarm();
        result
    }
}

#[async_trait]
impl<C> TaskRepository for PostgresTaskRepository<C>
where
    C: Clock + Send + Sync + 'static,
{
    async fn get_all(&self) -> TaskRepositoryResult<Vec<Task>> {
        self.in_transaction(|conn, _| {
            let rows = tasks::table
                .select(TaskRow::as_select())
                .order((tasks::created_at.asc(), tasks::id.asc()))
                .load::<TaskRow>(conn)?;
            rows.into_iter().map(row_to_task).collect()
        })
        .await
    }

    async fn get_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        self.in_transaction(move |conn, _| {
            find_task_row(conn, id, false)?
                .map(row_to_task)
                .transpose()
        })
        .await
    }

    async fn create(&self, new_task: NewTask) -> TaskRepositoryResult<Task> {
        self.in_transaction(move |conn, clock| {
            let task = Task::create(new_task, clock)?;
            let task_id = task.id();
            let row = diesel::insert_into(tasks::table)
                .values(&to_new_row(&task))
                .returning(TaskRow::as_returning())
                .get_result::<TaskRow>(conn)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        TaskRepositoryError::DuplicateTask(task_id)
                    }
                    _ => TaskRepositoryError::persistence(err),
                })?;
            row_to_task(row)
        })
        .await
    }

    async fn update(&self, id: TaskId, patch: TaskPatch) -> TaskRepositoryResult<Task> {
        self.in_transaction(move |conn, clock| {
            let existing = find_task_row(conn, id, true)?
                .map(row_to_task)
                .transpose()?
                .ok_or(TaskRepositoryError::NotFound(id))?;
            if patch.is_empty() {
                return Err(TaskRepositoryError::EmptyUpdate);
            }

            let merged = existing.apply_patch(&patch, clock)?;
            let row = diesel::update(tasks::table.find(id.into_inner()))
                .set(&to_changeset(&patch, &merged))
                .returning(TaskRow::as_returning())
                .get_result::<TaskRow>(conn)?;
            row_to_task(row)
        })
        .await
    }

    async fn delete(&self, id: TaskId) -> TaskRepositoryResult<bool> {
        self.in_transaction(move |conn, _| {
            if find_task_row(conn, id, true)?.is_none() {
                return Err(TaskRepositoryError::NotFound(id));
            }
            let removed = diesel::delete(tasks::table.find(id.into_inner())).execute(conn)?;
            Ok(removed > 0)
        })
        .await
    }
}

/// Flags an in-flight operation as abandoned if dropped while armed.
struct CancelOnDrop {
    flag: Arc<AtomicBool>,
    armed: bool,
}

impl CancelOnDrop {
    fn new() -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            armed: true,
        }
    }

    fn flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.flag)
    }

    const fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        if self.armed {
            self.flag.store(true, Ordering::Release);
        }
    }
}

fn find_task_row(
    conn: &mut PgConnection,
    id: TaskId,
    lock_for_update: bool,
) -> TaskRepositoryResult<Option<TaskRow>> {
    let query = tasks::table
        .filter(tasks::id.eq(id.into_inner()))
        .select(TaskRow::as_select());
    let row = if lock_for_update {
        query.for_update().first::<TaskRow>(conn).optional()?
    } else {
        query.first::<TaskRow>(conn).optional()?
    };
    Ok(row)
}

pub(crate) fn to_new_row(task: &Task) -> NewTaskRow {
    NewTaskRow {
        id: task.id().into_inner(),
        name: task.name().to_owned(),
        text: task.text().to_owned(),
        status: task.status().as_str().to_owned(),
        created_at: task.created_at(),
        updated_at: task.updated_at(),
    }
}

/// Builds the column set for an update: patched fields take their merged,
/// trimmed values and `updated_at` is always written.
pub(crate) fn to_changeset(patch: &TaskPatch, merged: &Task) -> TaskChangeset {
    TaskChangeset {
        name: patch.name().map(|_| merged.name().to_owned()),
        text: patch.text().map(|_| merged.text().to_owned()),
        status: patch.status().map(|status| status.as_str().to_owned()),
        updated_at: merged.updated_at(),
    }
}

pub(crate) fn row_to_task(row: TaskRow) -> TaskRepositoryResult<Task> {
    let TaskRow {
        id,
        name,
        text,
        status: persisted_status,
        created_at,
        updated_at,
        deleted_at,
    } = row;

    let status =
        TaskStatus::try_from(persisted_status.as_str()).map_err(TaskRepositoryError::persistence)?;

    Ok(Task::from_persisted(PersistedTaskData {
        id: TaskId::from_uuid(id),
        name,
        text,
        status,
        created_at,
        updated_at,
        deleted_at,
    }))
}
