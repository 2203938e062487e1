//! Connection pool construction and schema bootstrap.

use super::repository::TaskPgPool;
use diesel::connection::SimpleConnection;
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use thiserror::Error;

/// SQL that creates the task schema; safe to apply repeatedly.
pub const CREATE_TASKS_SQL: &str =
    include_str!("../../../../migrations/2025-09-05-000000_create_tasks/up.sql");

/// SQL inserting the starter tasks; rows already present are left alone.
pub const SEED_TASKS_SQL: &str =
    include_str!("../../../../migrations/2025-09-05-003827_seed_tasks/up.sql");

/// Errors raised while preparing the database.
#[derive(Debug, Error)]
pub enum PoolSetupError {
    /// The pool could not open its initial connections.
    #[error("failed to build connection pool: {0}")]
    Build(#[source] diesel::r2d2::PoolError),
    /// Applying the schema failed.
    #[error("failed to apply task schema: {0}")]
    Schema(#[source] diesel::result::Error),
    /// Inserting the starter tasks failed.
    #[error("failed to seed tasks: {0}")]
    Seed(#[source] diesel::result::Error),
    /// The blocking worker running the setup panicked or was cancelled.
    #[error("database setup worker failed: {0}")]
    Join(#[source] tokio::task::JoinError),
}

/// Builds a connection pool for `database_url` with at most `max_size`
/// connections.
///
/// # Errors
///
/// Returns [`PoolSetupError::Build`] when the initial connections cannot be
/// established.
pub async fn build_pool(
    database_url: String,
    max_size: u32,
) -> Result<TaskPgPool, PoolSetupError> {
    tokio::task::spawn_blocking(move || {
        let manager = ConnectionManager::<PgConnection>::new(database_url);
        Pool::builder()
            .max_size(max_size)
            .build(manager)
            .map_err(PoolSetupError::Build)
    })
    .await
    .map_err(PoolSetupError::Join)?
}

/// Creates the `tasks` table and its index when they do not exist.
///
/// # Errors
///
/// Returns [`PoolSetupError`] when no connection is available or the schema
/// statements fail.
pub async fn apply_schema(pool: &TaskPgPool) -> Result<(), PoolSetupError> {
    let worker_pool = pool.clone();
    tokio::task::spawn_blocking(move || {
        let mut connection = worker_pool.get().map_err(PoolSetupError::Build)?;
        connection
            .batch_execute(CREATE_TASKS_SQL)
            .map_err(PoolSetupError::Schema)
    })
    .await
    .map_err(PoolSetupError::Join)?
}

/// Inserts the starter tasks. Expects the schema to exist.
///
/// # Errors
///
/// Returns [`PoolSetupError`] when no connection is available or the insert
/// fails.
pub async fn seed_tasks(pool: &TaskPgPool) -> Result<(), PoolSetupError> {
    let worker_pool = pool.clone();
    tokio::task::spawn_blocking(move || {
        let mut connection = worker_pool.get().map_err(PoolSetupError::Build)?;
        connection
            .batch_execute(SEED_TASKS_SQL)
            .map_err(PoolSetupError::Seed)
    })
    .await
    .map_err(PoolSetupError::Join)?
}
