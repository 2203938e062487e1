//! `PostgreSQL` adapters for task persistence.

mod models;
mod pool;
mod repository;
mod schema;

pub use pool::{
    CREATE_TASKS_SQL, PoolSetupError, SEED_TASKS_SQL, apply_schema, build_pool, seed_tasks,
};
pub use repository::{PostgresTaskRepository, PostgresTaskRepositoryFactory, TaskPgPool};

#[cfg(test)]
pub(crate) use models::{TaskChangeset, TaskRow};
#[cfg(test)]
pub(crate) use repository::{row_to_task, to_changeset, to_new_row};
