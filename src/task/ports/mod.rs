//! Port contracts for task persistence.
//!
//! Ports define infrastructure-agnostic interfaces used by the HTTP layer.

pub mod repository;

pub use repository::{
    TaskRepository, TaskRepositoryError, TaskRepositoryFactory, TaskRepositoryResult,
};
