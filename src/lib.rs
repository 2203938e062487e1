//! Taskmgr: a bearer-protected HTTP service for managing simple tasks.
//!
//! Tasks carry a name, a free-text body, and a lifecycle status, and are
//! stored in `PostgreSQL` or, for tests, in memory.
//!
//! # Architecture
//!
//! Taskmgr follows hexagonal architecture principles:
//!
//! - **Domain**: validation rules and the task entity, free of I/O
//! - **Ports**: the repository trait and its per-request session factory
//! - **Adapters**: in-memory and `PostgreSQL` repository implementations
//!
//! # Modules
//!
//! - [`api`]: `axum` router, authentication gate, and error mapping
//! - [`config`]: environment configuration
//! - [`task`]: task domain, repository port, and storage adapters
//! - [`telemetry`]: tracing subscriber setup

pub mod api;
pub mod config;
pub mod task;
pub mod telemetry;
