//! Domain model for task records.
//!
//! The task domain owns field rules, the status enumeration, and the
//! create/merge logic every storage backend relies on, keeping all
//! infrastructure concerns outside the domain boundary.

mod error;
mod ids;
mod status;
mod task;
mod validation;

pub use error::{ParseTaskStatusError, TaskDomainError, TaskField};
pub use ids::TaskId;
pub use status::TaskStatus;
pub use task::{NewTask, PersistedTaskData, Task, TaskPatch};
pub use validation::{MAX_CONTENT_CHARS, validate_content, validate_status};
