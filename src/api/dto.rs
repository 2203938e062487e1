//! Request and response bodies for the task routes.
//!
//! Request bodies are deserialised loosely and then checked field by field,
//! so every rule violation is reported with its location instead of as an
//! opaque decoding failure.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::error::FieldViolation;
use crate::task::domain::{
    NewTask, Task, TaskDomainError, TaskField, TaskPatch, TaskStatus, validate_content,
    validate_status,
};

/// Body of `POST /tasks/`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateTaskRequest {
    /// Task name.
    #[schema(min_length = 1, max_length = 1000)]
    pub name: String,
    /// Task text.
    #[schema(min_length = 1, max_length = 1000)]
    pub text: String,
    /// Initial status; defaults to `created` when omitted.
    #[serde(default)]
    #[schema(value_type = TaskStatus)]
    pub status: RequestedStatus,
}

/// The `status` member of a create body, keeping an explicit `null` apart
/// from an omitted member.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RequestedStatus {
    /// Member not sent.
    #[default]
    Absent,
    /// Member sent as `null`.
    Null,
    /// Member sent as a string.
    Value(String),
}

impl<'de> Deserialize<'de> for RequestedStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<String>::deserialize(deserializer)?.map_or(Self::Null, Self::Value))
    }
}

impl CreateTaskRequest {
    /// Validates every field and converts the body into repository input.
    ///
    /// # Errors
    ///
    /// Returns one [`FieldViolation`] per offending field.
    pub fn into_new_task(self) -> Result<NewTask, Vec<FieldViolation>> {
        let mut violations = Vec::new();
        let name = collect(&mut violations, validate_content(TaskField::Name, &self.name));
        let text = collect(&mut violations, validate_content(TaskField::Text, &self.text));
        let status = match self.status {
            RequestedStatus::Absent => Some(TaskStatus::default()),
            RequestedStatus::Null => collect(
                &mut violations,
                Err(TaskDomainError::InvalidStatus("null".to_owned())),
            ),
            RequestedStatus::Value(raw) => collect(&mut violations, validate_status(&raw)),
        };

        match (name, text, status) {
            (Some(name), Some(text), Some(status)) if violations.is_empty() => {
                Ok(NewTask::new(name, text).with_status(status))
            }
            _ => Err(violations),
        }
    }
}

/// Body of `PUT /tasks/{task_id}`. `null` is treated as an absent field.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateTaskRequest {
    /// Replacement name.
    #[serde(default)]
    #[schema(min_length = 1, max_length = 1000)]
    pub name: Option<String>,
    /// Replacement text.
    #[serde(default)]
    #[schema(min_length = 1, max_length = 1000)]
    pub text: Option<String>,
    /// Replacement status.
    #[serde(default)]
    #[schema(value_type = Option<TaskStatus>)]
    pub status: Option<String>,
}

impl UpdateTaskRequest {
    /// Validates the provided fields and converts the body into a patch.
    ///
    /// An empty body yields an empty patch; rejecting it is the caller's
    /// decision.
    ///
    /// # Errors
    ///
    /// Returns one [`FieldViolation`] per offending field.
    pub fn into_patch(self) -> Result<TaskPatch, Vec<FieldViolation>> {
        let mut violations = Vec::new();
        let mut patch = TaskPatch::new();

        if let Some(raw) = self.name.as_deref()
            && let Some(name) =
                collect(&mut violations, validate_content(TaskField::Name, raw))
        {
            patch = patch.with_name(name);
        }
        if let Some(raw) = self.text.as_deref()
            && let Some(text) =
                collect(&mut violations, validate_content(TaskField::Text, raw))
        {
            patch = patch.with_text(text);
        }
        if let Some(raw) = self.status.as_deref()
            && let Some(status) = collect(&mut violations, validate_status(raw))
        {
            patch = patch.with_status(status);
        }

        if violations.is_empty() {
            Ok(patch)
        } else {
            Err(violations)
        }
    }
}

fn collect<T>(
    violations: &mut Vec<FieldViolation>,
    result: Result<T, TaskDomainError>,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            violations.push(FieldViolation::from_domain(&err));
            None
        }
    }
}

/// Public representation of a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TaskResponse {
    /// Task identifier.
    pub id: Uuid,
    /// Task name.
    pub name: String,
    /// Task text.
    pub text: String,
    /// Task status.
    pub status: TaskStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        Self {
            id: task.id().into_inner(),
            name: task.name().to_owned(),
            text: task.text().to_owned(),
            status: task.status(),
            created_at: task.created_at(),
            updated_at: task.updated_at(),
        }
    }
}

/// Body returned after a successful delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DeleteTaskResponse {
    /// Confirmation message.
    pub message: String,
}
