//! Task entity, creation input, and partial-update patch.

use super::{TaskDomainError, TaskField, TaskId, TaskStatus, validate_content};
use chrono::{DateTime, SubsecRound, TimeDelta, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Fractional-second digits retained on timestamps; matches `timestamptz`.
const TIMESTAMP_PRECISION: u16 = 6;

/// Input for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    id: Option<TaskId>,
    name: String,
    text: String,
    status: TaskStatus,
}

impl NewTask {
    /// Creates an input with the required fields and the default status.
    #[must_use]
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            text: text.into(),
            status: TaskStatus::default(),
        }
    }

    /// Uses a caller-chosen identifier instead of a generated one.
    #[must_use]
    pub const fn with_id(mut self, id: TaskId) -> Self {
        self.id = Some(id);
        self
    }

    /// Sets the initial status.
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    /// Returns the caller-chosen identifier, if any.
    #[must_use]
    pub const fn id(&self) -> Option<TaskId> {
        self.id
    }
}

/// Partial update for an existing task; absent fields keep their value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    name: Option<String>,
    text: Option<String>,
    status: Option<TaskStatus>,
}

impl TaskPatch {
    /// Creates an empty patch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Replaces the text.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Replaces the status.
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Returns `true` when the patch names no fields.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.text.is_none() && self.status.is_none()
    }

    /// Returns the replacement name, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the replacement text, if any.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Returns the replacement status, if any.
    #[must_use]
    pub const fn status(&self) -> Option<TaskStatus> {
        self.status
    }
}

/// Task entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    name: String,
    text: String,
    status: TaskStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

/// Parameter object for reconstructing a persisted task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted name.
    pub name: String,
    /// Persisted text.
    pub text: String,
    /// Persisted status.
    pub status: TaskStatus,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest mutation timestamp.
    pub updated_at: DateTime<Utc>,
    /// Persisted soft-delete marker.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Creates a validated task, generating an identifier when none is given.
    ///
    /// Both timestamps are set to the same clock reading.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError`] when `name` or `text` is blank or too long.
    pub fn create<C>(new_task: NewTask, clock: &C) -> Result<Self, TaskDomainError>
    where
        C: Clock + ?Sized,
    {
        let name = validate_content(TaskField::Name, &new_task.name)?;
        let text = validate_content(TaskField::Text, &new_task.text)?;
        let timestamp = now(clock);

        Ok(Self {
            id: new_task.id.unwrap_or_default(),
            name,
            text,
            status: new_task.status,
            created_at: timestamp,
            updated_at: timestamp,
            deleted_at: None,
        })
    }

    /// Reconstructs a task from persisted storage without revalidating it.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            name: data.name,
            text: data.text,
            status: data.status,
            created_at: data.created_at,
            updated_at: data.updated_at,
            deleted_at: data.deleted_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the task name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the task text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the task status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest mutation timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the soft-delete marker. Never set by this service.
    #[must_use]
    pub const fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    /// Merges `patch` onto this task and validates the merged result.
    ///
    /// Every content field is revalidated, not only the patched ones, so a
    /// stored value that no longer satisfies the rules blocks the update.
    /// The returned task carries an `updated_at` strictly later than the
    /// current one.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError`] when the merged `name` or `text` is blank
    /// or too long.
    pub fn apply_patch<C>(&self, patch: &TaskPatch, clock: &C) -> Result<Self, TaskDomainError>
    where
        C: Clock + ?Sized,
    {
        let merged_name = patch.name().unwrap_or(self.name.as_str());
        let merged_text = patch.text().unwrap_or(self.text.as_str());
        let name = validate_content(TaskField::Name, merged_name)?;
        let text = validate_content(TaskField::Text, merged_text)?;
        let status = patch.status().unwrap_or(self.status);

        Ok(Self {
            id: self.id,
            name,
            text,
            status,
            created_at: self.created_at,
            updated_at: self.next_update_timestamp(clock),
            deleted_at: self.deleted_at,
        })
    }

    fn next_update_timestamp<C>(&self, clock: &C) -> DateTime<Utc>
    where
        C: Clock + ?Sized,
    {
        let candidate = now(clock);
        if candidate > self.updated_at {
            return candidate;
        }
        self.updated_at + TimeDelta::microseconds(1)
    }
}

/// Reads the clock at storage precision.
fn now<C>(clock: &C) -> DateTime<Utc>
where
    C: Clock + ?Sized,
{
    clock.utc().trunc_subsecs(TIMESTAMP_PRECISION)
}
