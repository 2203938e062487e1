//! Error types for task domain validation and parsing.

use std::fmt;
use thiserror::Error;

/// Client-writable task field that a validation rule applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskField {
    /// The task name.
    Name,
    /// The task body text.
    Text,
    /// The task lifecycle status.
    Status,
}

impl TaskField {
    /// Returns the wire name of the field.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Text => "text",
            Self::Status => "status",
        }
    }
}

impl fmt::Display for TaskField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned while constructing or mutating domain task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The field is empty or contains only whitespace.
    #[error("{0} cannot be empty or whitespace only")]
    BlankField(TaskField),

    /// The field exceeds the maximum character count.
    #[error("{field} must be at most {max} characters, got {actual}")]
    FieldTooLong {
        /// Field that failed validation.
        field: TaskField,
        /// Maximum permitted character count.
        max: usize,
        /// Submitted character count.
        actual: usize,
    },

    /// The status value is not one of the enumerated states.
    #[error("status must be one of created, processing, done; got '{0}'")]
    InvalidStatus(String),
}

impl TaskDomainError {
    /// Returns the field the violation applies to.
    #[must_use]
    pub const fn field(&self) -> TaskField {
        match self {
            Self::BlankField(field) | Self::FieldTooLong { field, .. } => *field,
            Self::InvalidStatus(_) => TaskField::Status,
        }
    }
}

/// Error returned while parsing task statuses from input or persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);

impl From<ParseTaskStatusError> for TaskDomainError {
    fn from(err: ParseTaskStatusError) -> Self {
        Self::InvalidStatus(err.0)
    }
}
