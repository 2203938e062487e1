//! Field rules shared by task creation, partial updates, and request parsing.

use super::{TaskDomainError, TaskField, TaskStatus};

/// Maximum number of characters accepted for `name` and `text`.
pub const MAX_CONTENT_CHARS: usize = 1000;

/// Validates a free-text task field and returns its trimmed form.
///
/// The length limit applies to the submitted value, counted in Unicode
/// scalar values; blankness is judged after trimming.
///
/// # Errors
///
/// Returns [`TaskDomainError::BlankField`] when the value is empty or
/// whitespace only, or [`TaskDomainError::FieldTooLong`] when it exceeds
/// [`MAX_CONTENT_CHARS`].
pub fn validate_content(field: TaskField, raw: &str) -> Result<String, TaskDomainError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(TaskDomainError::BlankField(field));
    }

    let actual = raw.chars().count();
    if actual > MAX_CONTENT_CHARS {
        return Err(TaskDomainError::FieldTooLong {
            field,
            max: MAX_CONTENT_CHARS,
            actual,
        });
    }

    Ok(trimmed.to_owned())
}

/// Parses a raw status value.
///
/// # Errors
///
/// Returns [`TaskDomainError::InvalidStatus`] for anything other than the
/// three enumerated lowercase values.
pub fn validate_status(raw: &str) -> Result<TaskStatus, TaskDomainError> {
    Ok(TaskStatus::try_from(raw)?)
}
