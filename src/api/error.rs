//! API error type and its mapping to HTTP responses.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::task::{domain::TaskDomainError, ports::TaskRepositoryError};

/// Body text returned for every internal failure.
pub const INTERNAL_ERROR_DETAIL: &str = "Internal server error";

/// One entry of a 422 response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldViolation {
    /// Location of the offending value, e.g. `["body", "name"]`.
    pub loc: Vec<String>,
    /// Human-readable reason.
    pub msg: String,
    /// Machine-readable category.
    #[serde(rename = "type")]
    #[schema(value_type = String)]
    pub kind: &'static str,
}

/// Body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// A message, or the violation list for 422 responses.
    pub detail: ErrorDetail,
}

/// Payload of [`ErrorResponse::detail`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(untagged)]
pub enum ErrorDetail {
    /// Single message.
    Message(String),
    /// Per-field violations.
    Violations(Vec<FieldViolation>),
}

impl ErrorResponse {
    /// Wraps a plain message.
    #[must_use]
    pub fn message(detail: impl Into<String>) -> Self {
        Self {
            detail: ErrorDetail::Message(detail.into()),
        }
    }
}

impl FieldViolation {
    /// Creates a violation located at `loc`.
    #[must_use]
    pub fn new(loc: &[&str], msg: impl Into<String>, kind: &'static str) -> Self {
        Self {
            loc: loc.iter().map(|part| (*part).to_owned()).collect(),
            msg: msg.into(),
            kind,
        }
    }

    /// Creates a violation for a request-body field rule.
    #[must_use]
    pub fn from_domain(err: &TaskDomainError) -> Self {
        let kind = match err {
            TaskDomainError::BlankField(_) => "string_blank",
            TaskDomainError::FieldTooLong { .. } => "string_too_long",
            TaskDomainError::InvalidStatus(_) => "enum",
        };
        Self::new(&["body", err.field().as_str()], err.to_string(), kind)
    }
}

/// Errors returned by route handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// 400 with a single detail message.
    #[error("{0}")]
    BadRequest(String),
    /// 404 with a single detail message.
    #[error("{0}")]
    NotFound(String),
    /// 409 with a single detail message.
    #[error("{0}")]
    Conflict(String),
    /// 422 with structured violations.
    #[error("request validation failed")]
    Unprocessable(Vec<FieldViolation>),
    /// 500; the cause is logged, never returned.
    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    /// Maps a repository error raised while creating a task.
    ///
    /// Field violations become 422 on this path; everything else follows
    /// [`From<TaskRepositoryError>`].
    #[must_use]
    pub fn from_create(err: TaskRepositoryError) -> Self {
        match err {
            TaskRepositoryError::Validation(domain) => {
                Self::Unprocessable(vec![FieldViolation::from_domain(&domain)])
            }
            other => other.into(),
        }
    }

    /// Returns the HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<TaskRepositoryError> for ApiError {
    fn from(err: TaskRepositoryError) -> Self {
        match err {
            TaskRepositoryError::NotFound(_) => Self::NotFound(err.to_string()),
            TaskRepositoryError::EmptyUpdate | TaskRepositoryError::Validation(_) => {
                Self::BadRequest(err.to_string())
            }
            TaskRepositoryError::DuplicateTask(_) => Self::Conflict(err.to_string()),
            TaskRepositoryError::Cancelled | TaskRepositoryError::Persistence(_) => {
                tracing::error!(error = %err, "task repository operation failed");
                Self::Internal
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let kind = match &rejection {
            JsonRejection::JsonDataError(_) => "json_data",
            JsonRejection::JsonSyntaxError(_) => "json_invalid",
            JsonRejection::MissingJsonContentType(_) => "content_type",
            _ => "body",
        };
        Self::Unprocessable(vec![FieldViolation::new(
            &["body"],
            rejection.body_text(),
            kind,
        )])
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::Unprocessable(vec![FieldViolation::new(
            &["path", "task_id"],
            format!("Input should be a valid UUID: {}", rejection.body_text()),
            "uuid_parsing",
        )])
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            Self::Unprocessable(violations) => ErrorResponse {
                detail: ErrorDetail::Violations(violations),
            },
            Self::Internal => ErrorResponse::message(INTERNAL_ERROR_DETAIL),
            Self::BadRequest(detail) | Self::NotFound(detail) | Self::Conflict(detail) => {
                ErrorResponse::message(detail)
            }
        };
        (status, Json(body)).into_response()
    }
}
