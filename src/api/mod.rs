//! HTTP surface: bearer-token gate, task routes, and API discovery.
//!
//! Handlers open one repository session per request through
//! [`state::TaskSession`] and translate repository failures into
//! [`error::ApiError`] responses.

pub mod auth;
pub mod docs;
pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use auth::BearerSecret;
pub use error::ApiError;
pub use routes::router;
pub use state::AppState;
