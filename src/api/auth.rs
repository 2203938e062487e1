//! Static bearer-token gate applied in front of every route.

use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Json,
    extract::{ConnectInfo, Request, State},
    http::{HeaderValue, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use subtle::ConstantTimeEq;
use thiserror::Error;

use super::{error::ErrorResponse, state::AppState};

/// Paths served without authentication.
pub const EXEMPT_PATHS: [&str; 3] = ["/docs", "/redoc", "/openapi.json"];

/// Prefix of the Swagger UI assets, which are served without authentication.
const DOCS_ASSET_PREFIX: &str = "/docs/";

/// Shared secret that callers must present.
#[derive(Clone)]
pub struct BearerSecret(Arc<str>);

impl BearerSecret {
    /// Wraps the configured secret.
    #[must_use]
    pub fn new(secret: &str) -> Self {
        Self(Arc::from(secret))
    }

    /// Compares `token` with the secret in time independent of where they
    /// differ.
    #[must_use]
    pub fn matches(&self, token: &str) -> bool {
        self.0.as_bytes().ct_eq(token.as_bytes()).into()
    }
}

impl fmt::Debug for BearerSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerSecret(<redacted>)")
    }
}

/// Reasons a request is turned away at the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthRejection {
    /// No `Authorization` header was sent.
    #[error("Authorization header missing")]
    MissingHeader,
    /// The header is not `<scheme> <token>`.
    #[error("Invalid header format")]
    MalformedHeader,
    /// The scheme is not `Bearer`.
    #[error("Invalid authentication scheme")]
    UnsupportedScheme,
    /// The token does not match the configured secret.
    #[error("Invalid token")]
    InvalidToken,
}

impl AuthRejection {
    /// Returns the message sent to the client.
    #[must_use]
    pub const fn detail(self) -> &'static str {
        match self {
            Self::MissingHeader => "Authorization header missing",
            Self::MalformedHeader | Self::UnsupportedScheme | Self::InvalidToken => {
                "Invalid authentication credentials"
            }
        }
    }
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            [(header::WWW_AUTHENTICATE, "Bearer")],
            Json(ErrorResponse::message(self.detail())),
        )
            .into_response()
    }
}

/// Checks an `Authorization` header value against `secret`.
///
/// # Errors
///
/// Returns the [`AuthRejection`] describing why the header is unacceptable.
pub fn authenticate(
    header: Option<&HeaderValue>,
    secret: &BearerSecret,
) -> Result<(), AuthRejection> {
    let value = header.ok_or(AuthRejection::MissingHeader)?;
    let raw = value
        .to_str()
        .map_err(|_| AuthRejection::MalformedHeader)?;

    let mut parts = raw.split_whitespace();
    let (Some(scheme), Some(token), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(AuthRejection::MalformedHeader);
    };
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthRejection::UnsupportedScheme);
    }
    if !secret.matches(token) {
        return Err(AuthRejection::InvalidToken);
    }
    Ok(())
}

/// Returns `true` for paths that skip the gate.
#[must_use]
pub fn is_exempt(path: &str) -> bool {
    EXEMPT_PATHS.contains(&path) || path.starts_with(DOCS_ASSET_PREFIX)
}

/// Middleware rejecting requests without the configured bearer token.
pub async fn require_bearer(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_owned();
    if is_exempt(&path) {
        return next.run(request).await;
    }

    let client = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map_or_else(|| "unknown".to_owned(), |info| info.0.ip().to_string());

    match authenticate(
        request.headers().get(header::AUTHORIZATION),
        state.bearer(),
    ) {
        Ok(()) => {
            tracing::info!(%client, %path, "authenticated request");
            next.run(request).await
        }
        Err(rejection) => {
            tracing::warn!(%client, %path, reason = %rejection, "rejected request");
            rejection.into_response()
        }
    }
}
