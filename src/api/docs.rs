//! API discovery: the `OpenAPI` document, Swagger UI and `ReDoc`.
//!
//! The document is generated from the handler and body annotations in
//! [`super::routes`]. Every discovery path is served without authentication.

use axum::Router;
use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        security::{Http, HttpAuthScheme, SecurityScheme},
    },
};
use utoipa_redoc::{Redoc, Servable};
use utoipa_swagger_ui::SwaggerUi;

use super::routes::ApiDoc;

/// Name of the security scheme every task operation requires.
pub const BEARER_SCHEME: &str = "bearer";

/// Registers the static bearer token as an HTTP security scheme.
pub struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        openapi
            .components
            .get_or_insert_with(Default::default)
            .add_security_scheme(
                BEARER_SCHEME,
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
    }
}

/// Returns the `OpenAPI` description of the task routes.
#[must_use]
pub fn openapi_document() -> openapi::OpenApi {
    ApiDoc::openapi()
}

/// Routes serving `/openapi.json`, Swagger UI under `/docs` and `ReDoc` at
/// `/redoc`.
#[must_use]
pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .merge(SwaggerUi::new("/docs").url("/openapi.json", openapi_document()))
        .merge(Redoc::with_url("/redoc", openapi_document()))
}
