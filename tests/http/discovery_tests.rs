//! Discovery endpoints are public.

use axum::http::{Method, StatusCode, header};
use rstest::rstest;

use super::helpers::{TestApp, TestResponse, app, request, send};

fn content_type(response: &TestResponse) -> &str {
    response
        .headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
}

fn body_text(response: &TestResponse) -> &str {
    response.body.as_str().unwrap_or_default()
}

#[rstest]
#[tokio::test]
async fn openapi_document_is_served_without_credentials(app: TestApp) -> eyre::Result<()> {
    let response = send(&app.router, request(Method::GET, "/openapi.json", None, None)?).await?;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.pointer("/paths/~1tasks~1").is_some());
    assert!(response.body.pointer("/paths/~1tasks~1{task_id}").is_some());
    assert!(
        response
            .body
            .pointer("/components/securitySchemes/bearer")
            .is_some()
    );
    Ok(())
}

#[rstest]
#[tokio::test]
async fn swagger_ui_entry_redirects_to_its_index(app: TestApp) -> eyre::Result<()> {
    let response = send(&app.router, request(Method::GET, "/docs", None, None)?).await?;

    assert!(response.status.is_redirection(), "got {}", response.status);
    assert_eq!(
        response
            .headers
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok()),
        Some("/docs/")
    );
    Ok(())
}

#[rstest]
#[tokio::test]
async fn swagger_ui_page_loads_the_bundle(app: TestApp) -> eyre::Result<()> {
    let response = send(&app.router, request(Method::GET, "/docs/", None, None)?).await?;

    assert_eq!(response.status, StatusCode::OK);
    assert!(content_type(&response).starts_with("text/html"));
    assert!(body_text(&response).contains("swagger-ui-bundle.js"));
    Ok(())
}

#[rstest]
#[tokio::test]
async fn swagger_ui_points_at_the_served_document(app: TestApp) -> eyre::Result<()> {
    let response = send(
        &app.router,
        request(Method::GET, "/docs/swagger-initializer.js", None, None)?,
    )
    .await?;

    assert_eq!(response.status, StatusCode::OK);
    assert!(body_text(&response).contains("/openapi.json"));
    Ok(())
}

#[rstest]
#[tokio::test]
async fn redoc_page_embeds_the_document(app: TestApp) -> eyre::Result<()> {
    let response = send(&app.router, request(Method::GET, "/redoc", None, None)?).await?;

    assert_eq!(response.status, StatusCode::OK);
    assert!(content_type(&response).starts_with("text/html"));
    let page = body_text(&response);
    assert!(page.contains("Redoc.init"));
    assert!(page.contains("Task Manager API"));
    Ok(())
}

#[rstest]
#[tokio::test]
async fn paths_sharing_the_docs_prefix_stay_protected(app: TestApp) -> eyre::Result<()> {
    let response = send(&app.router, request(Method::GET, "/documents", None, None)?).await?;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    Ok(())
}
