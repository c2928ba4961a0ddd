mod common;

use axum::http::StatusCode;
use common::{body_string, demo_packages, get, server_with};
use corral::prelude::*;
use tower::ServiceExt;

#[tokio::test]
async fn healthcheck_returns_empty_200() {
    let server = server_with(demo_packages(), Profile::default()).await;
    let response = server.router().oneshot(get("/healthcheck")).await.expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.is_empty(), "healthcheck body must be empty");
}

#[tokio::test]
async fn healthcheck_works_without_any_packages() {
    let server = corral_server::Server::builder()
        .profile(Profile::default())
        .build()
        .await
        .expect("server without packages builds");
    let response = server.router().oneshot(get("/healthcheck")).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn openapi_document_is_exposed_at_the_configured_path() {
    let mut profile = Profile::default();
    profile.app.openapi.path = "/spec.json".to_owned();

    let server = server_with(demo_packages(), profile).await;
    let response = server.router().oneshot(get("/spec.json")).await.expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("/healthcheck"), "system endpoints documented");
    assert!(body.contains("CorralApp"), "profile identity lands in the document");
}

#[tokio::test]
async fn openapi_document_can_be_disabled() {
    let mut profile = Profile::default();
    profile.app.openapi.enabled = false;

    let server = server_with(demo_packages(), profile).await;
    let response = server.router().oneshot(get("/openapi.json")).await.expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
