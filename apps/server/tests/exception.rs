mod common;

use axum::http::StatusCode;
use common::{body_string, demo_packages, faulty_router, get, server_with};
use corral::prelude::*;
use tower::ServiceExt;

fn faulty_packages() -> PackageRegistry {
    PackageRegistry::default().mount(
        "src",
        Package::with_init(|| {
            Namespace::builder("src").object("faulty", faulty_router()).build()
        }),
    )
}

#[tokio::test]
async fn panicking_handler_yields_generic_500() {
    let server = server_with(faulty_packages(), Profile::default()).await;
    let response = server.router().oneshot(get("/faulty/boom")).await.expect("response");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_string(response).await;
    assert!(body.contains("Internal Server Error"));
    assert!(
        !body.contains("exploded while handling the request"),
        "panic detail must not leak outside debug profiles"
    );
}

#[tokio::test]
async fn debug_profile_exposes_the_panic_detail() {
    let mut profile = Profile::default();
    profile.app.debug = true;

    let server = server_with(faulty_packages(), profile).await;
    let response = server.router().oneshot(get("/faulty/boom")).await.expect("response");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_string(response).await;
    assert!(body.contains("exploded while handling the request"));
}

#[tokio::test]
async fn healthy_routes_are_unaffected_by_faulty_neighbors() {
    let packages = PackageRegistry::default().mount(
        "src",
        Package::with_init(|| {
            Namespace::builder("src")
                .object("demo", common::demo_router())
                .object("faulty", faulty_router())
                .build()
        }),
    );

    let server = server_with(packages, Profile::default()).await;
    let router = server.router();

    let boom = router.clone().oneshot(get("/faulty/boom")).await.expect("boom response");
    assert_eq!(boom.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let ping = router.oneshot(get("/demo/ping")).await.expect("ping response");
    assert_eq!(ping.status(), StatusCode::OK);
}
