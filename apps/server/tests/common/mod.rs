#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, Response};
use corral::kernel::server::{ApiRouter, ApiState};
use corral::prelude::*;
use corral_server::Server;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

#[utoipa::path(get, path = "/ping", responses((status = OK, description = "Liveness probe")))]
async fn ping() -> &'static str {
    "pong"
}

#[utoipa::path(get, path = "/boom", responses((status = OK, description = "Always explodes")))]
async fn boom() -> &'static str {
    panic!("exploded while handling the request")
}

pub fn demo_router() -> ApiRouter {
    ApiRouter::new("demo", "/demo", OpenApiRouter::<ApiState>::new().routes(routes!(ping)))
}

pub fn faulty_router() -> ApiRouter {
    ApiRouter::new("faulty", "/faulty", OpenApiRouter::<ApiState>::new().routes(routes!(boom)))
}

/// A module folder exporting one public and one underscore-prefixed router.
pub fn demo_packages() -> PackageRegistry {
    PackageRegistry::default().mount(
        "src",
        Package::with_init(|| {
            Namespace::builder("src")
                .object("demo", demo_router())
                .module(
                    "internal",
                    Namespace::builder("internal")
                        .object(
                            "_hidden",
                            ApiRouter::new(
                                "hidden",
                                "/hidden",
                                OpenApiRouter::<ApiState>::new().routes(routes!(ping)),
                            ),
                        )
                        .build(),
                )
                .build()
        }),
    )
}

pub async fn server_with(packages: PackageRegistry, profile: Profile) -> Server {
    Server::builder().profile(profile).packages(packages).build().await.expect("server build")
}

pub fn get(path: &str) -> Request<Body> {
    Request::builder().uri(path).body(Body::empty()).expect("request")
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.expect("body bytes");
    String::from_utf8(bytes.to_vec()).expect("utf8 body")
}
