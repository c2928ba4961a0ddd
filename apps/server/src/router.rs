use axum::http::{HeaderValue, Method, header};
use axum::routing::get;
use axum::{Json, Router, middleware};
use corral::kernel::server::{ApiState, RoutesLoader, handle_panics};
use tower_http::cors::{Any, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa::openapi::ServerBuilder as OpenApiServerBuilder;
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable};

#[derive(OpenApi)]
struct ApiDoc;

/// Assembles the application router and the finalized OpenAPI document.
///
/// System endpoints and every discovered router contribute to the document;
/// the profile supplies identity, server list, CORS origins and whether the
/// document is exposed at all.
pub(crate) fn init(state: ApiState, routes: &RoutesLoader) -> (Router, utoipa::openapi::OpenApi) {
    let profile = state.profile.clone();

    let mut api_router = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .merge(corral::server::router::system_router());
    for route in routes.routes() {
        api_router = api_router.nest(route.prefix(), route.to_router());
    }

    let (app_routes, mut api_doc) = api_router
        .layer(middleware::from_fn_with_state(state.clone(), handle_panics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
        .split_for_parts();

    api_doc.info.title = profile.app.name.clone();
    api_doc.info.version = profile.app.version.clone();
    if !profile.app.openapi.servers.is_empty() {
        api_doc.servers = Some(
            profile
                .app
                .openapi
                .servers
                .iter()
                .map(|(description, url)| {
                    OpenApiServerBuilder::new()
                        .url(url.clone())
                        .description(Some(description.clone()))
                        .build()
                })
                .collect(),
        );
    }

    let mut app = Router::new().merge(app_routes);

    if profile.app.openapi.enabled {
        let doc = api_doc.clone();
        app = app
            .route(
                &profile.app.openapi.path,
                get(move || {
                    let doc = doc.clone();
                    async move { Json(doc) }
                }),
            )
            .merge(Scalar::with_url(profile.app.openapi.docs_path.clone(), api_doc.clone()));
    }

    (app.layer(cors_layer(&profile.app.openapi.origins)), api_doc)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);
    }

    // Wildcard methods/headers cannot be combined with credentials.
    let parsed: Vec<HeaderValue> =
        origins.iter().filter_map(|origin| origin.parse().ok()).collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(parsed))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}
