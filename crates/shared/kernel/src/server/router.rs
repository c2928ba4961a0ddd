use super::health;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

/// Built-in system endpoints every application carries, regardless of what
/// the hosting project mounts.
pub fn system_router<S>() -> OpenApiRouter<S>
where
    S: Send + Sync + Clone + 'static,
{
    OpenApiRouter::<S>::new().routes(routes!(health::healthcheck_handler))
}
