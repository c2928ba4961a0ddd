use super::state::ApiState;
use crate::loader::{LoaderError, ModuleLoader};
use std::fmt;
use std::sync::Arc;
use utoipa_axum::router::OpenApiRouter;

/// A named bundle of HTTP route handlers under a path prefix.
///
/// Hosting projects export these from their route modules; the routes loader
/// discovers them by type. Wrapping [`OpenApiRouter`] keeps discovered
/// routes contributing to the OpenAPI document.
#[derive(Clone)]
pub struct ApiRouter {
    name: String,
    prefix: String,
    inner: OpenApiRouter<ApiState>,
}

impl ApiRouter {
    pub fn new(
        name: impl Into<String>,
        prefix: impl Into<String>,
        inner: OpenApiRouter<ApiState>,
    ) -> Self {
        Self { name: name.into(), prefix: prefix.into(), inner }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Clones out the wrapped router for merging into the application.
    #[must_use]
    pub fn to_router(&self) -> OpenApiRouter<ApiState> {
        self.inner.clone()
    }
}

impl fmt::Debug for ApiRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiRouter")
            .field("name", &self.name)
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

/// Discovers [`ApiRouter`] exports from one module folder.
///
/// Loading is idempotent: after the first successful `load_routes`, later
/// calls are no-ops. The collection only grows during discovery and is
/// read-only afterwards.
#[derive(Debug)]
pub struct RoutesLoader {
    folder: String,
    loaded: bool,
    routes: Vec<Arc<ApiRouter>>,
}

impl RoutesLoader {
    #[must_use]
    pub fn new(folder: impl Into<String>) -> Self {
        Self { folder: folder.into(), loaded: false, routes: Vec::new() }
    }

    /// Walks the module folder collecting every exported router.
    ///
    /// # Errors
    /// Propagates loader errors; on error nothing is recorded and a later
    /// call may retry.
    pub fn load_routes(&mut self, loader: &mut ModuleLoader) -> Result<(), LoaderError> {
        if self.loaded {
            return Ok(());
        }

        tracing::info!(folder = %self.folder, "Loading routes");
        self.routes = loader.instances_of::<ApiRouter>(&self.folder)?;
        self.loaded = true;
        tracing::info!(count = self.routes.len(), "Routes loaded");
        Ok(())
    }

    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// The discovered routers, in traversal order.
    #[must_use]
    pub fn routes(&self) -> &[Arc<ApiRouter>] {
        &self.routes
    }
}
