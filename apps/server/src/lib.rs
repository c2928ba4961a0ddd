//! # Corral Server
//!
//! The application factory: discovers what a hosting project mounted, wires
//! it into an `Axum` server and drives the startup/shutdown lifecycle.
//!
//! ## Example
//! ```no_run
//! use corral::prelude::*;
//! use corral_server::Server;
//!
//! #[corral_runtime::main(service)]
//! async fn main() -> anyhow::Result<()> {
//!     let packages = PackageRegistry::default()
//!         .mount("src", Package::with_init(|| Namespace::builder("src").build()));
//!
//!     Server::builder()
//!         .profile(Profile::default())
//!         .packages(packages)
//!         .build()
//!         .await?
//!         .run()
//!         .await
//! }
//! ```

mod lifecycle;
mod router;

pub use lifecycle::MigrationTask;

use anyhow::{Context, Result, anyhow};
use axum_server::Handle;
use corral::kernel::config::Environment;
use corral::kernel::hooks::{HookContext, HookRegistry, LifecycleEvent};
use corral::kernel::loader::{ModuleLoader, PackageRegistry};
use corral::kernel::server::{ApiRouter, ApiState, RoutesLoader};
use corral::prelude::Profile;
use corral_database::{Database, Migration};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};

/// A fluent builder for configuring and initializing the [`Server`].
#[must_use = "builders do nothing unless you call .build()"]
#[derive(Debug, Default)]
pub struct ServerBuilder {
    environment: Option<Environment>,
    packages: Option<PackageRegistry>,
    hooks: HookRegistry,
    port: Option<u16>,
}

impl ServerBuilder {
    /// Sets the environment (profile + search-path selectors).
    pub fn environment(mut self, environment: Environment) -> Self {
        self.environment = Some(environment);
        self
    }

    /// Shortcut wrapping an already-loaded profile with default selectors.
    pub fn profile(mut self, profile: Profile) -> Self {
        self.environment = Some(Environment::with_profile(
            profile,
            corral::domain::constants::DEFAULT_MODULE_FOLDER,
        ));
        self
    }

    /// Declares the packages the loader discovers routers, hooks and
    /// migrations from. Without a registry, discovery is skipped and only
    /// the system endpoints are served.
    pub fn packages(mut self, packages: PackageRegistry) -> Self {
        self.packages = Some(packages);
        self
    }

    /// Sets explicitly registered lifecycle hooks. Discovered hooks fill
    /// only the remaining slots.
    pub fn hooks(mut self, hooks: HookRegistry) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    async fn init_database(profile: &Profile) -> Result<Option<Database>> {
        if !profile.database.is_configured() {
            return Ok(None);
        }
        let database = Database::builder()
            .profile(&profile.database)
            .init()
            .await
            .context("Failed to establish database connection")?;
        Ok(Some(database))
    }

    /// Consumes the builder and initializes the server.
    ///
    /// # Process
    /// 1. Connects the database when the profile configures one
    /// 2. Runs the routes loader against the module folder
    /// 3. Resolves lifecycle hooks (explicit registrations win)
    /// 4. Collects exported migrations for the upgrade-at-start sequence
    /// 5. Constructs the application state
    ///
    /// # Errors
    /// Returns an error if the database connection fails or the module
    /// folder cannot be loaded (unmounted folder, missing initializer).
    pub async fn build(self) -> Result<Server> {
        let mut environment = self.environment.unwrap_or_else(|| {
            Environment::with_profile(
                Profile::default(),
                corral::domain::constants::DEFAULT_MODULE_FOLDER,
            )
        });
        if let Some(port) = self.port {
            environment.profile_mut().app.port = port;
        }
        let profile = environment.profile().clone();

        info!(app = %profile.app.name, port = profile.app.port, "Initializing server");

        let database = Self::init_database(&profile).await?;

        let mut hooks = self.hooks;
        let mut routes_loader = RoutesLoader::new(environment.module_folder());
        let mut migrations = Vec::new();

        if let Some(packages) = self.packages {
            let mut loader = ModuleLoader::new(packages);
            let folder = environment.module_folder().to_owned();

            routes_loader
                .load_routes(&mut loader)
                .map_err(|e| anyhow!("Failed to load routes: {e}"))?;
            hooks
                .discover(&mut loader, &folder)
                .map_err(|e| anyhow!("Failed to resolve lifecycle hooks: {e}"))?;
            migrations = loader
                .instances_of::<Migration>(&folder)
                .map_err(|e| anyhow!("Failed to collect migrations: {e}"))?
                .iter()
                .map(|m| (**m).clone())
                .collect();
        }

        let state = ApiState::builder()
            .profile(profile)
            .database(database)
            .build()
            .context("Failed to finalize API state")?;

        Ok(Server { state, environment, hooks: Arc::new(hooks), routes: routes_loader, migrations })
    }
}

/// A fully initialized server instance ready to run.
#[must_use = "call .run().await to start the server"]
#[derive(Debug)]
pub struct Server {
    state: ApiState,
    environment: Environment,
    hooks: Arc<HookRegistry>,
    routes: RoutesLoader,
    migrations: Vec<Migration>,
}

impl Server {
    /// Returns a new [`ServerBuilder`] to configure the server.
    pub fn builder() -> ServerBuilder {
        ServerBuilder::default()
    }

    /// Returns a reference to the application state.
    #[must_use]
    pub const fn state(&self) -> &ApiState {
        &self.state
    }

    /// The routers discovered from the module folder.
    #[must_use]
    pub fn routes(&self) -> &[Arc<ApiRouter>] {
        self.routes.routes()
    }

    /// Builds the complete application router (system endpoints, discovered
    /// routers, CORS, exception layer). Mainly useful for tests driving the
    /// router without binding a socket.
    #[must_use]
    pub fn router(&self) -> axum::Router {
        router::init(self.state.clone(), &self.routes).0
    }

    /// Starts the server and runs until the shutdown signal is received.
    ///
    /// Lifecycle: `before_startup` -> bind -> `after_startup` -> optionally
    /// spawn the migration sequence in the background -> serve ->
    /// `on_shutdown`. Application readiness is NOT gated on the migration
    /// task; early requests may race a schema migration.
    ///
    /// # Errors
    /// Returns an error if a lifecycle hook fails under the strict policy,
    /// the OpenAPI snapshot cannot be written, or the listener fails.
    pub async fn run(self) -> Result<()> {
        let profile = self.state.profile.clone();
        let ctx = HookContext { profile: profile.clone() };

        self.hooks.fire(LifecycleEvent::BeforeStartup, &ctx)?;

        let (app, api_doc) = router::init(self.state.clone(), &self.routes);

        if profile.app.openapi.enabled {
            lifecycle::write_openapi_snapshot(self.environment.cwd(), &api_doc)?;
        }

        let address =
            SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), profile.app.port);
        info!(%address, "Starting server");

        let handle = Handle::<SocketAddr>::new();
        let shutdown_handle = handle.clone();

        tokio::spawn(async move {
            if let Err(e) = shutdown_signal().await {
                error!("Error while waiting for shutdown signal: {e}");
                return;
            }
            info!("Shutdown signal received, starting graceful shutdown...");
            shutdown_handle.graceful_shutdown(Some(std::time::Duration::from_secs(30)));
        });

        self.hooks.fire(LifecycleEvent::AfterStartup, &ctx)?;

        // Detached by design: serving starts without waiting for the schema
        // upgrade. The handle stays available until the server stops.
        let _migration_task = if lifecycle::migration_requested(&profile, &self.state) {
            Some(MigrationTask::spawn(self.state.clone(), self.hooks.clone(), self.migrations))
        } else {
            None
        };

        axum_server::bind(address)
            .handle(handle)
            .serve(app.into_make_service())
            .await
            .context("HTTP server failed")?;

        self.hooks.fire(LifecycleEvent::OnShutdown, &ctx)?;
        info!("Server shutdown complete");
        Ok(())
    }
}

/// Listens for shutdown signals (Ctrl+C, SIGTERM).
async fn shutdown_signal() -> Result<()> {
    let ctrl_c = async { signal::ctrl_c().await.context("Failed to install Ctrl+C handler") };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .context("Failed to install SIGTERM handler")?
            .recv()
            .await;
        Ok::<_, anyhow::Error>(())
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<Result<()>>();

    tokio::select! {
        res = ctrl_c => {
            res.context("Ctrl+C signal received")?;
        },
        res = terminate => {
            res.context("SIGTERM signal received")?;
        },
    }

    Ok(())
}
