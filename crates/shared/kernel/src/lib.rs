//! Kernel utilities shared across the platform.
//!
//! This crate owns the pieces every Corral process needs before it can serve
//! a single request: the environment-selected configuration profile, the
//! module loader that discovers what a hosting project mounted, and the
//! lifecycle hook registry. Server plumbing (state, routes loader, health
//! endpoint, exception layer) lives behind the `server` feature.
//!
//! ## Profile loading
//! ```rust,ignore
//! use corral_kernel::config::Environment;
//!
//! let env = Environment::load()?;
//! println!("serving {} on port {}", env.profile().app.name, env.profile().app.port);
//! ```
//!
//! ## Module discovery
//! ```rust,ignore
//! use corral_kernel::loader::{ModuleLoader, Namespace, Package, PackageRegistry};
//!
//! let registry = PackageRegistry::default()
//!     .mount("src", Package::with_init(|| Namespace::builder("src").build()));
//! let mut loader = ModuleLoader::new(registry);
//! let namespace = loader.load("src")?;
//! ```

pub mod config;
pub mod hooks;
pub mod loader;
pub mod prelude;
#[cfg(feature = "server")]
pub mod server;

pub use corral_domain as domain;
