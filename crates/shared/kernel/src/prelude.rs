//! Ergonomic re-exports for hosting projects.

pub use crate::config::{ConfigError, Environment};
pub use crate::hooks::{
    Callback, HookContext, HookError, HookRegistry, LifecycleEvent, MissingHookPolicy,
};
pub use crate::loader::{
    Export, LoaderError, ModuleLoader, Namespace, NamespaceBuilder, Package, PackageRegistry,
};
#[cfg(feature = "server")]
pub use crate::server::{ApiRouter, ApiState, RoutesLoader};
pub use corral_domain::profile::Profile;
