//! Module discovery over explicitly mounted packages.
//!
//! A hosting project mounts [`Package`]s into a [`PackageRegistry`] under
//! logical folder names. The [`ModuleLoader`] resolves a folder to its
//! namespace (running the package initializer exactly once) and walks the
//! namespace graph collecting exports of a requested shape.
//!
//! The walk is a breadth-first worklist with a visited set keyed on
//! namespace identity, so shared and cyclic graphs terminate.

mod namespace;

pub use namespace::{Export, Namespace, NamespaceBuilder, Object};

use crate::hooks::Callback;
use fxhash::FxHashSet;
use std::any::Any;
use std::borrow::Cow;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::Arc;

/// Errors raised while loading mounted packages.
#[corral_derive::app_error]
pub enum LoaderError {
    /// The requested folder name has no mounted package.
    #[error("Package folder '{folder}' not found{}", format_context(context))]
    PackageNotFound { folder: String, context: Option<Cow<'static, str>> },

    /// The package was mounted without an initializer.
    #[error("Package folder '{folder}' has no initializer{}", format_context(context))]
    MissingInitializer { folder: String, context: Option<Cow<'static, str>> },
}

type InitFn = Arc<dyn Fn() -> Namespace + Send + Sync>;

/// A mountable unit: a folder name plus the initializer producing its root
/// namespace. Mounting a package without an initializer is legal but fails
/// at load time, mirroring a folder without an init marker.
#[derive(Clone, Default)]
pub struct Package {
    init: Option<InitFn>,
}

impl Package {
    /// Declares a package without an initializer.
    #[must_use]
    pub fn new() -> Self {
        Self { init: None }
    }

    /// Declares a package whose namespace is produced by `init` on first
    /// load.
    pub fn with_init(init: impl Fn() -> Namespace + Send + Sync + 'static) -> Self {
        Self { init: Some(Arc::new(init)) }
    }
}

impl fmt::Debug for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Package").field("initialized", &self.init.is_some()).finish()
    }
}

/// The mounts a hosting project declares: folder name -> package.
#[derive(Debug, Default)]
pub struct PackageRegistry {
    mounts: HashMap<String, Package>,
}

impl PackageRegistry {
    /// Mounts a package under a folder name (builder style).
    #[must_use]
    pub fn mount(mut self, folder: impl Into<String>, package: Package) -> Self {
        self.mounts.insert(folder.into(), package);
        self
    }

    /// Mounts a package under a folder name.
    pub fn register(&mut self, folder: impl Into<String>, package: Package) {
        self.mounts.insert(folder.into(), package);
    }

    fn get(&self, folder: &str) -> Option<&Package> {
        self.mounts.get(folder)
    }
}

/// The loader context: registry plus the module cache. Explicitly
/// constructed during bootstrap and passed by the caller; no global state.
#[derive(Debug)]
pub struct ModuleLoader {
    registry: PackageRegistry,
    cache: HashMap<String, Arc<Namespace>>,
}

impl ModuleLoader {
    #[must_use]
    pub fn new(registry: PackageRegistry) -> Self {
        Self { registry, cache: HashMap::new() }
    }

    /// Whether the folder's package has already been loaded.
    #[must_use]
    pub fn is_loaded(&self, folder: &str) -> bool {
        self.cache.contains_key(folder)
    }

    /// Resolves a folder to its namespace, running the initializer on first
    /// call. Later calls short-circuit from the module cache; cached entries
    /// are never replaced.
    ///
    /// # Errors
    /// [`LoaderError::PackageNotFound`] when the folder is not mounted,
    /// [`LoaderError::MissingInitializer`] when it carries no initializer.
    pub fn load(&mut self, folder: &str) -> Result<Arc<Namespace>, LoaderError> {
        if let Some(cached) = self.cache.get(folder) {
            return Ok(cached.clone());
        }

        let package = self.registry.get(folder).ok_or_else(|| LoaderError::PackageNotFound {
            folder: folder.to_owned(),
            context: None,
        })?;
        let init = package.init.clone().ok_or_else(|| LoaderError::MissingInitializer {
            folder: folder.to_owned(),
            context: None,
        })?;

        let namespace = Arc::new(init());
        self.cache.insert(folder.to_owned(), namespace.clone());
        Ok(namespace)
    }

    /// Walks the folder's namespace graph breadth-first and collects every
    /// leaf export the matcher accepts.
    ///
    /// Nested namespaces are followed to arbitrary depth; aliases resolve
    /// through the registry (loading their targets on demand). A visited set
    /// keyed on namespace identity makes self- and mutually-referential
    /// graphs terminate. Underscore-prefixed leaves are skipped unless the
    /// build carries debug assertions.
    ///
    /// # Errors
    /// Propagates load errors; on error no partial result is returned.
    pub fn collect<R>(
        &mut self,
        folder: &str,
        mut matcher: impl FnMut(&str, &Export) -> Option<R>,
    ) -> Result<Vec<R>, LoaderError> {
        let root = self.load(folder)?;

        let mut visited = FxHashSet::default();
        visited.insert(Arc::as_ptr(&root) as usize);
        let mut worklist = VecDeque::from([root]);
        let mut matches = Vec::new();

        while let Some(namespace) = worklist.pop_front() {
            for (name, export) in namespace.exports() {
                match export {
                    Export::Module(child) => {
                        if visited.insert(Arc::as_ptr(child) as usize) {
                            worklist.push_back(child.clone());
                        }
                    }
                    Export::Alias(target) => {
                        let child = self.load(target)?;
                        if visited.insert(Arc::as_ptr(&child) as usize) {
                            worklist.push_back(child);
                        }
                    }
                    leaf => {
                        if namespace::is_visible(name)
                            && let Some(found) = matcher(name, leaf)
                        {
                            matches.push(found);
                        }
                    }
                }
            }
        }

        Ok(matches)
    }

    /// Collects every object export that is an instance of `T`.
    ///
    /// # Errors
    /// Propagates load errors from [`ModuleLoader::collect`].
    pub fn instances_of<T: Any + Send + Sync>(
        &mut self,
        folder: &str,
    ) -> Result<Vec<Arc<T>>, LoaderError> {
        self.collect(folder, |_, export| match export {
            Export::Object(object) => object.clone().downcast::<T>().ok(),
            _ => None,
        })
    }

    /// Collects callbacks whose export name is one of `names`. The first
    /// match in traversal order wins per name.
    ///
    /// # Errors
    /// Propagates load errors from [`ModuleLoader::collect`].
    pub fn functions(
        &mut self,
        folder: &str,
        names: &[&str],
    ) -> Result<HashMap<String, Callback>, LoaderError> {
        let mut found: HashMap<String, Callback> = HashMap::with_capacity(names.len());
        self.collect(folder, |name, export| {
            if let Export::Function(callback) = export
                && names.contains(&name)
                && !found.contains_key(name)
            {
                found.insert(name.to_owned(), callback.clone());
            }
            None::<()>
        })?;
        Ok(found)
    }
}
