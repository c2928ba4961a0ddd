use crate::hooks::Callback;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A type-erased value exported by a namespace, matched by downcasting.
pub type Object = Arc<dyn Any + Send + Sync>;

/// One named entry of a [`Namespace`].
///
/// `Module` and `Alias` shape the graph; `Object` and `Function` are the
/// leaves the loader matches against. An `Alias` re-exports another mounted
/// package by folder name, which is how mutually-referential module graphs
/// are expressed.
#[derive(Clone)]
pub enum Export {
    Module(Arc<Namespace>),
    Alias(String),
    Object(Object),
    Function(Callback),
}

impl fmt::Debug for Export {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Module(ns) => f.debug_tuple("Module").field(&ns.name()).finish(),
            Self::Alias(target) => f.debug_tuple("Alias").field(target).finish(),
            Self::Object(_) => f.write_str("Object(..)"),
            Self::Function(_) => f.write_str("Function(..)"),
        }
    }
}

/// An immutable, named bag of exports. The loadable-namespace abstraction a
/// hosting project builds instead of relying on runtime reflection.
#[derive(Debug)]
pub struct Namespace {
    name: String,
    exports: Vec<(String, Export)>,
}

impl Namespace {
    /// Starts building a namespace with the given name.
    pub fn builder(name: impl Into<String>) -> NamespaceBuilder {
        NamespaceBuilder { name: name.into(), exports: Vec::new() }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn exports(&self) -> &[(String, Export)] {
        &self.exports
    }
}

/// Builder collecting exports in declaration order.
#[must_use = "builders do nothing unless you call .build()"]
#[derive(Debug)]
pub struct NamespaceBuilder {
    name: String,
    exports: Vec<(String, Export)>,
}

impl NamespaceBuilder {
    /// Exports a value matched by its concrete type.
    pub fn object<T: Any + Send + Sync>(self, name: impl Into<String>, value: T) -> Self {
        self.object_arc(name, Arc::new(value))
    }

    /// Exports an already-shared value.
    pub fn object_arc(mut self, name: impl Into<String>, value: Object) -> Self {
        self.exports.push((name.into(), Export::Object(value)));
        self
    }

    /// Exports a callback matched by its export name.
    pub fn function(mut self, name: impl Into<String>, callback: Callback) -> Self {
        self.exports.push((name.into(), Export::Function(callback)));
        self
    }

    /// Nests a child namespace.
    pub fn module(self, name: impl Into<String>, namespace: Namespace) -> Self {
        self.module_arc(name, Arc::new(namespace))
    }

    /// Nests a shared child namespace. Sharing the same `Arc` from several
    /// parents is allowed; the traversal visits it once.
    pub fn module_arc(mut self, name: impl Into<String>, namespace: Arc<Namespace>) -> Self {
        self.exports.push((name.into(), Export::Module(namespace)));
        self
    }

    /// Re-exports another mounted package by folder name.
    pub fn reexport(mut self, name: impl Into<String>, target: impl Into<String>) -> Self {
        self.exports.push((name.into(), Export::Alias(target.into())));
        self
    }

    #[must_use]
    pub fn build(self) -> Namespace {
        Namespace { name: self.name, exports: self.exports }
    }
}

/// Visibility convention, not an access-control guarantee: underscore
/// prefixed exports stay private unless the build carries debug assertions.
pub(crate) fn is_visible(name: &str) -> bool {
    visible_with(name, cfg!(debug_assertions))
}

pub(crate) fn visible_with(name: &str, debug_enabled: bool) -> bool {
    debug_enabled || !name.starts_with('_')
}
