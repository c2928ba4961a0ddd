//! Lifecycle hook registry.
//!
//! Hooks are project-supplied callbacks fired at named lifecycle points.
//! The registry is resolved at configuration time: each callback declares
//! whether it accepts the running-application context, instead of having its
//! signature introspected at call time.

use crate::loader::{Export, LoaderError, ModuleLoader};
use corral_domain::profile::Profile;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Named lifecycle points a hosting project can attach callbacks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
    BeforeStartup,
    AfterStartup,
    BeforeMigration,
    AfterMigration,
    OnShutdown,
}

impl LifecycleEvent {
    pub const ALL: [Self; 5] = [
        Self::BeforeStartup,
        Self::AfterStartup,
        Self::BeforeMigration,
        Self::AfterMigration,
        Self::OnShutdown,
    ];

    /// Canonical export name used for discovery from a module folder.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::BeforeStartup => "before_startup",
            Self::AfterStartup => "after_startup",
            Self::BeforeMigration => "before_migration",
            Self::AfterMigration => "after_migration",
            Self::OnShutdown => "on_shutdown",
        }
    }
}

/// Context handed to context-accepting callbacks.
#[derive(Debug, Clone)]
pub struct HookContext {
    pub profile: Profile,
}

/// A lifecycle callback with a declared capability: either it takes no
/// arguments or it accepts the [`HookContext`].
#[derive(Clone)]
pub enum Callback {
    Plain(Arc<dyn Fn() + Send + Sync>),
    WithContext(Arc<dyn Fn(&HookContext) + Send + Sync>),
}

impl Callback {
    pub fn plain(f: impl Fn() + Send + Sync + 'static) -> Self {
        Self::Plain(Arc::new(f))
    }

    pub fn with_context(f: impl Fn(&HookContext) + Send + Sync + 'static) -> Self {
        Self::WithContext(Arc::new(f))
    }

    pub fn invoke(&self, ctx: &HookContext) {
        match self {
            Self::Plain(f) => f(),
            Self::WithContext(f) => f(ctx),
        }
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain(_) => f.write_str("Callback::Plain"),
            Self::WithContext(_) => f.write_str("Callback::WithContext"),
        }
    }
}

/// Whether a missing hook is silently skipped or treated as an error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MissingHookPolicy {
    /// Missing hooks resolve to a no-op (original behavior).
    #[default]
    Noop,
    /// Missing hooks fail the lifecycle step that fires them.
    Error,
}

/// Errors raised when firing hooks.
#[corral_derive::app_error]
pub enum HookError {
    #[error("No hook registered for lifecycle event '{event}'{}", format_context(context))]
    Missing { event: &'static str, context: Option<Cow<'static, str>> },
}

/// Event -> callback mapping with an explicit missing-hook policy.
#[derive(Debug, Default)]
pub struct HookRegistry {
    hooks: HashMap<LifecycleEvent, Callback>,
    policy: MissingHookPolicy,
}

impl HookRegistry {
    #[must_use]
    pub fn new(policy: MissingHookPolicy) -> Self {
        Self { hooks: HashMap::new(), policy }
    }

    /// Registers a callback for an event (builder style). Explicit
    /// registrations take precedence over discovered ones.
    #[must_use]
    pub fn with(mut self, event: LifecycleEvent, callback: Callback) -> Self {
        self.hooks.insert(event, callback);
        self
    }

    pub fn register(&mut self, event: LifecycleEvent, callback: Callback) {
        self.hooks.insert(event, callback);
    }

    #[must_use]
    pub fn contains(&self, event: LifecycleEvent) -> bool {
        self.hooks.contains_key(&event)
    }

    #[must_use]
    pub const fn policy(&self) -> MissingHookPolicy {
        self.policy
    }

    /// Fills unregistered slots with callbacks discovered by name from the
    /// module folder.
    ///
    /// # Errors
    /// Propagates loader errors; already-registered hooks are untouched.
    pub fn discover(
        &mut self,
        loader: &mut ModuleLoader,
        folder: &str,
    ) -> Result<(), LoaderError> {
        let wanted: Vec<&str> = LifecycleEvent::ALL
            .iter()
            .copied()
            .filter(|event| !self.hooks.contains_key(event))
            .map(LifecycleEvent::name)
            .collect();
        if wanted.is_empty() {
            return Ok(());
        }

        let found = loader.functions(folder, &wanted)?;
        for event in LifecycleEvent::ALL {
            if let Some(callback) = found.get(event.name()) {
                self.hooks.entry(event).or_insert_with(|| callback.clone());
            }
        }
        Ok(())
    }

    /// Fires the callback registered for `event`, honoring the missing-hook
    /// policy.
    ///
    /// # Errors
    /// Returns [`HookError::Missing`] under [`MissingHookPolicy::Error`]
    /// when no callback is registered.
    pub fn fire(&self, event: LifecycleEvent, ctx: &HookContext) -> Result<(), HookError> {
        match self.hooks.get(&event) {
            Some(callback) => {
                tracing::info!(event = event.name(), "Running lifecycle hook");
                callback.invoke(ctx);
                Ok(())
            }
            None => match self.policy {
                MissingHookPolicy::Noop => {
                    tracing::debug!(event = event.name(), "No hook registered, skipping");
                    Ok(())
                }
                MissingHookPolicy::Error => {
                    Err(HookError::Missing { event: event.name(), context: None })
                }
            },
        }
    }
}

/// Convenience for building a function export out of a callback.
impl From<Callback> for Export {
    fn from(callback: Callback) -> Self {
        Self::Function(callback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn recording(log: &Arc<Mutex<Vec<&'static str>>>, label: &'static str) -> Callback {
        let log = log.clone();
        Callback::plain(move || log.lock().expect("log lock").push(label))
    }

    #[test]
    fn fire_invokes_registered_callback() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let registry = HookRegistry::default()
            .with(LifecycleEvent::BeforeStartup, recording(&log, "before_startup"));
        let ctx = HookContext { profile: Profile::default() };

        registry.fire(LifecycleEvent::BeforeStartup, &ctx).expect("hook fires");
        assert_eq!(*log.lock().expect("log lock"), ["before_startup"]);
    }

    #[test]
    fn missing_hook_is_noop_by_default() {
        let registry = HookRegistry::default();
        let ctx = HookContext { profile: Profile::default() };
        registry.fire(LifecycleEvent::OnShutdown, &ctx).expect("noop policy");
    }

    #[test]
    fn missing_hook_errors_under_strict_policy() {
        let registry = HookRegistry::new(MissingHookPolicy::Error);
        let ctx = HookContext { profile: Profile::default() };
        let err = registry.fire(LifecycleEvent::OnShutdown, &ctx).expect_err("strict policy");
        assert!(matches!(err, HookError::Missing { event: "on_shutdown", .. }));
    }

    #[test]
    fn context_capability_receives_profile() {
        let seen = Arc::new(Mutex::new(None));
        let seen_in_hook = seen.clone();
        let registry = HookRegistry::default().with(
            LifecycleEvent::AfterStartup,
            Callback::with_context(move |ctx| {
                *seen_in_hook.lock().expect("seen lock") = Some(ctx.profile.app.name.clone());
            }),
        );
        let ctx = HookContext { profile: Profile::default() };

        registry.fire(LifecycleEvent::AfterStartup, &ctx).expect("hook fires");
        assert_eq!(seen.lock().expect("seen lock").as_deref(), Some("CorralApp"));
    }
}
