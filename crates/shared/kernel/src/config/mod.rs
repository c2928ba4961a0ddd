use config::{Config, Environment as EnvSource, File};
use corral_domain::constants::DEFAULT_MODULE_FOLDER;
use corral_domain::profile::Profile;
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::info;

/// Environment variable selecting the configuration profile. Fatal when
/// unset or blank.
pub const PROFILE_VAR: &str = "CORRAL_PROFILE";
/// Environment variable overriding the working directory profiles are
/// resolved against.
pub const CWD_VAR: &str = "CORRAL_CWD";
/// Environment variable overriding the module folder packages are mounted
/// under.
pub const MODULES_VAR: &str = "CORRAL_MODULES";

/// Errors raised while resolving the environment and its profile.
#[corral_derive::app_error]
pub enum ConfigError {
    /// No profile was selected through [`PROFILE_VAR`].
    #[error("No profile selected: set {PROFILE_VAR} to a profile name{}", format_context(context))]
    ProfileNotSelected { context: Option<Cow<'static, str>> },

    /// The profile file could not be read or deserialized.
    #[error("Profile error{}: {source}", format_context(context))]
    Profile { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// A reusable configuration loader combining file-based settings with
/// environment overrides.
///
/// 1. **Base file**: `<path>.{toml,yaml,json}`, auto-detected extension.
/// 2. **Environment overrides**: `CORRAL__`-prefixed variables, nested keys
///    separated by double underscores (e.g. `CORRAL__APP__PORT`).
///
/// # Errors
/// Returns [`ConfigError::Profile`] when the file is missing or its content
/// does not match `T`.
pub fn load_config<T>(path: impl AsRef<Path>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let path = path.as_ref();

    let builder = Config::builder().add_source(File::from(path).required(true)).add_source(
        EnvSource::with_prefix("CORRAL").separator("__").convert_case(config::Case::Snake),
    );

    info!("Loading config from {}", path.display());

    let config = builder
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")?;

    Ok(config)
}

/// The environment-selected runtime context: one loaded profile plus the
/// search-path selectors.
///
/// Explicitly constructed by the process entry point and passed into the
/// application factory; there is no process-global instance.
#[derive(Debug, Clone)]
pub struct Environment {
    profile: Profile,
    profile_name: String,
    cwd: PathBuf,
    module_folder: String,
}

impl Environment {
    /// Resolves the environment from process variables and loads the
    /// selected profile.
    ///
    /// # Errors
    /// Returns [`ConfigError::ProfileNotSelected`] when [`PROFILE_VAR`] is
    /// unset or blank, and [`ConfigError::Profile`] when the profile file
    /// cannot be loaded.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Environment::load`], with variable resolution injected.
    /// Lets callers (and tests) supply selectors without touching the
    /// process environment.
    ///
    /// # Errors
    /// Same contract as [`Environment::load`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let profile_name = lookup(PROFILE_VAR)
            .map(|raw| raw.trim().to_owned())
            .filter(|name| !name.is_empty())
            .ok_or(ConfigError::ProfileNotSelected { context: None })?;

        let cwd = lookup(CWD_VAR).map_or_else(
            || std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            PathBuf::from,
        );

        let module_folder = lookup(MODULES_VAR)
            .map(|raw| raw.trim().to_owned())
            .filter(|folder| !folder.is_empty())
            .unwrap_or_else(|| DEFAULT_MODULE_FOLDER.to_owned());

        let profile = load_config(cwd.join(&profile_name))?;

        Ok(Self { profile, profile_name, cwd, module_folder })
    }

    /// Builds an environment from an already-loaded profile. Intended for
    /// embedding and tests; `load` is the production path.
    pub fn with_profile(profile: Profile, module_folder: impl Into<String>) -> Self {
        Self {
            profile,
            profile_name: String::new(),
            cwd: PathBuf::from("."),
            module_folder: module_folder.into(),
        }
    }

    /// Re-reads the profile file in place.
    ///
    /// # Errors
    /// Returns [`ConfigError::Profile`] when the file cannot be re-read.
    /// Environments built with [`Environment::with_profile`] keep their
    /// profile untouched.
    pub fn reload(&mut self) -> Result<(), ConfigError> {
        if self.profile_name.is_empty() {
            return Ok(());
        }
        self.profile = load_config(self.cwd.join(&self.profile_name))?;
        Ok(())
    }

    #[must_use]
    pub const fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn profile_mut(&mut self) -> &mut Profile {
        &mut self.profile
    }

    #[must_use]
    pub fn profile_name(&self) -> &str {
        &self.profile_name
    }

    #[must_use]
    pub const fn cwd(&self) -> &PathBuf {
        &self.cwd
    }

    #[must_use]
    pub fn module_folder(&self) -> &str {
        &self.module_folder
    }
}
