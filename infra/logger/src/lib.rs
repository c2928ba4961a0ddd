//! # Logger
//!
//! Centralized logging for the platform: console plus a non-blocking,
//! size-rotating file sink, with an optional remote shipping pipeline.
//!
//! The logger walks a simple state machine: uninitialized, configured
//! (after [`LoggerBuilder::init`] or [`Logger::from_profile`]) and reloaded
//! ([`Logger::reload_level`] swaps the level filter at runtime).
//!
//! * Rotation is size-based: the threshold and retained-file count come from
//!   the profile's `log.rotation` section.
//! * Remote shipping (Cargo feature `otlp`) is gated by `log.remote.enabled`;
//!   setup failures are logged and never fatal to process startup.
//! * Use [`LoggerBuilder::env_filter`] for module-directed filters
//!   (e.g. `"corral=debug,hyper=info"`), in addition to `RUST_LOG`.
//!
//! ## Example
//!
//! ```rust
//! # use corral_logger::{Logger, LevelFilter};
//!
//! let _logger = Logger::builder()
//!     .name("my-app")
//!     .console(true)
//!     .level(LevelFilter::DEBUG)
//!     .init()
//!     .unwrap();
//! ```

mod error;
#[cfg(feature = "otlp")]
mod otlp;
mod rolling;

pub use crate::error::{LoggerError, LoggerErrorExt};
#[cfg(feature = "otlp")]
pub use crate::otlp::{RemoteShippingGuard, init_remote_shipping};
pub use tracing::level_filters::LevelFilter;

use crate::rolling::SizeRollingWriter;
use corral_domain::profile::{LogConfig, LogLevel};
use private::Sealed;
use std::fmt;
use std::fs;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, reload};

const DEFAULT_MAX_BYTES: u64 = 1024 * 1024;
const DEFAULT_KEEP: usize = 10;
const LOG_FILE_SUFFIX: &str = "log";

#[derive(Debug)]
pub struct LoggerConfig {
    console: bool,
    path: Option<PathBuf>,
    level: LevelFilter,
    max_bytes: u64,
    keep: usize,
    json: bool,
    env_filter: Option<String>,
    #[cfg(feature = "otlp")]
    remote: Option<corral_domain::profile::RemoteLogConfig>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            console: true,
            path: None,
            level: LevelFilter::INFO,
            max_bytes: DEFAULT_MAX_BYTES,
            keep: DEFAULT_KEEP,
            json: false,
            env_filter: None,
            #[cfg(feature = "otlp")]
            remote: None,
        }
    }
}

#[derive(Debug)]
pub struct NoName;
#[derive(Debug)]
pub struct WithName(String);
#[derive(Debug)]
pub struct NoFile;
#[derive(Debug)]
pub struct WithFile;

mod private {
    pub trait Sealed {}
}
impl Sealed for NoName {}
impl Sealed for WithName {}
impl Sealed for NoFile {}
impl Sealed for WithFile {}

/// A builder for configuring and initializing the global tracing subscriber.
#[derive(Debug)]
pub struct LoggerBuilder<N: Sealed = NoName, F: Sealed = NoFile> {
    config: LoggerConfig,
    name: N,
    file_state: std::marker::PhantomData<F>,
}

impl<F: Sealed> LoggerBuilder<NoName, F> {
    /// Sets the name of the logger, used as the log file stem.
    pub fn name(self, name: impl Into<String>) -> LoggerBuilder<WithName, F> {
        LoggerBuilder {
            name: WithName(name.into()),
            config: self.config,
            file_state: std::marker::PhantomData,
        }
    }
}

impl LoggerBuilder<WithName, WithFile> {
    /// Sets the rotation threshold in bytes.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn max_bytes(mut self, max: u64) -> Self {
        self.config.max_bytes = max;
        self
    }

    /// Sets how many rotated files to keep.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn keep(mut self, keep: usize) -> Self {
        self.config.keep = keep;
        self
    }

    /// Enables JSON output for the file sink.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn json(mut self) -> Self {
        self.config.json = true;
        self
    }
}

impl<F: Sealed> LoggerBuilder<WithName, F> {
    /// Configures the minimum log level to be emitted.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn level(mut self, level: LevelFilter) -> Self {
        self.config.level = level;
        self
    }

    /// Adds an explicit env filter (e.g., `corral=debug,hyper=info`).
    ///
    /// Environment variables still override via `RUST_LOG`; this is a
    /// programmatic default. Invalid filters will cause
    /// [`LoggerBuilder::init`] to return an error.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn env_filter(mut self, filter: impl Into<String>) -> Self {
        self.config.env_filter = Some(filter.into());
        self
    }

    /// Enables console logging.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn console(mut self, enabled: bool) -> Self {
        self.config.console = enabled;
        self
    }

    /// Enables the remote shipping pipeline with the given profile section.
    ///
    /// Setup failures are caught during [`LoggerBuilder::init`] and logged;
    /// the local sinks stay up either way.
    #[cfg(feature = "otlp")]
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn remote(mut self, remote: corral_domain::profile::RemoteLogConfig) -> Self {
        self.config.remote = Some(remote);
        self
    }

    /// Sets the folder log files are written to.
    pub fn path(self, path: impl Into<PathBuf>) -> LoggerBuilder<WithName, WithFile> {
        let mut config = self.config;
        config.path = Some(path.into());
        LoggerBuilder { config, name: self.name, file_state: std::marker::PhantomData }
    }

    /// Consumes the builder and initializes the global tracing subscriber.
    ///
    /// # Returns
    /// A [`Logger`] handle. **Note:** the handle contains a [`WorkerGuard`]
    /// that must be kept alive for the duration of the program so the
    /// non-blocking file sink flushes correctly.
    ///
    /// # Errors
    /// Returns [`LoggerError::Subscriber`] if a global subscriber has
    /// already been set, [`LoggerError::InvalidConfiguration`] for invalid
    /// builder settings.
    pub fn init(self) -> Result<Logger, LoggerError> {
        validate_config(&self.config, &self.name.0)?;

        let (filter_layer, reload_handle) = reload::Layer::new(build_env_filter(&self.config)?);

        let mut layers = Vec::new();

        if self.config.console {
            layers.push(layer().compact().with_ansi(true).boxed());
        }

        #[cfg(feature = "otlp")]
        let mut remote_failure = None;
        #[cfg(feature = "otlp")]
        let remote_guard = match &self.config.remote {
            Some(remote) => match otlp::init_remote_shipping(self.name.0.clone(), remote) {
                Ok(guard) => {
                    let tracer = opentelemetry::global::tracer(self.name.0.clone());
                    layers.push(tracing_opentelemetry::layer().with_tracer(tracer).boxed());
                    Some(guard)
                }
                Err(err) => {
                    remote_failure = Some(err);
                    None
                }
            },
            None => None,
        };

        let guard = if let Some(path) = self.config.path.clone() {
            fs::create_dir_all(&path)
                .context(format!("Failed to create path: {}", path.display()))?;

            let file_name = format!("{}.{LOG_FILE_SUFFIX}", self.name.0);
            let writer =
                SizeRollingWriter::new(path.join(file_name), self.config.max_bytes, self.config.keep)
                    .context("Opening log file")?;

            let (non_blocking, g) = tracing_appender::non_blocking(writer);

            let file_layer = layer().with_writer(non_blocking).with_ansi(false);

            let boxed =
                if self.config.json { file_layer.json().boxed() } else { file_layer.boxed() };

            layers.push(boxed);
            Some(g)
        } else {
            None
        };

        if layers.is_empty() {
            return Err(LoggerError::InvalidConfiguration {
                message: "No logging layers enabled. Enable console, file output, or remote shipping."
                    .into(),
                context: None,
            });
        }

        tracing_subscriber::registry().with(filter_layer).with(layers).try_init()?;

        #[cfg(feature = "otlp")]
        if let Some(err) = remote_failure {
            tracing::warn!("Remote log shipping disabled: {err}");
        }

        Ok(Logger {
            guard,
            reload: reload_handle,
            #[cfg(feature = "otlp")]
            remote: remote_guard,
        })
    }
}

/// A handle to the initialized logging system.
///
/// This struct holds the background worker guards. Drop it only when the
/// application is shutting down.
#[must_use = "Dropping this handle will stop background logging threads."]
pub struct Logger {
    guard: Option<WorkerGuard>,
    reload: reload::Handle<EnvFilter, Registry>,
    #[cfg(feature = "otlp")]
    remote: Option<RemoteShippingGuard>,
}

impl Logger {
    /// Returns a new [`LoggerBuilder`] to configure the global tracing
    /// subscriber.
    ///
    /// The `name` is the log file stem (e.g. `my-app.log`).
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder {
            config: LoggerConfig::default(),
            name: NoName,
            file_state: std::marker::PhantomData,
        }
    }

    /// Configures the logger from a loaded profile.
    ///
    /// Derives the level, the file stem (explicit `log.file` or the
    /// kebab-cased app name), the rotation threshold/keep count, and the
    /// remote shipping pipeline when the profile enables it.
    ///
    /// # Errors
    /// Same contract as [`LoggerBuilder::init`]. A remote setup failure is
    /// not an error.
    pub fn from_profile(app_name: &str, cfg: &LogConfig) -> Result<Self, LoggerError> {
        let stem = cfg
            .file
            .as_deref()
            .map(|file| file.trim_end_matches(".log").to_owned())
            .filter(|stem| !stem.is_empty())
            .unwrap_or_else(|| file_stem_from(app_name));

        #[allow(unused_mut)]
        let mut builder = Self::builder()
            .name(stem)
            .level(level_filter(cfg.level))
            .path(PathBuf::from(&cfg.folder))
            .max_bytes(cfg.rotation.threshold_bytes())
            .keep(cfg.rotation.keep);

        #[cfg(feature = "otlp")]
        if cfg.remote.enabled {
            builder = builder.remote(cfg.remote.clone());
        }

        let logger = builder.init()?;

        #[cfg(not(feature = "otlp"))]
        if cfg.remote.enabled {
            tracing::warn!(
                "Remote log shipping requested but the binary was built without the otlp feature"
            );
        }

        Ok(logger)
    }

    /// Swaps the level filter at runtime.
    ///
    /// # Errors
    /// Returns [`LoggerError::Internal`] when the subscriber is gone.
    pub fn reload_level(&self, level: LevelFilter) -> Result<(), LoggerError> {
        let filter = EnvFilter::builder().with_default_directive(level.into()).from_env_lossy();
        self.reload.reload(filter).map_err(|e| LoggerError::Internal {
            message: e.to_string().into(),
            context: Some("Swapping level filter".into()),
        })?;
        tracing::info!(%level, "Log level reloaded");
        Ok(())
    }

    /// Re-derives the level from a (possibly re-read) profile section.
    ///
    /// # Errors
    /// Same contract as [`Logger::reload_level`].
    pub fn reload_from(&self, cfg: &LogConfig) -> Result<(), LoggerError> {
        self.reload_level(level_filter(cfg.level))
    }

    /// Manually triggers a flush of all pending logs in the non-blocking
    /// worker.
    ///
    /// Flushing happens automatically when this handle is dropped; this is a
    /// best-effort synchronization point before shutdown.
    pub fn flush(&self) {
        tracing::debug!("Logger flushed");
    }

    /// Returns a reference to the underlying worker guard, if present.
    #[must_use]
    pub const fn guard(&self) -> Option<&WorkerGuard> {
        self.guard.as_ref()
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger").field("file_sink", &self.guard.is_some()).finish_non_exhaustive()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if self.guard.is_some() {
            tracing::info!("Logging system shutting down, flushing buffers...");
        }
    }
}

/// Maps a profile level onto a tracing filter. A debug level is clamped to
/// info in builds without debug assertions.
#[must_use]
pub fn level_filter(level: LogLevel) -> LevelFilter {
    let filter = match level {
        LogLevel::Debug => LevelFilter::DEBUG,
        LogLevel::Info => LevelFilter::INFO,
        LogLevel::Warning => LevelFilter::WARN,
        LogLevel::Error => LevelFilter::ERROR,
    };
    if filter == LevelFilter::DEBUG && !cfg!(debug_assertions) {
        return LevelFilter::INFO;
    }
    filter
}

fn file_stem_from(name: &str) -> String {
    let mut stem = String::with_capacity(name.len() + 4);
    for (index, ch) in name.chars().enumerate() {
        if ch.is_uppercase() {
            if index > 0 {
                stem.push('-');
            }
            stem.extend(ch.to_lowercase());
        } else {
            stem.push(ch);
        }
    }
    stem
}

fn validate_config(config: &LoggerConfig, name: &str) -> Result<(), LoggerError> {
    if name.trim().is_empty() {
        return Err(LoggerError::InvalidConfiguration {
            message: "Logger name cannot be empty".into(),
            context: None,
        });
    }

    if config.keep == 0 {
        return Err(LoggerError::InvalidConfiguration {
            message: "keep must be greater than zero".into(),
            context: None,
        });
    }

    if config.max_bytes == 0 {
        return Err(LoggerError::InvalidConfiguration {
            message: "max_bytes must be greater than zero".into(),
            context: None,
        });
    }

    Ok(())
}

fn build_env_filter(config: &LoggerConfig) -> Result<EnvFilter, LoggerError> {
    let builder = EnvFilter::builder().with_default_directive(config.level.into());
    config.env_filter.as_ref().map_or_else(
        || Ok(builder.from_env_lossy()),
        |filter| {
            builder.parse(filter).map_err(|e| LoggerError::InvalidConfiguration {
                message: format!("Invalid env filter '{filter}': {e}").into(),
                context: None,
            })
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use corral_domain::profile::{LogRotation, SizeUnit};

    #[test]
    fn builder_initial_state() {
        let builder = Logger::builder().name("test-app").env_filter("corral=debug");
        assert!(builder.config.console);
        assert_eq!(builder.config.level, LevelFilter::INFO);
        assert_eq!(builder.config.env_filter.as_deref(), Some("corral=debug"));
        assert!(builder.config.path.is_none());
    }

    #[test]
    fn builder_configuration() {
        let builder = Logger::builder()
            .name("test-app")
            .console(true)
            .env_filter("corral=info")
            .path("logs")
            .max_bytes(2048)
            .keep(5)
            .level(LevelFilter::DEBUG);

        assert_eq!(builder.config.level, LevelFilter::DEBUG);
        assert_eq!(builder.config.max_bytes, 2048);
        assert_eq!(builder.config.keep, 5);
        assert_eq!(builder.config.path.as_deref(), Some(std::path::Path::new("logs")));
    }

    #[test]
    fn file_stem_kebab_cases_app_names() {
        assert_eq!(file_stem_from("CorralApp"), "corral-app");
        assert_eq!(file_stem_from("reports"), "reports");
    }

    #[test]
    fn rotation_threshold_feeds_max_bytes() {
        let rotation = LogRotation { size: 4, unit: SizeUnit::Kb, keep: 2 };
        assert_eq!(rotation.threshold_bytes(), 4096);
    }

    #[test]
    fn debug_level_requires_debug_assertions() {
        let filter = level_filter(LogLevel::Debug);
        if cfg!(debug_assertions) {
            assert_eq!(filter, LevelFilter::DEBUG);
        } else {
            assert_eq!(filter, LevelFilter::INFO);
        }
        assert_eq!(level_filter(LogLevel::Warning), LevelFilter::WARN);
    }
}
