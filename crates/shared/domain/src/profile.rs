use serde::Deserialize;
use std::collections::BTreeMap;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

/// Top-level configuration profile for one running instance.
///
/// Loaded once per process from an environment-selected file, immutable after
/// load except for explicit reload.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProfileInner {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub log: LogConfig,
}

/// Thin Arc-wrapped profile for inexpensive cloning into subsystems.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct Profile {
    #[serde(flatten, default)]
    inner: Arc<ProfileInner>,
}

impl Deref for Profile {
    type Target = ProfileInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for Profile {
    fn deref_mut(&mut self) -> &mut ProfileInner {
        Arc::make_mut(&mut self.inner)
    }
}

/// Application identity and HTTP options.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub name: String,
    pub version: String,
    pub port: u16,
    pub debug: bool,
    pub openapi: OpenApiConfig,
}

/// OpenAPI exposure and CORS options.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OpenApiConfig {
    pub enabled: bool,
    pub path: String,
    pub docs_path: String,
    /// Description -> URL pairs merged into the document's server list.
    pub servers: BTreeMap<String, String>,
    /// Origins allowed by the CORS layer. Empty means any origin.
    pub origins: Vec<String>,
}

/// Database engine selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    #[serde(alias = "postgresql")]
    Postgres,
    Mysql,
}

impl Engine {
    /// URL scheme used when assembling a connection string.
    #[must_use]
    pub const fn scheme(self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::Mysql => "mysql",
        }
    }
}

/// Database connection parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    #[serde(alias = "upgrade-at-start")]
    pub upgrade_at_start: bool,
    pub engine: Engine,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub database: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub max_connections: u32,
}

impl DatabaseConfig {
    /// Whether a connection target has been configured at all.
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.host.is_some()
    }
}

/// Security provider selection. The providers themselves are external
/// collaborators; the profile only records which one the deployment uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecurityProvider {
    Jwt,
    Cognito,
    Auth0,
    Firebase,
    Keycloak,
    Ldap,
}

/// Security options.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    pub provider: SecurityProvider,
    #[serde(alias = "pool-id")]
    pub pool_id: Option<String>,
    pub endpoint: Option<String>,
}

/// Log verbosity selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warning => "warn",
            Self::Error => "error",
        }
    }
}

/// Rotation unit for the file sink threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeUnit {
    Kb,
    Mb,
}

/// Rotating-file sink parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogRotation {
    pub size: u64,
    pub unit: SizeUnit,
    pub keep: usize,
}

impl LogRotation {
    /// Size threshold converted to bytes.
    #[must_use]
    pub const fn threshold_bytes(&self) -> u64 {
        match self.unit {
            SizeUnit::Kb => self.size * 1024,
            SizeUnit::Mb => self.size * 1024 * 1024,
        }
    }
}

/// Remote log-shipping options.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RemoteLogConfig {
    pub enabled: bool,
    pub endpoint: Option<String>,
    pub group: Option<String>,
    pub stream: Option<String>,
    #[serde(alias = "retention")]
    pub retention_days: u32,
}

/// Logging options.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub folder: String,
    pub file: Option<String>,
    pub level: LogLevel,
    pub rotation: LogRotation,
    pub remote: RemoteLogConfig,
}

// --- Default ---

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: "CorralApp".to_owned(),
            version: "0.1.0".to_owned(),
            port: 8000,
            debug: false,
            openapi: OpenApiConfig::default(),
        }
    }
}

impl Default for OpenApiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "/openapi.json".to_owned(),
            docs_path: "/api".to_owned(),
            servers: BTreeMap::new(),
            origins: Vec::new(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            upgrade_at_start: true,
            engine: Engine::Postgres,
            host: None,
            port: None,
            database: None,
            user: None,
            password: None,
            max_connections: 5,
        }
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self { provider: SecurityProvider::Jwt, pool_id: None, endpoint: None }
    }
}

impl Default for LogRotation {
    fn default() -> Self {
        Self { size: 1, unit: SizeUnit::Mb, keep: 10 }
    }
}

impl Default for RemoteLogConfig {
    fn default() -> Self {
        Self { enabled: false, endpoint: None, group: None, stream: None, retention_days: 7 }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            folder: "logs".to_owned(),
            file: None,
            level: LogLevel::Info,
            rotation: LogRotation::default(),
            remote: RemoteLogConfig::default(),
        }
    }
}
