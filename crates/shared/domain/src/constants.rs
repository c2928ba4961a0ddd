//! Shared constants used across the platform.

/// OpenAPI tag for built-in system endpoints.
pub const SYSTEM_TAG: &str = "system";

/// Directory the OpenAPI snapshot is written to at startup.
pub const SPECS_DIR: &str = "specs";

/// Default module folder a hosting project mounts its packages under.
pub const DEFAULT_MODULE_FOLDER: &str = "src";
