//! Facade crate for the Corral platform.
//! Re-exports domain/kernel primitives and the pieces a hosting project
//! needs to mount its packages.
//! Keep this crate thin: it should compose other crates, not implement
//! behavior.
//!
//! ## Usage
//! - Add `corral` with the desired feature flags (`server`).
//! - Mount packages through `prelude::PackageRegistry` and hand them to the
//!   application factory.

pub use corral_database as database;
pub use corral_domain as domain;
pub use corral_kernel as kernel;
pub use corral_logger as logger;

#[cfg(feature = "server")]
pub mod server {
    pub mod router {
        pub use corral_kernel::server::router::system_router;
    }
}

/// Everything a hosting project typically imports.
pub mod prelude {
    pub use corral_database::{Database, Migration};
    pub use corral_kernel::prelude::*;
    pub use corral_logger::Logger;
}
