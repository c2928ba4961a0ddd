//! Server plumbing shared by the application factory.

mod catch;
mod health;
pub mod router;
mod routes;
mod state;

pub use catch::{ErrorBody, GENERIC_ERROR_MESSAGE, handle_panics};
pub use routes::{ApiRouter, RoutesLoader};
pub use state::{ApiState, ApiStateBuilder, ApiStateError, ApiStateErrorExt};
