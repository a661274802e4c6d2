//! API middleware components

pub mod actor_auth;
pub mod hook_auth;
pub mod logging;
pub mod metrics;

pub use actor_auth::RequireActor;
pub use hook_auth::{RequireHookSecret, HOOK_SECRET_HEADER};
pub use logging::logging_middleware;
pub use metrics::metrics_middleware;
