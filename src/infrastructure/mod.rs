//! Infrastructure layer - External service implementations

pub mod account;
pub mod auth;
pub mod credentials;
pub mod invitation;
pub mod logging;
pub mod observability;
pub mod storage;
