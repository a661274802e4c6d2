//! Authentication infrastructure module
//!
//! JWT validation for actor sessions.

mod jwt;

pub use jwt::{JwtClaims, JwtConfig, JwtGenerator, JwtService};
