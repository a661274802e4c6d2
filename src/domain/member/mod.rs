//! Member domain
//!
//! Members are club/team records maintained by the surrounding application.
//! This service only reads their roles and writes their actor link.

mod entity;
mod roles;

pub use entity::{Member, MemberId};
pub use roles::{Role, RoleSet, TeamId};
