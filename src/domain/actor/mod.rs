//! Actor domain
//!
//! An actor is the account record of an authenticated caller. It is created
//! and removed by the identity-provider account hooks.

mod entity;

pub use entity::{Actor, ActorId};
