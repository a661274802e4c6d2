//! Invitation domain
//!
//! The token codec, the authorization rules, and the error taxonomy shared by
//! the issue and redeem operations.

pub mod authorization;
pub mod codec;
mod error;

pub use authorization::{authorize, decide, Decision};
pub use codec::{decrypt, encrypt, CodecError, InvitationKey};
pub use error::InvitationError;
