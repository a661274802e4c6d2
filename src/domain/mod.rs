//! Domain layer - Core business logic and entities

pub mod actor;
pub mod credentials;
pub mod error;
pub mod invitation;
pub mod member;
pub mod storage;

pub use actor::{Actor, ActorId};
pub use credentials::SecretProvider;
pub use error::DomainError;
pub use invitation::{InvitationError, InvitationKey};
pub use member::{Member, MemberId, Role, RoleSet, TeamId};
pub use storage::{LinkOutcome, LinkStore, Storage, StorageEntity, StorageKey};
