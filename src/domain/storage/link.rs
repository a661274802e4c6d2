//! Atomic cross-document link write

use std::fmt::Debug;

use async_trait::async_trait;

use crate::domain::actor::ActorId;
use crate::domain::member::MemberId;
use crate::domain::DomainError;

/// Result of an attempted link write
///
/// Every variant other than [`LinkOutcome::Linked`] means nothing was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
    /// Both documents were updated in one commit
    Linked,
    /// The member document does not exist
    MemberNotFound,
    /// The actor document does not exist
    ActorNotFound,
    /// The member already carries a linked actor
    MemberAlreadyLinked,
    /// The actor already carries a linked member
    ActorAlreadyLinked,
}

impl LinkOutcome {
    pub fn is_linked(&self) -> bool {
        matches!(self, Self::Linked)
    }
}

/// Store primitive that binds an actor and a member in one atomic write
///
/// Implementations must check both documents' current link state and write
/// both fields inside the same transaction (or under the same lock), so that
/// concurrent callers racing on one member observe at most one `Linked`.
#[async_trait]
pub trait LinkStore: Send + Sync + Debug {
    async fn link(&self, actor_id: &ActorId, member_id: &MemberId)
    -> Result<LinkOutcome, DomainError>;
}
