//! Actor entity - the authenticated caller's account record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::member::MemberId;
use crate::domain::storage::{
    validate_document_id, IdValidationError, StorageEntity, StorageKey,
};
use crate::domain::DomainError;

/// Actor identifier, as issued by the identity provider
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ActorId(String);

impl ActorId {
    /// Create a new ActorId after validation
    pub fn new(id: impl Into<String>) -> Result<Self, IdValidationError> {
        let id = id.into();
        validate_document_id("Actor", &id)?;
        Ok(Self(id))
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ActorId {
    type Error = IdValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ActorId> for String {
    fn from(id: ActorId) -> Self {
        id.0
    }
}

impl std::fmt::Display for ActorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl StorageKey for ActorId {
    fn as_str(&self) -> &str {
        &self.0
    }
}

/// Actor document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    id: ActorId,
    /// Member this actor has been bound to, if any
    #[serde(default)]
    linked_member_id: Option<MemberId>,
    #[serde(default = "Utc::now")]
    created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    updated_at: DateTime<Utc>,
}

impl Actor {
    /// Create a fresh, unlinked actor
    pub fn new(id: ActorId) -> Self {
        let now = Utc::now();

        Self {
            id,
            linked_member_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> &ActorId {
        &self.id
    }

    pub fn linked_member_id(&self) -> Option<&MemberId> {
        self.linked_member_id.as_ref()
    }

    pub fn is_linked(&self) -> bool {
        self.linked_member_id.is_some()
    }

    /// Bind this actor to a member; fails if already bound
    pub fn link_member(&mut self, member_id: MemberId) -> Result<(), DomainError> {
        if let Some(existing) = &self.linked_member_id {
            return Err(DomainError::conflict(format!(
                "Actor '{}' is already linked to member '{}'",
                self.id, existing
            )));
        }

        self.linked_member_id = Some(member_id);
        self.updated_at = Utc::now();
        Ok(())
    }
}

impl StorageEntity for Actor {
    type Key = ActorId;

    const COLLECTION: &'static str = "actors";

    fn key(&self) -> &Self::Key {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actor_id_valid() {
        let id = ActorId::new("uid-42").unwrap();
        assert_eq!(id.as_str(), "uid-42");
    }

    #[test]
    fn test_actor_id_invalid() {
        assert!(ActorId::new("").is_err());
        assert!(ActorId::new("users/uid").is_err());
    }

    #[test]
    fn test_new_actor_is_unlinked() {
        let actor = Actor::new(ActorId::new("uid-42").unwrap());

        assert!(!actor.is_linked());
        assert!(actor.linked_member_id().is_none());
    }

    #[test]
    fn test_link_member_once() {
        let mut actor = Actor::new(ActorId::new("uid-42").unwrap());

        actor.link_member(MemberId::new("M1").unwrap()).unwrap();
        assert_eq!(actor.linked_member_id().unwrap().as_str(), "M1");

        let second = actor.link_member(MemberId::new("M2").unwrap());
        assert!(matches!(second, Err(DomainError::Conflict { .. })));
        assert_eq!(actor.linked_member_id().unwrap().as_str(), "M1");
    }

    #[test]
    fn test_actor_document_shape() {
        let actor = Actor::new(ActorId::new("uid-42").unwrap());
        let json = serde_json::to_value(&actor).unwrap();

        assert_eq!(json["id"], "uid-42");
        assert!(json["linked_member_id"].is_null());
    }

    #[test]
    fn test_actor_deserializes_without_timestamps() {
        let actor: Actor =
            serde_json::from_str(r#"{"id":"uid-42","linked_member_id":"M1"}"#).unwrap();

        assert_eq!(actor.linked_member_id().unwrap().as_str(), "M1");
    }
}
