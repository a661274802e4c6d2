//! Member entity and identifier

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::roles::RoleSet;
use crate::domain::actor::ActorId;
use crate::domain::storage::{
    validate_document_id, IdValidationError, StorageEntity, StorageKey,
};
use crate::domain::DomainError;

/// Member identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MemberId(String);

impl MemberId {
    /// Create a new MemberId after validation
    pub fn new(id: impl Into<String>) -> Result<Self, IdValidationError> {
        let id = id.into();
        validate_document_id("Member", &id)?;
        Ok(Self(id))
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for MemberId {
    type Error = IdValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<MemberId> for String {
    fn from(id: MemberId) -> Self {
        id.0
    }
}

impl std::fmt::Display for MemberId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl StorageKey for MemberId {
    fn as_str(&self) -> &str {
        &self.0
    }
}

/// Member document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    id: MemberId,
    #[serde(default)]
    roles: RoleSet,
    /// Actor bound to this member; set once, never overwritten
    #[serde(default)]
    linked_actor_id: Option<ActorId>,
    #[serde(default = "Utc::now")]
    created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    updated_at: DateTime<Utc>,
}

impl Member {
    /// Create an unassigned member
    pub fn new(id: MemberId, roles: RoleSet) -> Self {
        let now = Utc::now();

        Self {
            id,
            roles,
            linked_actor_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    // Getters

    pub fn id(&self) -> &MemberId {
        &self.id
    }

    pub fn roles(&self) -> &RoleSet {
        &self.roles
    }

    pub fn linked_actor_id(&self) -> Option<&ActorId> {
        self.linked_actor_id.as_ref()
    }

    pub fn is_assigned(&self) -> bool {
        self.linked_actor_id.is_some()
    }

    // Mutators

    /// Assign this member to an actor; fails if already assigned
    pub fn link_actor(&mut self, actor_id: ActorId) -> Result<(), DomainError> {
        if let Some(existing) = &self.linked_actor_id {
            return Err(DomainError::conflict(format!(
                "Member '{}' is already assigned to actor '{}'",
                self.id, existing
            )));
        }

        self.linked_actor_id = Some(actor_id);
        self.touch();
        Ok(())
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl StorageEntity for Member {
    type Key = MemberId;

    const COLLECTION: &'static str = "members";

    fn key(&self) -> &Self::Key {
        &self.id
    }
}
