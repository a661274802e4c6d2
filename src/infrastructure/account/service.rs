//! Account lifecycle hooks from the identity provider

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::actor::{Actor, ActorId};
use crate::domain::storage::Storage;
use crate::domain::DomainError;

/// Keeps actor records in step with identity-provider accounts
#[derive(Debug, Clone)]
pub struct AccountService {
    actors: Arc<dyn Storage<Actor>>,
}

impl AccountService {
    pub fn new(actors: Arc<dyn Storage<Actor>>) -> Self {
        Self { actors }
    }

    /// Create the actor record for a new account
    ///
    /// Repeated deliveries of the same event keep the existing record.
    pub async fn on_account_created(&self, actor_id: &str) -> Result<Actor, DomainError> {
        let actor_id = ActorId::new(actor_id).map_err(|e| DomainError::invalid_id(e.to_string()))?;

        if let Some(existing) = self.actors.get(&actor_id).await? {
            debug!(actor_id = %actor_id, "Actor already exists");
            return Ok(existing);
        }

        info!(actor_id = %actor_id, "Creating actor");

        match self.actors.create(Actor::new(actor_id.clone())).await {
            Ok(actor) => Ok(actor),
            // Lost a race against a duplicate delivery
            Err(DomainError::Conflict { .. }) => self
                .actors
                .get(&actor_id)
                .await?
                .ok_or_else(|| DomainError::internal(format!("Actor '{}' vanished", actor_id))),
            Err(e) => Err(e),
        }
    }

    /// Delete the actor record for a removed account
    ///
    /// Returns whether a record was deleted; a missing actor is not an error.
    /// A linked member keeps its `linked_actor_id`.
    pub async fn on_account_deleted(&self, actor_id: &str) -> Result<bool, DomainError> {
        let actor_id = ActorId::new(actor_id).map_err(|e| DomainError::invalid_id(e.to_string()))?;

        let deleted = self.actors.delete(&actor_id).await?;
        if deleted {
            info!(actor_id = %actor_id, "Deleted actor");
        } else {
            debug!(actor_id = %actor_id, "Actor to delete not found");
        }

        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::member::MemberId;
    use crate::domain::storage::mock::MockStorage;

    fn service(storage: MockStorage<Actor>) -> (AccountService, Arc<MockStorage<Actor>>) {
        let storage = Arc::new(storage);
        (AccountService::new(storage.clone()), storage)
    }

    #[tokio::test]
    async fn test_created_makes_unlinked_actor() {
        let (service, storage) = service(MockStorage::new());

        let actor = service.on_account_created("uid-1").await.unwrap();

        assert_eq!(actor.id().as_str(), "uid-1");
        assert!(!actor.is_linked());
        assert_eq!(storage.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_created_is_idempotent() {
        let mut linked = Actor::new(ActorId::new("uid-1").unwrap());
        linked.link_member(MemberId::new("M1").unwrap()).unwrap();
        let (service, storage) = service(MockStorage::new().with_entity(linked));

        let actor = service.on_account_created("uid-1").await.unwrap();

        assert!(actor.is_linked());
        assert_eq!(storage.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_created_rejects_invalid_id() {
        let (service, _) = service(MockStorage::new());

        let result = service.on_account_created("a/b").await;
        assert!(matches!(result, Err(DomainError::InvalidId { .. })));
    }

    #[tokio::test]
    async fn test_deleted_removes_actor() {
        let (service, storage) = service(
            MockStorage::new().with_entity(Actor::new(ActorId::new("uid-1").unwrap())),
        );

        assert!(service.on_account_deleted("uid-1").await.unwrap());
        assert_eq!(storage.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_deleted_missing_actor_is_noop() {
        let (service, _) = service(MockStorage::new());

        assert!(!service.on_account_deleted("uid-1").await.unwrap());
    }

    #[tokio::test]
    async fn test_storage_error_propagates() {
        let (service, _) = service(MockStorage::new().with_error("down"));

        let result = service.on_account_created("uid-1").await;
        assert!(matches!(result, Err(DomainError::Storage { .. })));
    }
}
