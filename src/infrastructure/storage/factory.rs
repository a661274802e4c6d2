//! Storage factory for runtime backend selection

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::actor::Actor;
use crate::domain::member::Member;
use crate::domain::storage::{LinkStore, Storage};
use crate::domain::DomainError;

use super::in_memory::InMemoryDocumentStore;
use super::postgres::{PostgresConfig, PostgresDocumentStore};

/// Supported storage types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageType {
    /// In-memory storage (for testing/development)
    InMemory,
    /// PostgreSQL storage
    Postgres,
}

impl StorageType {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "memory" | "inmemory" | "in-memory" | "in_memory" => Some(Self::InMemory),
            "postgres" | "postgresql" | "pg" => Some(Self::Postgres),
            _ => None,
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone)]
pub enum StorageConfig {
    InMemory,
    Postgres(PostgresConfig),
}

impl StorageConfig {
    pub fn in_memory() -> Self {
        Self::InMemory
    }

    pub fn postgres(config: PostgresConfig) -> Self {
        Self::Postgres(config)
    }

    pub fn storage_type(&self) -> StorageType {
        match self {
            Self::InMemory => StorageType::InMemory,
            Self::Postgres(_) => StorageType::Postgres,
        }
    }
}

/// Handles onto one document store, split by concern
///
/// All three point at the same backend, so a link written through `links`
/// is visible through `actors` and `members`.
#[derive(Debug, Clone)]
pub struct StorageHandles {
    pub actors: Arc<dyn Storage<Actor>>,
    pub members: Arc<dyn Storage<Member>>,
    pub links: Arc<dyn LinkStore>,
}

impl StorageHandles {
    pub fn in_memory(store: InMemoryDocumentStore) -> Self {
        let store = Arc::new(store);
        Self {
            actors: store.clone(),
            members: store.clone(),
            links: store,
        }
    }

    pub fn postgres(store: PostgresDocumentStore) -> Self {
        let store = Arc::new(store);
        Self {
            actors: store.clone(),
            members: store.clone(),
            links: store,
        }
    }

    /// Creates seed members that are not stored yet
    ///
    /// Stored members are left untouched, so a committed link survives a
    /// restart. Returns the number of members created.
    pub async fn seed_members(&self, members: Vec<Member>) -> Result<usize, DomainError> {
        let mut created = 0;

        for member in members {
            let member_id = member.id().clone();

            match self.members.create(member).await {
                Ok(_) => created += 1,
                Err(DomainError::Conflict { .. }) => {
                    debug!(member_id = %member_id, "Seed member already stored, skipping");
                }
                Err(e) => return Err(e),
            }
        }

        Ok(created)
    }
}

/// Factory for creating storage instances
#[derive(Debug)]
pub struct StorageFactory;

impl StorageFactory {
    /// Creates storage handles based on the configuration
    pub async fn create(config: &StorageConfig) -> Result<StorageHandles, DomainError> {
        match config {
            StorageConfig::InMemory => {
                info!("Using in-memory document store");
                Ok(StorageHandles::in_memory(InMemoryDocumentStore::new()))
            }
            StorageConfig::Postgres(pg_config) => {
                info!(
                    max_connections = pg_config.max_connections,
                    "Using PostgreSQL document store"
                );
                let store = PostgresDocumentStore::connect(pg_config).await?;
                Ok(StorageHandles::postgres(store))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::actor::ActorId;
    use crate::domain::member::{MemberId, Role, RoleSet};
    use crate::domain::storage::LinkOutcome;

    #[test]
    fn test_storage_type_from_str() {
        assert_eq!(StorageType::from_str("memory"), Some(StorageType::InMemory));
        assert_eq!(StorageType::from_str("In-Memory"), Some(StorageType::InMemory));
        assert_eq!(StorageType::from_str("postgres"), Some(StorageType::Postgres));
        assert_eq!(StorageType::from_str("pg"), Some(StorageType::Postgres));
        assert_eq!(StorageType::from_str("firestore"), None);
    }

    #[test]
    fn test_storage_config_types() {
        assert_eq!(StorageConfig::in_memory().storage_type(), StorageType::InMemory);
        assert_eq!(
            StorageConfig::postgres(PostgresConfig::new("postgres://localhost/test")).storage_type(),
            StorageType::Postgres
        );
    }

    #[tokio::test]
    async fn test_in_memory_handles_share_documents() {
        let handles = StorageFactory::create(&StorageConfig::in_memory()).await.unwrap();
        let seeded = handles
            .seed_members(vec![Member::new(
                MemberId::new("M1").unwrap(),
                RoleSet::new().with(Role::Admin),
            )])
            .await
            .unwrap();
        assert_eq!(seeded, 1);

        let actor_id = ActorId::new("a-1").unwrap();
        handles.actors.create(Actor::new(actor_id.clone())).await.unwrap();

        let outcome = handles
            .links
            .link(&actor_id, &MemberId::new("M1").unwrap())
            .await
            .unwrap();
        assert!(outcome.is_linked());

        let actor = handles.actors.get(&actor_id).await.unwrap().unwrap();
        assert!(actor.is_linked());
    }

    #[tokio::test]
    async fn test_reseeding_keeps_existing_links() {
        let handles = StorageFactory::create(&StorageConfig::in_memory()).await.unwrap();
        let m1 = || Member::new(MemberId::new("M1").unwrap(), RoleSet::new().with(Role::Admin));

        assert_eq!(handles.seed_members(vec![m1()]).await.unwrap(), 1);

        let first = ActorId::new("a-1").unwrap();
        handles.actors.create(Actor::new(first.clone())).await.unwrap();
        handles.links.link(&first, &MemberId::new("M1").unwrap()).await.unwrap();

        let reseeded = handles
            .seed_members(vec![
                m1(),
                Member::new(MemberId::new("M2").unwrap(), RoleSet::new()),
            ])
            .await
            .unwrap();
        assert_eq!(reseeded, 1);

        let member = handles.members.get(&MemberId::new("M1").unwrap()).await.unwrap().unwrap();
        assert_eq!(member.linked_actor_id(), Some(&first));

        let second = ActorId::new("c-1").unwrap();
        handles.actors.create(Actor::new(second.clone())).await.unwrap();
        let outcome = handles
            .links
            .link(&second, &MemberId::new("M1").unwrap())
            .await
            .unwrap();
        assert_eq!(outcome, LinkOutcome::MemberAlreadyLinked);
    }
}
