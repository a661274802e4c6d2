//! In-memory document store

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::actor::{Actor, ActorId};
use crate::domain::member::{Member, MemberId};
use crate::domain::storage::{LinkOutcome, LinkStore, Storage, StorageEntity, StorageKey};
use crate::domain::DomainError;

/// All collections, guarded together so a link write is one critical section
#[derive(Debug, Default)]
pub struct Collections {
    actors: HashMap<String, Actor>,
    members: HashMap<String, Member>,
}

/// Entities that live in one of the in-memory collections
pub trait InMemoryCollection: StorageEntity {
    fn collection(collections: &Collections) -> &HashMap<String, Self>;

    fn collection_mut(collections: &mut Collections) -> &mut HashMap<String, Self>;
}

impl InMemoryCollection for Actor {
    fn collection(collections: &Collections) -> &HashMap<String, Self> {
        &collections.actors
    }

    fn collection_mut(collections: &mut Collections) -> &mut HashMap<String, Self> {
        &mut collections.actors
    }
}

impl InMemoryCollection for Member {
    fn collection(collections: &Collections) -> &HashMap<String, Self> {
        &collections.members
    }

    fn collection_mut(collections: &mut Collections) -> &mut HashMap<String, Self> {
        &mut collections.members
    }
}

/// Thread-safe in-memory document store
///
/// Useful for testing and development. Data is lost when the process terminates.
/// Clones share the same underlying collections.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDocumentStore {
    collections: Arc<RwLock<Collections>>,
}

impl InMemoryDocumentStore {
    /// Creates a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with members
    #[cfg(test)]
    pub fn with_members(members: Vec<Member>) -> Self {
        let mut collections = Collections::default();

        for member in members {
            collections
                .members
                .insert(member.key().as_str().to_string(), member);
        }

        Self {
            collections: Arc::new(RwLock::new(collections)),
        }
    }
}

#[async_trait]
impl<E> Storage<E> for InMemoryDocumentStore
where
    E: InMemoryCollection + 'static,
{
    async fn get(&self, key: &E::Key) -> Result<Option<E>, DomainError> {
        let collections = self.collections.read().await;
        Ok(E::collection(&collections).get(key.as_str()).cloned())
    }

    async fn create(&self, entity: E) -> Result<E, DomainError> {
        let key = entity.key().as_str().to_string();
        let mut collections = self.collections.write().await;
        let entities = E::collection_mut(&mut collections);

        if entities.contains_key(&key) {
            return Err(DomainError::conflict(format!(
                "Document '{}/{}' already exists",
                E::COLLECTION,
                key
            )));
        }

        entities.insert(key, entity.clone());
        Ok(entity)
    }

    async fn delete(&self, key: &E::Key) -> Result<bool, DomainError> {
        let mut collections = self.collections.write().await;
        Ok(E::collection_mut(&mut collections)
            .remove(key.as_str())
            .is_some())
    }

    async fn count(&self) -> Result<usize, DomainError> {
        let collections = self.collections.read().await;
        Ok(E::collection(&collections).len())
    }
}

#[async_trait]
impl LinkStore for InMemoryDocumentStore {
    async fn link(
        &self,
        actor_id: &ActorId,
        member_id: &MemberId,
    ) -> Result<LinkOutcome, DomainError> {
        let mut guard = self.collections.write().await;
        let collections = &mut *guard;

        let Some(member) = collections.members.get_mut(member_id.as_str()) else {
            return Ok(LinkOutcome::MemberNotFound);
        };
        let Some(actor) = collections.actors.get_mut(actor_id.as_str()) else {
            return Ok(LinkOutcome::ActorNotFound);
        };

        if member.is_assigned() {
            return Ok(LinkOutcome::MemberAlreadyLinked);
        }

        if actor.is_linked() {
            return Ok(LinkOutcome::ActorAlreadyLinked);
        }

        // Both checks passed under the same guard, so neither write can fail.
        member.link_actor(actor_id.clone())?;
        actor.link_member(member_id.clone())?;

        Ok(LinkOutcome::Linked)
    }
}
