//! Invitation service: issue and redeem member invitations

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::domain::actor::{Actor, ActorId};
use crate::domain::invitation::{decide, decrypt, encrypt, InvitationError};
use crate::domain::member::{Member, MemberId};
use crate::domain::storage::{LinkOutcome, LinkStore, Storage};
use crate::domain::{DomainError, SecretProvider};
use crate::infrastructure::observability::{
    record_invitation_failure, record_invitation_issued, record_invitation_redeemed,
};

const NO_ACCOUNT: &str = "caller has no account record";
const NOT_LINKED: &str = "caller is not linked to a member";
const LINKED_MEMBER_MISSING: &str = "caller's linked member record not found";
const ALREADY_LINKED: &str = "caller is already linked to a member";
const MEMBER_TAKEN: &str = "member is already linked to an account";

/// Orchestrates token issuance and redemption against the document store
#[derive(Debug, Clone)]
pub struct InvitationService {
    actors: Arc<dyn Storage<Actor>>,
    members: Arc<dyn Storage<Member>>,
    links: Arc<dyn LinkStore>,
    secrets: Arc<dyn SecretProvider>,
}

impl InvitationService {
    pub fn new(
        actors: Arc<dyn Storage<Actor>>,
        members: Arc<dyn Storage<Member>>,
        links: Arc<dyn LinkStore>,
        secrets: Arc<dyn SecretProvider>,
    ) -> Self {
        Self {
            actors,
            members,
            links,
            secrets,
        }
    }

    /// Mint an invitation token naming `target_member_id`
    ///
    /// The caller must be linked to a member whose roles authorize inviting
    /// the target. Nothing is written to the store.
    pub async fn issue_token(
        &self,
        caller: &ActorId,
        target_member_id: &str,
    ) -> Result<String, InvitationError> {
        let result = self.issue(caller, target_member_id).await;

        match &result {
            Ok(_) => record_invitation_issued(),
            Err(e) => record_invitation_failure("issue", e.code()),
        }

        result
    }

    /// Consume an invitation token, linking the caller to the member it names
    pub async fn redeem_token(
        &self,
        caller: &ActorId,
        token: &str,
    ) -> Result<MemberId, InvitationError> {
        let result = self.redeem(caller, token).await;

        match &result {
            Ok(_) => record_invitation_redeemed(),
            Err(e) => record_invitation_failure("redeem", e.code()),
        }

        result
    }

    async fn issue(
        &self,
        caller: &ActorId,
        target_member_id: &str,
    ) -> Result<String, InvitationError> {
        let target_id = MemberId::new(target_member_id.trim())
            .map_err(|e| InvitationError::bad_request(format!("invalid target_member_id: {}", e)))?;

        debug!(caller = %caller, member_id = %target_id, "Issuing invitation");

        let (actor, target) = tokio::try_join!(self.actors.get(caller), self.members.get(&target_id))
            .map_err(|e| store_fault("issue", e))?;

        let actor = actor.ok_or_else(|| InvitationError::precondition(NO_ACCOUNT))?;
        let inviter_member_id = actor
            .linked_member_id()
            .ok_or_else(|| InvitationError::precondition(NOT_LINKED))?;

        let inviter = self
            .members
            .get(inviter_member_id)
            .await
            .map_err(|e| store_fault("issue", e))?
            .ok_or_else(|| InvitationError::precondition(LINKED_MEMBER_MISSING))?;

        let target = target.ok_or_else(|| InvitationError::bad_request("unknown member"))?;

        let decision = decide(inviter.roles(), target.roles());
        if !decision.is_allowed() {
            warn!(
                caller = %caller,
                inviter_member_id = %inviter.id(),
                member_id = %target_id,
                "Invitation refused"
            );
            return Err(InvitationError::forbidden(
                "not permitted to invite this member",
            ));
        }

        let key = self
            .secrets
            .invitation_key()
            .await
            .map_err(|e| store_fault("issue", e))?;

        let token = encrypt(target_id.as_str(), &key).map_err(|e| {
            error!(error = %e, "Invitation token encryption failed");
            InvitationError::Internal
        })?;

        info!(
            caller = %caller,
            member_id = %target_id,
            decision = ?decision,
            token_len = token.len(),
            "Invitation issued"
        );

        Ok(token)
    }

    async fn redeem(&self, caller: &ActorId, token: &str) -> Result<MemberId, InvitationError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(InvitationError::bad_request("token is required"));
        }

        let key = self
            .secrets
            .invitation_key()
            .await
            .map_err(|e| store_fault("redeem", e))?;

        let plaintext = decrypt(token, &key).map_err(|e| {
            debug!(caller = %caller, reason = %e, token_len = token.len(), "Invitation token rejected");
            InvitationError::from(e)
        })?;

        let member_id = MemberId::new(plaintext).map_err(|_| InvitationError::InvalidToken)?;

        let (actor, member) = tokio::try_join!(self.actors.get(caller), self.members.get(&member_id))
            .map_err(|e| store_fault("redeem", e))?;

        let actor = actor.ok_or_else(|| InvitationError::precondition(NO_ACCOUNT))?;

        // A taken member is a conflict for every caller, the winner included
        let member = member.ok_or(InvitationError::InvalidToken)?;
        if member.is_assigned() {
            return Err(InvitationError::conflict(MEMBER_TAKEN));
        }

        if actor.is_linked() {
            return Err(InvitationError::precondition(ALREADY_LINKED));
        }

        let outcome = self
            .links
            .link(caller, &member_id)
            .await
            .map_err(|e| store_fault("redeem", e))?;

        match outcome {
            LinkOutcome::Linked => {
                info!(caller = %caller, member_id = %member_id, "Invitation redeemed");
                Ok(member_id)
            }
            LinkOutcome::MemberAlreadyLinked | LinkOutcome::ActorAlreadyLinked => {
                debug!(caller = %caller, member_id = %member_id, outcome = ?outcome, "Lost link race");
                Err(InvitationError::conflict(MEMBER_TAKEN))
            }
            LinkOutcome::ActorNotFound => Err(InvitationError::precondition(NO_ACCOUNT)),
            LinkOutcome::MemberNotFound => Err(InvitationError::InvalidToken),
        }
    }
}

/// Log an infrastructure failure and hide it behind an opaque error
fn store_fault(operation: &'static str, err: DomainError) -> InvitationError {
    error!(operation, error = %err, "Invitation operation failed");
    InvitationError::Internal
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::credentials::MockSecretProvider;
    use crate::domain::invitation::InvitationKey;
    use crate::domain::member::{Role, RoleSet, TeamId};
    use crate::domain::storage::mock::MockStorage;
    use crate::infrastructure::storage::InMemoryDocumentStore;

    fn actor_id(id: &str) -> ActorId {
        ActorId::new(id).unwrap()
    }

    fn member_id(id: &str) -> MemberId {
        MemberId::new(id).unwrap()
    }

    fn team(id: &str) -> TeamId {
        TeamId::new(id).unwrap()
    }

    fn secrets(key: InvitationKey) -> Arc<dyn SecretProvider> {
        let mut mock = MockSecretProvider::new();
        mock.expect_invitation_key()
            .returning(move || Ok(key.clone()));
        mock.expect_provider_name().return_const("mock");
        Arc::new(mock)
    }

    fn service_over(store: &InMemoryDocumentStore, key: InvitationKey) -> InvitationService {
        let store = Arc::new(store.clone());
        InvitationService::new(store.clone(), store.clone(), store, secrets(key))
    }

    /// A coaches T1 and is linked to member MA. M123 plays in T1.
    /// MX is an unrelated admin-less member with no roles.
    async fn scenario() -> (InMemoryDocumentStore, InvitationService, InvitationKey) {
        let key = InvitationKey::generate();
        let store = InMemoryDocumentStore::with_members(vec![
            Member::new(member_id("MA"), RoleSet::new().with(Role::coach([team("T1")]))),
            Member::new(member_id("M123"), RoleSet::new().with(Role::player([team("T1")]))),
            Member::new(member_id("MX"), RoleSet::new()),
        ]);

        let mut a = Actor::new(actor_id("A"));
        a.link_member(member_id("MA")).unwrap();
        Storage::<Actor>::create(&store, a).await.unwrap();
        Storage::<Actor>::create(&store, Actor::new(actor_id("B"))).await.unwrap();
        Storage::<Actor>::create(&store, Actor::new(actor_id("C"))).await.unwrap();

        let service = service_over(&store, key.clone());
        (store, service, key)
    }

    #[tokio::test]
    async fn test_issue_and_redeem_links_both_sides() {
        let (store, service, _) = scenario().await;

        let token = service.issue_token(&actor_id("A"), "M123").await.unwrap();
        let linked = service.redeem_token(&actor_id("B"), &token).await.unwrap();
        assert_eq!(linked, member_id("M123"));

        let member: Member = store.get(&member_id("M123")).await.unwrap().unwrap();
        let actor: Actor = store.get(&actor_id("B")).await.unwrap().unwrap();
        assert_eq!(member.linked_actor_id(), Some(&actor_id("B")));
        assert_eq!(actor.linked_member_id(), Some(&member_id("M123")));

        let again = service.redeem_token(&actor_id("C"), &token).await;
        assert!(matches!(again, Err(InvitationError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_issue_does_not_write() {
        let (store, service, _) = scenario().await;

        service.issue_token(&actor_id("A"), "M123").await.unwrap();

        let member: Member = store.get(&member_id("M123")).await.unwrap().unwrap();
        assert!(!member.is_assigned());
    }

    #[tokio::test]
    async fn test_issue_token_names_target() {
        let (_, service, key) = scenario().await;

        let token = service.issue_token(&actor_id("A"), "M123").await.unwrap();
        assert_eq!(decrypt(&token, &key).unwrap(), "M123");
    }

    #[tokio::test]
    async fn test_issue_rejects_bad_target_id() {
        let (_, service, _) = scenario().await;

        for bad in ["", "  ", "a/b", ".."] {
            let result = service.issue_token(&actor_id("A"), bad).await;
            assert!(matches!(result, Err(InvitationError::BadRequest(_))), "{:?}", bad);
        }
    }

    #[tokio::test]
    async fn test_issue_requires_account_and_link() {
        let (_, service, _) = scenario().await;

        let unknown = service.issue_token(&actor_id("ghost"), "M123").await;
        assert_eq!(unknown, Err(InvitationError::precondition(NO_ACCOUNT)));

        let unlinked = service.issue_token(&actor_id("B"), "M123").await;
        assert_eq!(unlinked, Err(InvitationError::precondition(NOT_LINKED)));
    }

    #[tokio::test]
    async fn test_issue_with_dangling_link() {
        let key = InvitationKey::generate();
        let store = InMemoryDocumentStore::with_members(vec![Member::new(
            member_id("M123"),
            RoleSet::new(),
        )]);
        let mut a = Actor::new(actor_id("A"));
        a.link_member(member_id("gone")).unwrap();
        Storage::<Actor>::create(&store, a).await.unwrap();

        let service = service_over(&store, key);
        let result = service.issue_token(&actor_id("A"), "M123").await;

        assert_eq!(result, Err(InvitationError::precondition(LINKED_MEMBER_MISSING)));
    }

    #[tokio::test]
    async fn test_issue_unknown_target() {
        let (_, service, _) = scenario().await;

        let result = service.issue_token(&actor_id("A"), "nobody").await;
        assert_eq!(result, Err(InvitationError::bad_request("unknown member")));
    }

    #[tokio::test]
    async fn test_issue_forbidden_without_shared_team() {
        let (_, service, _) = scenario().await;

        let result = service.issue_token(&actor_id("A"), "MX").await;
        assert!(matches!(result, Err(InvitationError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_admin_may_invite_anyone() {
        let key = InvitationKey::generate();
        let store = InMemoryDocumentStore::with_members(vec![
            Member::new(member_id("boss"), RoleSet::new().with(Role::Admin)),
            Member::new(member_id("MX"), RoleSet::new()),
        ]);
        let mut a = Actor::new(actor_id("A"));
        a.link_member(member_id("boss")).unwrap();
        Storage::<Actor>::create(&store, a).await.unwrap();

        let service = service_over(&store, key);
        assert!(service.issue_token(&actor_id("A"), "MX").await.is_ok());
    }

    #[tokio::test]
    async fn test_redeem_rejects_empty_token() {
        let (_, service, _) = scenario().await;

        let result = service.redeem_token(&actor_id("B"), "   ").await;
        assert!(matches!(result, Err(InvitationError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_redeem_rejects_garbage_and_foreign_tokens() {
        let (_, service, _) = scenario().await;

        let garbage = service.redeem_token(&actor_id("B"), "not base64 !!").await;
        assert_eq!(garbage, Err(InvitationError::InvalidToken));

        let foreign = encrypt("M123", &InvitationKey::generate()).unwrap();
        let forged = service.redeem_token(&actor_id("B"), &foreign).await;
        assert_eq!(forged, Err(InvitationError::InvalidToken));
    }

    #[tokio::test]
    async fn test_redeem_token_for_unknown_or_invalid_member() {
        let (_, service, key) = scenario().await;

        let unknown = encrypt("deleted-member", &key).unwrap();
        assert_eq!(
            service.redeem_token(&actor_id("B"), &unknown).await,
            Err(InvitationError::InvalidToken)
        );

        let invalid = encrypt("bad/id", &key).unwrap();
        assert_eq!(
            service.redeem_token(&actor_id("B"), &invalid).await,
            Err(InvitationError::InvalidToken)
        );
    }

    #[tokio::test]
    async fn test_redeem_requires_unlinked_account() {
        let (_, service, _) = scenario().await;
        let token = service.issue_token(&actor_id("A"), "M123").await.unwrap();

        let unknown = service.redeem_token(&actor_id("ghost"), &token).await;
        assert_eq!(unknown, Err(InvitationError::precondition(NO_ACCOUNT)));

        // A is already linked to MA
        let linked = service.redeem_token(&actor_id("A"), &token).await;
        assert_eq!(linked, Err(InvitationError::precondition(ALREADY_LINKED)));
    }

    #[tokio::test]
    async fn test_store_failure_is_opaque() {
        let key = InvitationKey::generate();
        let actors = Arc::new(MockStorage::<Actor>::new().with_error("connection reset"));
        let members = Arc::new(MockStorage::<Member>::new());
        let links = Arc::new(InMemoryDocumentStore::new());
        let service = InvitationService::new(actors, members, links, secrets(key));

        let result = service.issue_token(&actor_id("A"), "M123").await;
        assert_eq!(result, Err(InvitationError::Internal));
        assert_eq!(result.unwrap_err().to_string(), "internal error");
    }

    #[tokio::test]
    async fn test_secret_failure_is_opaque() {
        let (store, _, _) = scenario().await;
        let mut mock = MockSecretProvider::new();
        mock.expect_invitation_key()
            .returning(|| Err(DomainError::credential("INVITATION_KEY not set")));
        let store = Arc::new(store);
        let service = InvitationService::new(store.clone(), store.clone(), store, Arc::new(mock));

        let result = service.issue_token(&actor_id("A"), "M123").await;
        assert_eq!(result, Err(InvitationError::Internal));
    }

    #[tokio::test]
    async fn test_redeem_does_not_touch_store_for_invalid_token() {
        let key = InvitationKey::generate();
        let failing = Arc::new(MockStorage::<Actor>::new().with_error("must not be called"));
        let service = InvitationService::new(
            failing,
            Arc::new(MockStorage::<Member>::new()),
            Arc::new(InMemoryDocumentStore::new()),
            secrets(key),
        );

        let result = service.redeem_token(&actor_id("B"), "AAAA").await;
        assert_eq!(result, Err(InvitationError::InvalidToken));
    }

    #[tokio::test]
    async fn test_second_redemption_is_conflict_for_winner_too() {
        let (_, service, _) = scenario().await;

        let token = service.issue_token(&actor_id("A"), "M123").await.unwrap();
        service.redeem_token(&actor_id("B"), &token).await.unwrap();

        let replay = service.redeem_token(&actor_id("B"), &token).await;
        assert_eq!(replay, Err(InvitationError::conflict(MEMBER_TAKEN)));

        let fresh = service.issue_token(&actor_id("A"), "M123").await.unwrap();
        let result = service.redeem_token(&actor_id("B"), &fresh).await;
        assert_eq!(result, Err(InvitationError::conflict(MEMBER_TAKEN)));

        let result = service.redeem_token(&actor_id("C"), &fresh).await;
        assert_eq!(result, Err(InvitationError::conflict(MEMBER_TAKEN)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_redemption_has_one_winner() {
        let (store, service, _) = scenario().await;

        let mut redeemers = Vec::new();
        for i in 0..8 {
            let id = actor_id(&format!("R{}", i));
            Storage::<Actor>::create(&store, Actor::new(id.clone())).await.unwrap();
            let token = service.issue_token(&actor_id("A"), "M123").await.unwrap();
            redeemers.push((id, token));
        }

        let tokens: std::collections::HashSet<_> = redeemers.iter().map(|(_, t)| t.clone()).collect();
        assert_eq!(tokens.len(), 8);

        let handles: Vec<_> = redeemers
            .iter()
            .cloned()
            .map(|(id, token)| {
                let service = service.clone();
                tokio::spawn(async move {
                    let result = service.redeem_token(&id, &token).await;
                    (id, result)
                })
            })
            .collect();

        let results: Vec<_> = futures::future::join_all(handles)
            .await
            .into_iter()
            .map(|r| r.unwrap())
            .collect();

        let winners: Vec<&ActorId> = results
            .iter()
            .filter(|(_, r)| r.is_ok())
            .map(|(id, _)| id)
            .collect();
        assert_eq!(winners.len(), 1);
        let winner = winners[0].clone();

        assert!(results
            .iter()
            .filter_map(|(_, r)| r.as_ref().err())
            .all(|e| matches!(e, InvitationError::Conflict(_))));

        let member: Member = store.get(&member_id("M123")).await.unwrap().unwrap();
        assert_eq!(member.linked_actor_id(), Some(&winner));

        for (id, _) in redeemers.iter().filter(|(id, _)| *id != winner) {
            let loser: Actor = store.get(id).await.unwrap().unwrap();
            assert!(!loser.is_linked(), "{}", id);
        }
    }
}
