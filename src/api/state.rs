//! Application state for shared services

use std::sync::Arc;

use crate::domain::actor::{Actor, ActorId};
use crate::domain::invitation::InvitationError;
use crate::domain::member::{Member, MemberId};
use crate::domain::storage::Storage;
use crate::domain::DomainError;
use crate::infrastructure::account::AccountService;
use crate::infrastructure::auth::JwtGenerator;
use crate::infrastructure::invitation::InvitationService;

/// Application state containing shared services using dynamic dispatch
#[derive(Clone)]
pub struct AppState {
    pub invitation_service: Arc<dyn InvitationServiceTrait>,
    pub account_service: Arc<dyn AccountServiceTrait>,
    pub jwt_service: Arc<dyn JwtGenerator>,
    /// Member collection, probed by the readiness check
    pub members: Arc<dyn Storage<Member>>,
    /// Shared secret expected in `x-hook-secret`; hooks are refused when unset
    pub hook_secret: Option<Arc<str>>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("jwt_service", &self.jwt_service)
            .field("hook_secret", &self.hook_secret.as_ref().map(|_| "[hidden]"))
            .finish_non_exhaustive()
    }
}

/// Trait for invitation service operations
#[async_trait::async_trait]
pub trait InvitationServiceTrait: Send + Sync {
    async fn issue_token(
        &self,
        caller: &ActorId,
        target_member_id: &str,
    ) -> Result<String, InvitationError>;

    async fn redeem_token(&self, caller: &ActorId, token: &str)
    -> Result<MemberId, InvitationError>;
}

/// Trait for account hook operations
#[async_trait::async_trait]
pub trait AccountServiceTrait: Send + Sync {
    async fn on_account_created(&self, actor_id: &str) -> Result<Actor, DomainError>;

    async fn on_account_deleted(&self, actor_id: &str) -> Result<bool, DomainError>;
}

#[async_trait::async_trait]
impl InvitationServiceTrait for InvitationService {
    async fn issue_token(
        &self,
        caller: &ActorId,
        target_member_id: &str,
    ) -> Result<String, InvitationError> {
        InvitationService::issue_token(self, caller, target_member_id).await
    }

    async fn redeem_token(
        &self,
        caller: &ActorId,
        token: &str,
    ) -> Result<MemberId, InvitationError> {
        InvitationService::redeem_token(self, caller, token).await
    }
}

#[async_trait::async_trait]
impl AccountServiceTrait for AccountService {
    async fn on_account_created(&self, actor_id: &str) -> Result<Actor, DomainError> {
        AccountService::on_account_created(self, actor_id).await
    }

    async fn on_account_deleted(&self, actor_id: &str) -> Result<bool, DomainError> {
        AccountService::on_account_deleted(self, actor_id).await
    }
}
