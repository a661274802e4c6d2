use async_trait::async_trait;
use std::fmt::Debug;

use crate::domain::invitation::InvitationKey;
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Source of the invitation key (environment, AWS Secrets Manager, ...)
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SecretProvider: Send + Sync + Debug {
    /// Resolve the current invitation key
    async fn invitation_key(&self) -> Result<InvitationKey, DomainError>;

    /// Get provider name for logging/debugging
    fn provider_name(&self) -> &'static str;
}
