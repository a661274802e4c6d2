use async_trait::async_trait;
use moka::future::Cache;
use std::time::Duration;

use crate::domain::invitation::InvitationKey;
use crate::domain::{DomainError, SecretProvider};

/// Secret provider wrapper that keeps the resolved key for a TTL
///
/// Once the TTL lapses the next call goes back to the inner provider, which is
/// how a rotated key is picked up without a restart.
#[derive(Debug)]
pub struct CachedSecretProvider<P: SecretProvider> {
    inner: P,
    cache: Cache<(), InvitationKey>,
}

impl<P: SecretProvider> CachedSecretProvider<P> {
    pub fn new(inner: P, ttl: Duration) -> Self {
        let cache = Cache::builder().time_to_live(ttl).max_capacity(1).build();

        Self { inner, cache }
    }
}

#[async_trait]
impl<P: SecretProvider> SecretProvider for CachedSecretProvider<P> {
    async fn invitation_key(&self) -> Result<InvitationKey, DomainError> {
        if let Some(key) = self.cache.get(&()).await {
            tracing::trace!(provider = self.inner.provider_name(), "Cache hit for invitation key");
            return Ok(key);
        }

        tracing::debug!(
            provider = self.inner.provider_name(),
            "Cache miss, resolving invitation key"
        );

        let key = self.inner.invitation_key().await?;
        self.cache.insert((), key.clone()).await;

        Ok(key)
    }

    fn provider_name(&self) -> &'static str {
        self.inner.provider_name()
    }
}
