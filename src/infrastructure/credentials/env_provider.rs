use async_trait::async_trait;
use std::env;

use crate::domain::invitation::InvitationKey;
use crate::domain::{DomainError, SecretProvider};

/// Default variable holding the invitation key
pub const DEFAULT_INVITATION_KEY_VAR: &str = "INVITATION_KEY";

/// Secret provider that reads the invitation key from an environment variable
///
/// The value is re-read on every call; wrap in a cached provider to avoid that.
#[derive(Debug, Clone)]
pub struct EnvSecretProvider {
    var_name: String,
}

impl EnvSecretProvider {
    pub fn new(var_name: impl Into<String>) -> Self {
        Self {
            var_name: var_name.into(),
        }
    }

    pub fn var_name(&self) -> &str {
        &self.var_name
    }
}

impl Default for EnvSecretProvider {
    fn default() -> Self {
        Self::new(DEFAULT_INVITATION_KEY_VAR)
    }
}

#[async_trait]
impl SecretProvider for EnvSecretProvider {
    async fn invitation_key(&self) -> Result<InvitationKey, DomainError> {
        let secret = env::var(&self.var_name).map_err(|_| {
            DomainError::credential(format!(
                "Environment variable '{}' not set",
                self.var_name
            ))
        })?;

        InvitationKey::from_secret(secret.trim()).map_err(|e| {
            DomainError::credential(format!(
                "Environment variable '{}' does not hold a valid key: {}",
                self.var_name, e
            ))
        })
    }

    fn provider_name(&self) -> &'static str {
        "env"
    }
}
