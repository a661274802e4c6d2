use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use super::aws_secrets_provider::{AwsSecretMapping, AwsSecretsProvider};
use super::{CachedSecretProvider, EnvSecretProvider, DEFAULT_INVITATION_KEY_VAR};
use crate::domain::{DomainError, SecretProvider};

/// Where the invitation key is resolved from
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SecretSource {
    Env {
        #[serde(default = "default_env_var")]
        var_name: String,
    },
    AwsSecrets {
        secret_name: String,
        #[serde(default)]
        field: Option<String>,
    },
}

fn default_env_var() -> String {
    DEFAULT_INVITATION_KEY_VAR.to_string()
}

impl Default for SecretSource {
    fn default() -> Self {
        Self::Env {
            var_name: default_env_var(),
        }
    }
}

/// Factory for creating secret providers
#[derive(Debug)]
pub struct SecretProviderFactory;

impl SecretProviderFactory {
    /// Create a cached secret provider from configuration
    ///
    /// A zero TTL disables caching in practice, since every entry expires immediately.
    pub async fn create(
        source: &SecretSource,
        cache_ttl: Duration,
    ) -> Result<Arc<dyn SecretProvider>, DomainError> {
        match source {
            SecretSource::Env { var_name } => {
                if var_name.trim().is_empty() {
                    return Err(DomainError::configuration(
                        "Invitation key variable name must not be empty",
                    ));
                }

                info!(var_name = %var_name, "Invitation key read from environment");
                Ok(Arc::new(CachedSecretProvider::new(
                    EnvSecretProvider::new(var_name),
                    cache_ttl,
                )))
            }

            SecretSource::AwsSecrets { secret_name, field } => {
                if secret_name.trim().is_empty() {
                    return Err(DomainError::configuration(
                        "AWS secret name must not be empty",
                    ));
                }

                let mut mapping = AwsSecretMapping::new(secret_name);
                if let Some(field) = field {
                    mapping = mapping.with_field(field);
                }

                info!(secret_name = %secret_name, "Invitation key read from AWS Secrets Manager");
                let provider = AwsSecretsProvider::new(mapping).await;
                Ok(Arc::new(CachedSecretProvider::new(provider, cache_ttl)))
            }
        }
    }
}
