use async_trait::async_trait;
use aws_sdk_secretsmanager::Client as SecretsManagerClient;

use crate::domain::invitation::InvitationKey;
use crate::domain::{DomainError, SecretProvider};

/// Trait for AWS Secrets Manager client operations (for mocking)
#[async_trait]
pub trait SecretsManagerClientTrait: Send + Sync + std::fmt::Debug {
    async fn get_secret_value(&self, secret_name: &str) -> Result<String, DomainError>;
}

/// Real AWS Secrets Manager client wrapper
#[derive(Debug)]
pub struct RealSecretsManagerClient {
    client: SecretsManagerClient,
}

impl RealSecretsManagerClient {
    pub fn new(client: SecretsManagerClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SecretsManagerClientTrait for RealSecretsManagerClient {
    async fn get_secret_value(&self, secret_name: &str) -> Result<String, DomainError> {
        let response = self
            .client
            .get_secret_value()
            .secret_id(secret_name)
            .send()
            .await
            .map_err(|e| DomainError::credential(format!("AWS Secrets Manager error: {}", e)))?;

        response
            .secret_string()
            .map(|s| s.to_string())
            .ok_or_else(|| DomainError::credential("Secret does not contain a string value"))
    }
}

/// Where the key lives inside a Secrets Manager secret
#[derive(Debug, Clone)]
pub struct AwsSecretMapping {
    pub secret_name: String,
    /// JSON field holding the key; `None` means the whole secret string is the key
    pub field: Option<String>,
}

impl AwsSecretMapping {
    pub fn new(secret_name: impl Into<String>) -> Self {
        Self {
            secret_name: secret_name.into(),
            field: None,
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }
}

/// Secret provider that reads the invitation key from AWS Secrets Manager
#[derive(Debug)]
pub struct AwsSecretsProvider<C: SecretsManagerClientTrait> {
    client: C,
    mapping: AwsSecretMapping,
}

impl AwsSecretsProvider<RealSecretsManagerClient> {
    pub async fn new(mapping: AwsSecretMapping) -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let client = SecretsManagerClient::new(&config);

        Self::with_client(RealSecretsManagerClient::new(client), mapping)
    }
}

impl<C: SecretsManagerClientTrait> AwsSecretsProvider<C> {
    pub fn with_client(client: C, mapping: AwsSecretMapping) -> Self {
        Self { client, mapping }
    }

    fn extract_secret(&self, secret_string: &str) -> Result<String, DomainError> {
        let Some(field) = &self.mapping.field else {
            return Ok(secret_string.trim().to_string());
        };

        let secret_data: serde_json::Value = serde_json::from_str(secret_string)
            .map_err(|e| DomainError::credential(format!("Failed to parse secret as JSON: {}", e)))?;

        secret_data
            .get(field)
            .and_then(|v| v.as_str())
            .map(|s| s.trim().to_string())
            .ok_or_else(|| {
                DomainError::credential(format!("Field '{}' not found in secret", field))
            })
    }
}

#[async_trait]
impl<C: SecretsManagerClientTrait> SecretProvider for AwsSecretsProvider<C> {
    async fn invitation_key(&self) -> Result<InvitationKey, DomainError> {
        let secret_string = self.client.get_secret_value(&self.mapping.secret_name).await?;
        let secret = self.extract_secret(&secret_string)?;

        InvitationKey::from_secret(&secret).map_err(|e| {
            DomainError::credential(format!(
                "Secret '{}' does not hold a valid key: {}",
                self.mapping.secret_name, e
            ))
        })
    }

    fn provider_name(&self) -> &'static str {
        "aws_secrets"
    }
}
