//! Secret provider implementations for the invitation key

mod aws_secrets_provider;
mod cached_provider;
mod env_provider;
mod factory;

pub use aws_secrets_provider::{
    AwsSecretMapping, AwsSecretsProvider, RealSecretsManagerClient, SecretsManagerClientTrait,
};
pub use cached_provider::CachedSecretProvider;
pub use env_provider::{EnvSecretProvider, DEFAULT_INVITATION_KEY_VAR};
pub use factory::{SecretProviderFactory, SecretSource};
