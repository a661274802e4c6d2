//! Credentials domain - secret provisioning for the invitation key

mod provider;

pub use provider::SecretProvider;

#[cfg(test)]
pub use provider::MockSecretProvider;
