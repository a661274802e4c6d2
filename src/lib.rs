//! member-link
//!
//! Links identity-provider accounts (actors) to member records through
//! single-use, authenticated-encryption invitation tokens:
//! - role-based authorization of who may invite whom
//! - AES-256-GCM invitation tokens
//! - exactly-once linking backed by an in-memory or PostgreSQL document store

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use api::state::AppState;
use domain::credentials::SecretProvider;
use domain::member::Member;
use infrastructure::{
    account::AccountService,
    auth::{JwtConfig, JwtService},
    credentials::SecretProviderFactory,
    invitation::InvitationService,
    storage::StorageFactory,
};

/// Create the application state with custom configuration
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    let storage_config = config.storage.to_storage_config()?;
    info!(backend = ?storage_config.storage_type(), "Storage backend");

    let storage = StorageFactory::create(&storage_config)
        .await
        .context("failed to initialize document store")?;

    if let Some(seed_file) = &config.storage.seed_file {
        let members = load_seed_members(Path::new(seed_file)).await?;
        let count = storage.seed_members(members).await?;
        info!(seed_file = %seed_file, created = count, "Seeded members");
    }

    let secret_source = config.invitation.to_secret_source()?;
    let secrets = SecretProviderFactory::create(&secret_source, config.invitation.cache_ttl()).await?;

    if let Err(e) = secrets.invitation_key().await {
        warn!(provider = secrets.provider_name(), error = %e, "Invitation key not available yet");
    }

    if config.auth.jwt_secret == crate::config::DEFAULT_JWT_SECRET {
        warn!("auth.jwt_secret is the built-in default; set APP__AUTH__JWT_SECRET");
    }

    let hook_secret = config
        .auth
        .hook_secret
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(Arc::from);
    if hook_secret.is_none() {
        warn!("auth.hook_secret not set; account hooks are disabled");
    }

    let invitation_service = InvitationService::new(
        storage.actors.clone(),
        storage.members.clone(),
        storage.links.clone(),
        secrets,
    );
    let account_service = AccountService::new(storage.actors.clone());
    let jwt_service = JwtService::new(JwtConfig::new(
        config.auth.jwt_secret.clone(),
        config.auth.jwt_expiration_hours,
    ));

    Ok(AppState {
        invitation_service: Arc::new(invitation_service),
        account_service: Arc::new(account_service),
        jwt_service: Arc::new(jwt_service),
        members: storage.members,
        hook_secret,
    })
}

/// Read a JSON array of member documents
async fn load_seed_members(path: &Path) -> anyhow::Result<Vec<Member>> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read seed file {}", path.display()))?;

    serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse seed file {}", path.display()))
}
