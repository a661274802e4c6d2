//! Application configuration

mod app_config;

pub use app_config::{
    AppConfig, AuthConfig, DEFAULT_JWT_SECRET, InvitationConfig, LogFormat, LoggingConfig, ServerConfig,
    StorageSettings,
};
