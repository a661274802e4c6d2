//! Shared-secret authentication for identity-provider hooks

use axum::{extract::FromRequestParts, http::request::Parts};
use subtle::ConstantTimeEq;
use tracing::warn;

use crate::api::state::AppState;
use crate::api::types::ApiError;

/// Header carrying the hook secret
pub const HOOK_SECRET_HEADER: &str = "x-hook-secret";

/// Extractor that requires the configured hook secret
#[derive(Debug, Clone, Copy)]
pub struct RequireHookSecret;

impl FromRequestParts<AppState> for RequireHookSecret {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(expected) = state.hook_secret.as_deref() else {
            warn!("Hook called but no hook secret is configured");
            return Err(ApiError::forbidden("hooks are disabled"));
        };

        let provided = parts
            .headers
            .get(HOOK_SECRET_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("missing hook secret"))?;

        if !secrets_match(provided, expected) {
            return Err(ApiError::unauthorized("invalid hook secret"));
        }

        Ok(RequireHookSecret)
    }
}

fn secrets_match(provided: &str, expected: &str) -> bool {
    provided.as_bytes().ct_eq(expected.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secrets_match() {
        assert!(secrets_match("s3cret", "s3cret"));
        assert!(!secrets_match("s3cret", "s3cres"));
        assert!(!secrets_match("s3c", "s3cret"));
        assert!(!secrets_match("", "s3cret"));
    }
}
