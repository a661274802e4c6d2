//! Actor authentication using JWT bearer tokens

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::actor::ActorId;

/// Extractor that requires a valid JWT and yields the caller's actor id
///
/// The token is read from `Authorization: Bearer <jwt>`; its `sub` claim is
/// the actor id. Rejection happens before any store access.
#[derive(Debug, Clone)]
pub struct RequireActor(pub ActorId);

impl FromRequestParts<AppState> for RequireActor {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_jwt_token(&parts.headers)?;

        let claims = state.jwt_service.validate(&token).map_err(|e| {
            debug!(error = %e, "JWT rejected");
            ApiError::unauthorized("invalid or expired token")
        })?;

        let actor_id = claims
            .actor_id()
            .map_err(|_| ApiError::unauthorized("invalid token subject"))?;

        Ok(RequireActor(actor_id))
    }
}

/// Extract JWT token from Authorization header
pub fn extract_jwt_token(headers: &HeaderMap) -> Result<String, ApiError> {
    if let Some(auth_header) = headers.get(header::AUTHORIZATION) {
        let auth_str = auth_header
            .to_str()
            .map_err(|_| ApiError::unauthorized("invalid Authorization header encoding"))?;

        if let Some(token) = auth_str.strip_prefix("Bearer ") {
            let token = token.trim();
            if !token.is_empty() {
                return Ok(token.to_string());
            }
        }
    }

    Err(ApiError::unauthorized(
        "authentication required: provide 'Authorization: Bearer <token>'",
    ))
}
