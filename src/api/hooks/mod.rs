//! Identity-provider account hooks

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, post},
    Router,
};
use tracing::debug;

use crate::api::middleware::RequireHookSecret;
use crate::api::state::AppState;
use crate::api::types::{AccountCreatedRequest, ApiError, Json, SuccessResponse};

/// Create hooks router
pub fn create_hooks_router() -> Router<AppState> {
    Router::new()
        .route("/accounts", post(account_created))
        .route("/accounts/{actor_id}", delete(account_deleted))
}

/// POST /hooks/accounts
pub async fn account_created(
    State(state): State<AppState>,
    _auth: RequireHookSecret,
    Json(request): Json<AccountCreatedRequest>,
) -> Result<(StatusCode, Json<SuccessResponse>), ApiError> {
    let actor_id = request
        .actor_id
        .ok_or_else(|| ApiError::bad_request("actor_id is required"))?;
    debug!(actor_id = %actor_id, "Account created hook");

    state.account_service.on_account_created(&actor_id).await?;

    Ok((StatusCode::CREATED, Json(SuccessResponse::ok())))
}

/// DELETE /hooks/accounts/{actor_id}
pub async fn account_deleted(
    State(state): State<AppState>,
    _auth: RequireHookSecret,
    Path(actor_id): Path<String>,
) -> Result<Json<SuccessResponse>, ApiError> {
    debug!(actor_id = %actor_id, "Account deleted hook");

    state.account_service.on_account_deleted(&actor_id).await?;

    Ok(Json(SuccessResponse::ok()))
}
