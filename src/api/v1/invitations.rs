//! Invitation endpoint handlers

use axum::extract::State;
use tracing::debug;

use crate::api::middleware::RequireActor;
use crate::api::state::AppState;
use crate::api::types::{
    ApiError, IssueTokenRequest, IssueTokenResponse, Json, RedeemTokenRequest, SuccessResponse,
};

/// POST /v1/invitations
pub async fn issue_invitation(
    State(state): State<AppState>,
    RequireActor(caller): RequireActor,
    Json(request): Json<IssueTokenRequest>,
) -> Result<Json<IssueTokenResponse>, ApiError> {
    let target = request.target_member_id.unwrap_or_default();
    debug!(caller = %caller, target_member_id = %target, "Issue invitation request");

    let token = state
        .invitation_service
        .issue_token(&caller, &target)
        .await?;

    Ok(Json(IssueTokenResponse::new(token)))
}

/// POST /v1/invitations/redeem
pub async fn redeem_invitation(
    State(state): State<AppState>,
    RequireActor(caller): RequireActor,
    Json(request): Json<RedeemTokenRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let token = request.token.unwrap_or_default();
    debug!(caller = %caller, token_len = token.len(), "Redeem invitation request");

    state
        .invitation_service
        .redeem_token(&caller, &token)
        .await?;

    Ok(Json(SuccessResponse::ok()))
}
