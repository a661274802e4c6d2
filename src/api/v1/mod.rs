//! Versioned public API

pub mod invitations;

use axum::{routing::post, Router};

use super::state::AppState;

/// Create v1 API router
pub fn create_v1_router() -> Router<AppState> {
    Router::new()
        .route("/invitations", post(invitations::issue_invitation))
        .route("/invitations/redeem", post(invitations::redeem_invitation))
}
