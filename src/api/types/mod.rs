//! API request, response, and error types

pub mod error;
pub mod invitation;
pub mod json;

pub use error::{ApiError, ApiErrorResponse};
pub use invitation::{
    AccountCreatedRequest, IssueTokenRequest, IssueTokenResponse, RedeemTokenRequest,
    SuccessResponse,
};
pub use json::Json;
