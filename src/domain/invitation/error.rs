//! Caller-facing invitation errors

use thiserror::Error;

use super::codec::CodecError;

/// Failures reported to the caller of issue/redeem
///
/// Every variant except `Internal` is attributable to the caller's input or
/// state. `Internal` carries no detail; the cause is logged server-side.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvitationError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Precondition(String),

    #[error("{0}")]
    Forbidden(String),

    /// Decryption, decoding, or identifier failure. The message is fixed.
    #[error("invalid invitation token")]
    InvalidToken,

    #[error("{0}")]
    Conflict(String),

    #[error("internal error")]
    Internal,
}

impl InvitationError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    /// Stable machine-readable code, also used as a metric label
    pub fn code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "bad_request",
            Self::Precondition(_) => "precondition_failed",
            Self::Forbidden(_) => "forbidden",
            Self::InvalidToken => "invalid_token",
            Self::Conflict(_) => "conflict",
            Self::Internal => "internal_error",
        }
    }
}

/// Every codec failure collapses to the same opaque error
impl From<CodecError> for InvitationError {
    fn from(_: CodecError) -> Self {
        Self::InvalidToken
    }
}
