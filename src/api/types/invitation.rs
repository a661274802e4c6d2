//! Request and response bodies for the invitation and hook endpoints

use serde::{Deserialize, Serialize};

/// `POST /v1/invitations`
///
/// Fields are optional so that a missing field surfaces as a structured
/// bad-request error rather than a deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IssueTokenRequest {
    #[serde(default)]
    pub target_member_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueTokenResponse {
    pub error: bool,
    pub token: String,
}

impl IssueTokenResponse {
    pub fn new(token: String) -> Self {
        Self {
            error: false,
            token,
        }
    }
}

/// `POST /v1/invitations/redeem`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RedeemTokenRequest {
    #[serde(default)]
    pub token: Option<String>,
}

/// Success body with no payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub error: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { error: false }
    }
}

/// `POST /hooks/accounts`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountCreatedRequest {
    #[serde(default)]
    pub actor_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_deserialize_to_none() {
        let issue: IssueTokenRequest = serde_json::from_str("{}").unwrap();
        let redeem: RedeemTokenRequest = serde_json::from_str("{}").unwrap();

        assert!(issue.target_member_id.is_none());
        assert!(redeem.token.is_none());
    }

    #[test]
    fn test_issue_response_shape() {
        let json = serde_json::to_value(IssueTokenResponse::new("abc".to_string())).unwrap();

        assert_eq!(json, serde_json::json!({"error": false, "token": "abc"}));
    }
}
