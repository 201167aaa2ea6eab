//! API service models.
//!
//! Response bodies shared by handlers and the error responder.

use crate::auth::Claims;
use serde::{Deserialize, Serialize};

/// `{"message": "..."}` body used by error responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Health check response.
///
/// Returned by the `/api/health` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service health status ("healthy" or "unhealthy").
    pub status: String,

    /// Database connectivity status.
    pub database: String,
}

/// Response for `/api/protected`.
#[derive(Debug, Clone, Serialize)]
pub struct ProtectedResponse {
    pub message: String,

    /// Claims of the authenticated caller, exactly as carried by the token.
    pub user: Claims,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_response_serialization() {
        let json = serde_json::to_value(MessageResponse::new("Access Denied")).unwrap();
        assert_eq!(json, json!({"message": "Access Denied"}));
    }

    #[test]
    fn test_health_response_serialization() {
        let response = HealthResponse {
            status: "unhealthy".to_string(),
            database: "unhealthy".to_string(),
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json, json!({"status": "unhealthy", "database": "unhealthy"}));
    }

    #[test]
    fn test_protected_response_embeds_claims_object() {
        let claims: Claims = serde_json::from_value(json!({"id": "u1", "role": "admin"})).unwrap();
        let response = ProtectedResponse {
            message: "This is a protected route".to_string(),
            user: claims,
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(
            json,
            json!({
                "message": "This is a protected route",
                "user": {"id": "u1", "role": "admin"}
            })
        );
    }
}
