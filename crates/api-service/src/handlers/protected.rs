//! Example protected handler.
//!
//! Mounted behind the auth gate; echoes the caller's claims.

use crate::auth::Claims;
use crate::models::ProtectedResponse;
use axum::{Extension, Json};
use tracing::instrument;

/// Message returned by `/api/protected`.
pub const PROTECTED_MESSAGE: &str = "This is a protected route";

/// Handler for GET /api/protected
///
/// The claims are attached by `require_auth`; this handler is never reached
/// without them.
#[instrument(skip_all, name = "api.protected.get")]
pub async fn get_protected(Extension(claims): Extension<Claims>) -> Json<ProtectedResponse> {
    tracing::debug!(target: "api.handlers.protected", user = ?claims.identity(), "Serving protected route");

    Json(ProtectedResponse {
        message: PROTECTED_MESSAGE.to_string(),
        user: claims,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_get_protected_echoes_claims() {
        let claims: Claims = serde_json::from_value(json!({"id": "u1"})).unwrap();

        let Json(response) = get_protected(Extension(claims)).await;

        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"message": "This is a protected route", "user": {"id": "u1"}})
        );
    }
}
