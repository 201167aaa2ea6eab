//! API service error types.
//!
//! All errors map to an HTTP status code and a `{"message": "..."}` JSON body
//! via the `IntoResponse` impl. Messages returned to clients are fixed
//! strings; the underlying cause of a 500 is logged server-side only.

use crate::models::MessageResponse;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::any::Any;
use thiserror::Error;

/// Body for a missing or unusable bearer credential.
pub const ACCESS_DENIED_MESSAGE: &str = "Access Denied";

/// Body for a credential that failed verification.
pub const INVALID_TOKEN_MESSAGE: &str = "Invalid Token";

/// Body for any unhandled failure in a handler.
pub const INTERNAL_ERROR_MESSAGE: &str = "Something went wrong!";

/// API service error type.
///
/// Maps to HTTP status codes:
/// - MissingCredential, InvalidCredential: 403 Forbidden
/// - Database, Internal: 500 Internal Server Error
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Missing credential")]
    MissingCredential,

    #[error("Invalid credential")]
    InvalidCredential,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingCredential | ApiError::InvalidCredential => StatusCode::FORBIDDEN,
            ApiError::Database(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Fixed client-facing message for this error.
    fn client_message(&self) -> &'static str {
        match self {
            ApiError::MissingCredential => ACCESS_DENIED_MESSAGE,
            ApiError::InvalidCredential => INVALID_TOKEN_MESSAGE,
            ApiError::Database(_) | ApiError::Internal(_) => INTERNAL_ERROR_MESSAGE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Database(err) => {
                tracing::error!(target: "api.database", error = %err, "Database operation failed");
            }
            ApiError::Internal(err) => {
                tracing::error!(target: "api.errors", error = %err, "Unhandled handler error");
            }
            ApiError::MissingCredential | ApiError::InvalidCredential => {}
        }

        (
            self.status_code(),
            Json(MessageResponse::new(self.client_message())),
        )
            .into_response()
    }
}

/// Convert sqlx errors to ApiError
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::Database(err.to_string())
    }
}

/// Responder for `CatchPanicLayer`: a panicking handler is answered like any
/// other unhandled error.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };

    ApiError::Internal(format!("handler panicked: {}", detail)).into_response()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use axum::body::Body;
    use http_body_util::BodyExt;

    // Helper function to read the response body as JSON
    async fn read_body_json(body: Body) -> serde_json::Value {
        let bytes = body.collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_display_does_not_depend_on_cause() {
        assert_eq!(ApiError::MissingCredential.to_string(), "Missing credential");
        assert_eq!(ApiError::InvalidCredential.to_string(), "Invalid credential");
        assert_eq!(
            ApiError::Database("connection reset".to_string()).to_string(),
            "Database error: connection reset"
        );
        assert_eq!(
            ApiError::Internal("boom".to_string()).to_string(),
            "Internal error: boom"
        );
    }

    #[test]
    fn test_status_codes_match_responses() {
        let cases = [
            (ApiError::MissingCredential, StatusCode::FORBIDDEN),
            (ApiError::InvalidCredential, StatusCode::FORBIDDEN),
            (
                ApiError::Database("test".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ApiError::Internal("test".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.status_code(), expected);
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[tokio::test]
    async fn test_into_response_missing_credential() {
        let response = ApiError::MissingCredential.into_response();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body_json = read_body_json(response.into_body()).await;
        assert_eq!(body_json, serde_json::json!({"message": "Access Denied"}));
    }

    #[tokio::test]
    async fn test_into_response_invalid_credential() {
        let response = ApiError::InvalidCredential.into_response();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body_json = read_body_json(response.into_body()).await;
        assert_eq!(body_json, serde_json::json!({"message": "Invalid Token"}));
    }

    #[tokio::test]
    async fn test_into_response_database_error_hides_detail() {
        let response = ApiError::Database("password authentication failed".to_string())
            .into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body_json = read_body_json(response.into_body()).await;
        assert_eq!(
            body_json,
            serde_json::json!({"message": "Something went wrong!"})
        );
    }

    #[tokio::test]
    async fn test_into_response_internal_hides_detail() {
        let response = ApiError::Internal("index out of bounds".to_string()).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body_json = read_body_json(response.into_body()).await;
        assert_eq!(body_json["message"], "Something went wrong!");
    }

    #[tokio::test]
    async fn test_handle_panic_with_str_payload() {
        let response = handle_panic(Box::new("boom"));

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body_json = read_body_json(response.into_body()).await;
        assert_eq!(body_json["message"], "Something went wrong!");
    }

    #[tokio::test]
    async fn test_handle_panic_with_opaque_payload() {
        let response = handle_panic(Box::new(42_u32));

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
