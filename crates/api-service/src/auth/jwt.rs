//! JWT validation for the API service.
//!
//! Validates incoming bearer tokens against the shared signing secret.
//!
//! # Security
//!
//! - Tokens are size-checked BEFORE parsing (DoS prevention)
//! - Only HMAC algorithms (HS256/HS384/HS512) are accepted
//! - `exp` and `nbf` are enforced when present, with clock skew leeway
//! - Every verification failure collapses to the same client-facing error

use crate::auth::claims::Claims;
use crate::errors::ApiError;
use axum::http::{header::AUTHORIZATION, HeaderMap};
use common::jwt::verify_hmac;
use common::secret::SigningSecret;
use std::time::Duration;
use tracing::instrument;

/// Extract the token from an `Authorization: Bearer <token>` header.
///
/// The header value is split on whitespace and the second part is taken.
/// The scheme word is not inspected.
///
/// # Errors
///
/// Returns `ApiError::MissingCredential` if the header is absent, is not
/// valid visible ASCII, or has no second part.
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            tracing::debug!(target: "api.auth.jwt", "Missing Authorization header");
            ApiError::MissingCredential
        })?;

    auth_header.split_whitespace().nth(1).ok_or_else(|| {
        tracing::debug!(target: "api.auth.jwt", "Authorization header has no token part");
        ApiError::MissingCredential
    })
}

/// JWT validator bound to the process-wide signing secret.
#[derive(Debug)]
pub struct JwtValidator {
    /// Shared HMAC key.
    secret: SigningSecret,

    /// Leeway applied to `exp` and `nbf`.
    clock_skew: Duration,
}

impl JwtValidator {
    /// Create a new JWT validator.
    ///
    /// # Arguments
    ///
    /// * `secret` - Key the tokens were signed with
    /// * `clock_skew_seconds` - Leeway for `exp` and `nbf`
    pub fn new(secret: SigningSecret, clock_skew_seconds: u64) -> Self {
        Self {
            secret,
            clock_skew: Duration::from_secs(clock_skew_seconds),
        }
    }

    /// Validate a JWT and return the claims.
    ///
    /// Verification has no side effects, so the same token validates the
    /// same way on every call.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidCredential` for all validation failures. The
    /// specific cause is logged at debug level only.
    #[instrument(skip_all)]
    pub fn validate(&self, token: &str) -> Result<Claims, ApiError> {
        let claims = verify_hmac(token, &self.secret, self.clock_skew).map_err(|e| {
            tracing::debug!(target: "api.auth.jwt", reason = e.reason(), "Token validation failed");
            ApiError::InvalidCredential
        })?;

        tracing::debug!(target: "api.auth.jwt", "Token validated successfully");
        Ok(Claims::from(claims))
    }
}
