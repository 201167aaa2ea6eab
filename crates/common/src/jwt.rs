//! HMAC JWT verification shared by the API service and its tests.
//!
//! Tokens are signed with the process-wide [`SigningSecret`] by whoever issues
//! them; this module only verifies. The checks, in order:
//!
//! 1. Size limit ([`MAX_JWT_SIZE_BYTES`]) before any decoding
//! 2. Header algorithm must be one of [`HMAC_ALGORITHMS`]
//! 3. Signature integrity against the secret
//! 4. `exp` / `nbf`, only when the claim is present, with clock skew leeway
//!
//! There is no required claim set: a token without `exp` never expires,
//! and `aud`/`iss` are not inspected. A present `exp` or `nbf` must be a JSON
//! number (integer or fractional seconds); any other value is malformed.
//!
//! # Security
//!
//! Every [`JwtValidationError`] displays the same generic message. The
//! variant carries the cause for server-side logging only.

use crate::secret::SigningSecret;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;

// =============================================================================
// Constants
// =============================================================================

/// Maximum accepted token size in bytes (8KB).
///
/// Larger tokens are rejected before base64 decoding or HMAC computation.
/// Typical HS256 tokens with a handful of claims are well under 500 bytes.
pub const MAX_JWT_SIZE_BYTES: usize = 8192;

/// Default leeway applied to `exp` and `nbf`.
pub const DEFAULT_CLOCK_SKEW: Duration = Duration::from_secs(0);

/// Upper bound for a configured leeway (10 minutes).
pub const MAX_CLOCK_SKEW: Duration = Duration::from_secs(600);

/// Algorithms accepted for tokens signed with a shared secret.
pub const HMAC_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

// =============================================================================
// Error Types
// =============================================================================

/// Reasons a token fails verification.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum JwtValidationError {
    /// Token size exceeds [`MAX_JWT_SIZE_BYTES`].
    #[error("The access token is invalid or expired")]
    TokenTooLarge,

    /// Not a decodable `header.payload.signature` structure.
    #[error("The access token is invalid or expired")]
    MalformedToken,

    /// Header names an algorithm outside [`HMAC_ALGORITHMS`].
    #[error("The access token is invalid or expired")]
    UnsupportedAlgorithm,

    /// Signature does not match the secret.
    #[error("The access token is invalid or expired")]
    InvalidSignature,

    /// `exp` is in the past.
    #[error("The access token is invalid or expired")]
    Expired,

    /// `nbf` is in the future.
    #[error("The access token is invalid or expired")]
    NotYetValid,
}

impl JwtValidationError {
    /// Short label for logs and metrics.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::TokenTooLarge => "token_too_large",
            Self::MalformedToken => "malformed",
            Self::UnsupportedAlgorithm => "unsupported_algorithm",
            Self::InvalidSignature => "invalid_signature",
            Self::Expired => "expired",
            Self::NotYetValid => "not_yet_valid",
        }
    }
}

impl From<&jsonwebtoken::errors::Error> for JwtValidationError {
    fn from(err: &jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::ImmatureSignature => Self::NotYetValid,
            ErrorKind::InvalidSignature => Self::InvalidSignature,
            ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                Self::UnsupportedAlgorithm
            }
            _ => Self::MalformedToken,
        }
    }
}

// =============================================================================
// Functions
// =============================================================================

/// Build the `jsonwebtoken` validation rules for HMAC tokens.
///
/// Only the algorithm and signature are checked here. `jsonwebtoken` reads
/// `exp`/`nbf` as `u64` and silently skips values it cannot parse, so the
/// time claims are checked by [`check_time_claims`] instead.
fn hmac_validation() -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.algorithms = HMAC_ALGORITHMS.to_vec();
    validation.required_spec_claims = HashSet::new();
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.validate_aud = false;
    validation
}

/// Check `exp` and `nbf` against the current time, when present.
///
/// A token is expired once `now >= exp + leeway` and not yet valid while
/// `nbf > now + leeway`. Non-numeric values (strings, `null`, objects) are
/// `MalformedToken`.
fn check_time_claims(
    claims: &Map<String, Value>,
    clock_skew: Duration,
) -> Result<(), JwtValidationError> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64();
    let leeway = clock_skew.as_secs_f64();

    if let Some(exp) = claims.get("exp") {
        let exp = exp.as_f64().ok_or(JwtValidationError::MalformedToken)?;
        if now >= exp + leeway {
            return Err(JwtValidationError::Expired);
        }
    }

    if let Some(nbf) = claims.get("nbf") {
        let nbf = nbf.as_f64().ok_or(JwtValidationError::MalformedToken)?;
        if nbf > now + leeway {
            return Err(JwtValidationError::NotYetValid);
        }
    }

    Ok(())
}

/// Verify an HMAC-signed token and return its payload claims.
///
/// # Arguments
///
/// * `token` - The compact JWT string (without the `Bearer` prefix)
/// * `secret` - The shared signing secret
/// * `clock_skew` - Leeway applied to `exp` and `nbf`
///
/// # Errors
///
/// Returns the [`JwtValidationError`] variant describing why the token was
/// rejected. Callers must not forward the variant to clients.
pub fn verify_hmac(
    token: &str,
    secret: &SigningSecret,
    clock_skew: Duration,
) -> Result<Map<String, Value>, JwtValidationError> {
    if token.len() > MAX_JWT_SIZE_BYTES {
        tracing::debug!(
            target: "common.jwt",
            token_size = token.len(),
            max_size = MAX_JWT_SIZE_BYTES,
            "Token rejected: size exceeds maximum allowed"
        );
        return Err(JwtValidationError::TokenTooLarge);
    }

    let key = DecodingKey::from_secret(secret.as_bytes());
    let validation = hmac_validation();

    let data = decode::<Map<String, Value>>(token, &key, &validation).map_err(|e| {
        let cause = JwtValidationError::from(&e);
        tracing::debug!(
            target: "common.jwt",
            error = %e,
            reason = cause.reason(),
            "Token rejected"
        );
        cause
    })?;

    check_time_claims(&data.claims, clock_skew).map_err(|cause| {
        tracing::debug!(
            target: "common.jwt",
            reason = cause.reason(),
            "Token rejected: time claim check failed"
        );
        cause
    })?;

    Ok(data.claims)
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::cast_precision_loss
)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
    use chrono::Utc;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    fn secret(value: &str) -> SigningSecret {
        SigningSecret::new(value).unwrap()
    }

    fn sign(claims: &Value, key: &str, alg: Algorithm) -> String {
        encode(
            &Header::new(alg),
            claims,
            &EncodingKey::from_secret(key.as_bytes()),
        )
        .unwrap()
    }

    fn verify(token: &str, key: &str) -> Result<Map<String, Value>, JwtValidationError> {
        verify_hmac(token, &secret(key), DEFAULT_CLOCK_SKEW)
    }

    #[test]
    fn test_token_without_expiry_is_accepted() {
        let token = sign(&json!({"id": "u1"}), "s3cr3t", Algorithm::HS256);

        let claims = verify(&token, "s3cr3t").unwrap();

        assert_eq!(Value::Object(claims), json!({"id": "u1"}));
    }

    #[test]
    fn test_wrong_secret_is_invalid_signature() {
        let token = sign(&json!({"id": "u1"}), "wrong", Algorithm::HS256);

        assert_eq!(
            verify(&token, "s3cr3t").unwrap_err(),
            JwtValidationError::InvalidSignature
        );
    }

    #[test]
    fn test_all_hmac_algorithms_are_accepted() {
        for alg in HMAC_ALGORITHMS {
            let token = sign(&json!({"id": "u1"}), "s3cr3t", alg);
            assert!(verify(&token, "s3cr3t").is_ok(), "{alg:?} should verify");
        }
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let exp = Utc::now().timestamp() - 3600;
        let token = sign(&json!({"id": "u1", "exp": exp}), "s3cr3t", Algorithm::HS256);

        assert_eq!(
            verify(&token, "s3cr3t").unwrap_err(),
            JwtValidationError::Expired
        );
    }

    #[test]
    fn test_unexpired_token_is_accepted() {
        let exp = Utc::now().timestamp() + 3600;
        let token = sign(&json!({"id": "u1", "exp": exp}), "s3cr3t", Algorithm::HS256);

        let claims = verify(&token, "s3cr3t").unwrap();
        assert_eq!(claims.get("exp"), Some(&json!(exp)));
    }

    #[test]
    fn test_clock_skew_tolerates_recent_expiry() {
        let exp = Utc::now().timestamp() - 30;
        let token = sign(&json!({"id": "u1", "exp": exp}), "s3cr3t", Algorithm::HS256);

        assert!(verify_hmac(&token, &secret("s3cr3t"), Duration::from_secs(120)).is_ok());
        assert_eq!(
            verify(&token, "s3cr3t").unwrap_err(),
            JwtValidationError::Expired
        );
    }

    #[test]
    fn test_future_nbf_is_rejected() {
        let nbf = Utc::now().timestamp() + 3600;
        let token = sign(&json!({"id": "u1", "nbf": nbf}), "s3cr3t", Algorithm::HS256);

        assert_eq!(
            verify(&token, "s3cr3t").unwrap_err(),
            JwtValidationError::NotYetValid
        );
    }

    #[test]
    fn test_fractional_exp_is_checked() {
        let past = Utc::now().timestamp() as f64 - 60.5;
        let token = sign(&json!({"id": "u1", "exp": past}), "s3cr3t", Algorithm::HS256);
        assert_eq!(
            verify(&token, "s3cr3t").unwrap_err(),
            JwtValidationError::Expired
        );

        let future = Utc::now().timestamp() as f64 + 60.5;
        let token = sign(&json!({"id": "u1", "exp": future}), "s3cr3t", Algorithm::HS256);
        assert!(verify(&token, "s3cr3t").is_ok());
    }

    #[test]
    fn test_negative_exp_is_expired() {
        let token = sign(&json!({"id": "u1", "exp": -1}), "s3cr3t", Algorithm::HS256);

        assert_eq!(
            verify(&token, "s3cr3t").unwrap_err(),
            JwtValidationError::Expired
        );
    }

    #[test]
    fn test_non_numeric_time_claims_are_malformed() {
        let bad_values = [
            json!("1000000000"),
            json!(null),
            json!(true),
            json!({"seconds": 1}),
            json!([1]),
        ];

        for claim in ["exp", "nbf"] {
            for value in &bad_values {
                let mut payload = json!({"id": "u1"});
                payload[claim] = value.clone();
                let token = sign(&payload, "s3cr3t", Algorithm::HS256);

                assert_eq!(
                    verify(&token, "s3cr3t").unwrap_err(),
                    JwtValidationError::MalformedToken,
                    "{claim} = {value} should be malformed"
                );
            }
        }
    }

    #[test]
    fn test_past_and_negative_nbf_are_accepted() {
        for nbf in [json!(Utc::now().timestamp() - 60), json!(-1)] {
            let token = sign(&json!({"id": "u1", "nbf": nbf}), "s3cr3t", Algorithm::HS256);
            assert!(verify(&token, "s3cr3t").is_ok(), "nbf {nbf} should pass");
        }
    }

    #[test]
    fn test_clock_skew_tolerates_near_future_nbf() {
        let nbf = Utc::now().timestamp() + 30;
        let token = sign(&json!({"id": "u1", "nbf": nbf}), "s3cr3t", Algorithm::HS256);

        assert!(verify_hmac(&token, &secret("s3cr3t"), Duration::from_secs(120)).is_ok());
        assert_eq!(
            verify(&token, "s3cr3t").unwrap_err(),
            JwtValidationError::NotYetValid
        );
    }

    #[test]
    fn test_audience_is_not_checked() {
        let token = sign(
            &json!({"id": "u1", "aud": "some-client", "iss": "someone"}),
            "s3cr3t",
            Algorithm::HS256,
        );

        assert!(verify(&token, "s3cr3t").is_ok());
    }

    #[test]
    fn test_non_hmac_algorithm_is_rejected() {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(br#"{"id":"u1"}"#);
        let token = format!("{header}.{payload}.c2lnbmF0dXJl");

        assert_eq!(
            verify(&token, "s3cr3t").unwrap_err(),
            JwtValidationError::UnsupportedAlgorithm
        );
    }

    #[test]
    fn test_alg_none_is_rejected() {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(br#"{"id":"u1"}"#);
        let token = format!("{header}.{payload}.");

        assert!(verify(&token, "s3cr3t").is_err());
    }

    #[test]
    fn test_tampered_payload_is_rejected() {
        let token = sign(&json!({"id": "u1"}), "s3cr3t", Algorithm::HS256);
        let forged = URL_SAFE_NO_PAD.encode(br#"{"id":"admin"}"#);
        let mut parts: Vec<&str> = token.split('.').collect();
        parts[1] = &forged;
        let tampered = parts.join(".");

        assert_eq!(
            verify(&tampered, "s3cr3t").unwrap_err(),
            JwtValidationError::InvalidSignature
        );
    }

    #[test]
    fn test_malformed_tokens_are_rejected() {
        for token in ["", "abc", "only.two", "!!!.@@@.###", "a.b.c.d"] {
            assert!(verify(token, "s3cr3t").is_err(), "{token:?} should fail");
        }
        assert_eq!(
            verify("abc", "s3cr3t").unwrap_err(),
            JwtValidationError::MalformedToken
        );
    }

    #[test]
    fn test_oversized_token_is_rejected_before_parsing() {
        let token = "a".repeat(MAX_JWT_SIZE_BYTES + 1);

        assert_eq!(
            verify(&token, "s3cr3t").unwrap_err(),
            JwtValidationError::TokenTooLarge
        );
    }

    #[test]
    fn test_errors_share_a_generic_message() {
        let all = [
            JwtValidationError::TokenTooLarge,
            JwtValidationError::MalformedToken,
            JwtValidationError::UnsupportedAlgorithm,
            JwtValidationError::InvalidSignature,
            JwtValidationError::Expired,
            JwtValidationError::NotYetValid,
        ];
        for err in all {
            assert_eq!(err.to_string(), "The access token is invalid or expired");
        }
    }

    #[test]
    fn test_verification_is_repeatable() {
        let token = sign(&json!({"id": "u1"}), "s3cr3t", Algorithm::HS256);
        let key = secret("s3cr3t");

        let first = verify_hmac(&token, &key, DEFAULT_CLOCK_SKEW).unwrap();
        let second = verify_hmac(&token, &key, DEFAULT_CLOCK_SKEW).unwrap();

        assert_eq!(first, second);
    }
}
