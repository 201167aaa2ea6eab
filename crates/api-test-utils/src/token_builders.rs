//! Builder for signed test tokens.
//!
//! Claims are an open JSON object, so the builder starts empty and only adds
//! what the test asks for. No `exp` is set unless requested.

use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{Map, Value};

/// Builder for HMAC-signed test JWTs.
///
/// # Example
/// ```rust,ignore
/// let token = TestTokenBuilder::new()
///     .for_user("u1")
///     .expires_in(3600)
///     .sign(TEST_JWT_SECRET);
/// ```
pub struct TestTokenBuilder {
    claims: Map<String, Value>,
    algorithm: Algorithm,
}

impl TestTokenBuilder {
    /// Create a builder with no claims, signing with HS256.
    pub fn new() -> Self {
        Self {
            claims: Map::new(),
            algorithm: Algorithm::HS256,
        }
    }

    /// Set an arbitrary claim.
    pub fn claim(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.claims.insert(key.to_string(), value.into());
        self
    }

    /// Set the `id` claim.
    pub fn for_user(self, id: &str) -> Self {
        self.claim("id", id)
    }

    /// Set `exp` to `seconds` from now. Negative values produce an expired
    /// token.
    pub fn expires_in(self, seconds: i64) -> Self {
        self.claim("exp", (Utc::now() + Duration::seconds(seconds)).timestamp())
    }

    /// Set `exp` one hour in the past.
    pub fn expired(self) -> Self {
        self.expires_in(-3600)
    }

    /// Set `nbf` to `seconds` from now.
    pub fn not_before(self, seconds: i64) -> Self {
        self.claim("nbf", (Utc::now() + Duration::seconds(seconds)).timestamp())
    }

    /// Sign with a different HMAC algorithm.
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// The claims as a JSON value.
    pub fn build_claims(&self) -> Value {
        Value::Object(self.claims.clone())
    }

    /// Sign the claims with `secret`.
    pub fn sign(&self, secret: &str) -> String {
        encode(
            &Header::new(self.algorithm),
            &self.claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .expect("HMAC signing of a JSON map cannot fail")
    }
}

impl Default for TestTokenBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder_defaults_to_empty_claims() {
        assert_eq!(TestTokenBuilder::default().build_claims(), json!({}));
    }

    #[test]
    fn test_builder_sets_claims() {
        let claims = TestTokenBuilder::new()
            .for_user("u1")
            .claim("role", "admin")
            .expires_in(60)
            .build_claims();

        assert_eq!(claims["id"], "u1");
        assert_eq!(claims["role"], "admin");
        assert!(claims["exp"].as_i64().unwrap() > Utc::now().timestamp());
    }

    #[test]
    fn test_expired_is_in_the_past() {
        let claims = TestTokenBuilder::new().expired().build_claims();
        assert!(claims["exp"].as_i64().unwrap() < Utc::now().timestamp());
    }

    #[test]
    fn test_sign_produces_three_segments() {
        let token = TestTokenBuilder::new().for_user("u1").sign("s3cr3t");
        assert_eq!(token.split('.').count(), 3);
    }
}
