//! JWT claims recovered from a validated token.
//!
//! Claims are an open mapping: the issuer decides the schema and the gate
//! only passes it through. Values are redacted in Debug output so identities
//! never reach logs via `{:?}`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Claims carried by a validated token.
///
/// Serializes back to exactly the JSON object found in the token payload.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Claims(Map<String, Value>);

/// Custom Debug implementation that lists claim names only.
impl fmt::Debug for Claims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.0.keys().map(|k| (k, "[REDACTED]")))
            .finish()
    }
}

impl Claims {
    /// Look up a single claim.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// The caller's identity: the `id` claim, falling back to `sub`.
    pub fn identity(&self) -> Option<&str> {
        self.get("id")
            .and_then(Value::as_str)
            .or_else(|| self.get("sub").and_then(Value::as_str))
    }

    /// Borrow the underlying claim map.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Take ownership of the underlying claim map.
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Claims {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn from_json(value: Value) -> Claims {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_claims_debug_redacts_values() {
        let claims = from_json(json!({"id": "secret-user-id", "email": "alice@example.com"}));

        let debug_str = format!("{:?}", claims);

        assert!(
            !debug_str.contains("secret-user-id"),
            "Debug output should not contain claim values"
        );
        assert!(!debug_str.contains("alice@example.com"));
        assert!(debug_str.contains("\"id\""));
        assert!(debug_str.contains("[REDACTED]"));
    }

    #[test]
    fn test_identity_prefers_id() {
        let claims = from_json(json!({"id": "u1", "sub": "subject"}));
        assert_eq!(claims.identity(), Some("u1"));
    }

    #[test]
    fn test_identity_falls_back_to_sub() {
        let claims = from_json(json!({"sub": "subject"}));
        assert_eq!(claims.identity(), Some("subject"));
    }

    #[test]
    fn test_identity_ignores_non_string_id() {
        let claims = from_json(json!({"id": 42, "sub": "subject"}));
        assert_eq!(claims.identity(), Some("subject"));

        let claims = from_json(json!({"id": 42}));
        assert_eq!(claims.identity(), None);
    }

    #[test]
    fn test_serialization_is_transparent() {
        let original = json!({"id": "u1", "roles": ["reader"], "iat": 1700000000});
        let claims = from_json(original.clone());

        assert_eq!(serde_json::to_value(&claims).unwrap(), original);
    }

    #[test]
    fn test_from_map() {
        let mut map = Map::new();
        map.insert("id".to_string(), json!("u1"));

        let claims = Claims::from(map.clone());

        assert_eq!(claims.get("id"), Some(&json!("u1")));
        assert_eq!(claims.as_map(), &map);
        assert_eq!(claims.into_map(), map);
    }
}
