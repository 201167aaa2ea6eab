//! The process-wide symmetric signing secret.
//!
//! Tokens are signed elsewhere and verified here with the same key, so the
//! secret is loaded once at startup and shared read-only for the lifetime of
//! the process. It is wrapped in [`secrecy::SecretString`] so that:
//!
//! - `Debug` output (and therefore `tracing` fields using `?`) shows
//!   `[REDACTED]` instead of the key material;
//! - the backing memory is zeroized on drop;
//! - reading the key requires an explicit [`SigningSecret::as_bytes`] call,
//!   which only the verification path performs.
//!
//! # Example
//!
//! ```rust
//! use common::secret::SigningSecret;
//!
//! let secret = SigningSecret::new("s3cr3t").unwrap();
//! assert_eq!(secret.as_bytes(), b"s3cr3t");
//! assert!(!format!("{secret:?}").contains("s3cr3t"));
//! ```

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

/// Errors raised when constructing a [`SigningSecret`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SecretError {
    /// The secret is empty or whitespace only.
    #[error("signing secret must not be blank")]
    Blank,
}

/// Symmetric key used to verify HMAC-signed tokens.
#[derive(Clone, Debug)]
pub struct SigningSecret(SecretString);

impl SigningSecret {
    /// Wrap a raw secret value.
    ///
    /// # Errors
    ///
    /// Returns [`SecretError::Blank`] if the value is empty or whitespace
    /// only. Such a secret would make every verification fail at request
    /// time, so it is refused up front.
    pub fn new(value: impl Into<String>) -> Result<Self, SecretError> {
        let value: String = value.into();
        if value.trim().is_empty() {
            return Err(SecretError::Blank);
        }
        Ok(Self(SecretString::from(value)))
    }

    /// Raw key bytes for the HMAC primitive.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.expose_secret().as_bytes()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_accepts_non_blank_value() {
        let secret = SigningSecret::new("s3cr3t").expect("secret should be accepted");
        assert_eq!(secret.as_bytes(), b"s3cr3t");
    }

    #[test]
    fn test_new_rejects_empty_value() {
        assert_eq!(SigningSecret::new("").unwrap_err(), SecretError::Blank);
    }

    #[test]
    fn test_new_rejects_whitespace_value() {
        assert_eq!(SigningSecret::new("  \t\n").unwrap_err(), SecretError::Blank);
    }

    #[test]
    fn test_surrounding_whitespace_is_kept() {
        // The key is used verbatim; only an all-blank value is refused.
        let secret = SigningSecret::new(" key ").unwrap();
        assert_eq!(secret.as_bytes(), b" key ");
    }

    #[test]
    fn test_debug_is_redacted() {
        let secret = SigningSecret::new("hunter2").unwrap();
        let debug_str = format!("{secret:?}");

        assert!(debug_str.contains("REDACTED"));
        assert!(!debug_str.contains("hunter2"));
    }

    #[test]
    fn test_clone_keeps_key() {
        let secret = SigningSecret::new("cloneable").unwrap();
        let cloned = secret.clone();
        assert_eq!(cloned.as_bytes(), secret.as_bytes());
    }
}
