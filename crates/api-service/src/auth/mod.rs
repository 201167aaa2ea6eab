//! Authentication module for the API service.
//!
//! Bearer tokens are HMAC-signed JWTs verified against the process-wide
//! signing secret.
//!
//! # Components
//!
//! - `jwt` - Bearer extraction and token validation
//! - `claims` - Claims recovered from a validated token

pub mod claims;
pub mod jwt;

pub use claims::Claims;
pub use jwt::{extract_bearer_token, JwtValidator};
