//! HTTP middleware for the API service.
//!
//! - `auth` - authentication gate for protected routes
//! - `http_metrics` - request metrics, applied outermost
//! - `security_headers` - browser hardening response headers

pub mod auth;
pub mod http_metrics;
pub mod security_headers;

pub use auth::{require_auth, AuthState, ClaimsExt};
pub use http_metrics::http_metrics_middleware;
pub use security_headers::with_security_headers;
