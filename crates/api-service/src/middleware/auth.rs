//! Authentication gate for protected routes.
//!
//! Extracts the bearer token from the Authorization header, validates it
//! against the signing secret, and injects the claims into request
//! extensions. On failure the gate answers the request itself and the
//! downstream handler never runs.

use crate::auth::{extract_bearer_token, Claims, JwtValidator};
use crate::errors::ApiError;
use crate::observability::metrics::record_auth_decision;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::instrument;

/// State for the authentication middleware.
#[derive(Clone)]
pub struct AuthState {
    /// JWT validator holding the signing secret.
    pub jwt_validator: Arc<JwtValidator>,
}

/// Authentication middleware that validates JWT tokens.
///
/// # Authorization Header Format
///
/// ```text
/// Authorization: Bearer <token>
/// ```
///
/// # Response
///
/// - 403 `{"message": "Access Denied"}` if no token can be extracted
/// - 403 `{"message": "Invalid Token"}` if the token fails validation
/// - Otherwise continues to the next handler with `Claims` in extensions
#[instrument(skip_all, name = "api.middleware.auth")]
pub async fn require_auth(
    State(state): State<Arc<AuthState>>,
    mut req: Request,
    next: Next,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = extract_bearer_token(req.headers())
        .and_then(|token| state.jwt_validator.validate(token));

    let claims = match outcome {
        Ok(claims) => claims,
        Err(err) => {
            record_auth_decision(match err {
                ApiError::MissingCredential => "missing_credential",
                _ => "invalid_credential",
            });
            return Err(err);
        }
    };
    record_auth_decision("authenticated");

    // Store claims in request extensions for downstream handlers
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

/// Extension trait for extracting claims from request.
pub trait ClaimsExt {
    /// Get the authenticated claims from request extensions.
    ///
    /// Returns `None` if the auth middleware was not applied to this request.
    fn claims(&self) -> Option<&Claims>;
}

impl<B> ClaimsExt for axum::http::Request<B> {
    fn claims(&self) -> Option<&Claims> {
        self.extensions().get::<Claims>()
    }
}
