//! Security response headers.
//!
//! Adds a conservative set of browser hardening headers to every response.
//! A header already set by a handler is left untouched.

use axum::{
    http::{HeaderName, HeaderValue},
    Router,
};
use tower_http::set_header::SetResponseHeaderLayer;

/// Headers applied to every response, in the order they are inserted.
pub const SECURITY_HEADERS: &[(&str, &str)] = &[
    (
        "content-security-policy",
        "default-src 'self';base-uri 'self';font-src 'self' https: data:;\
         form-action 'self';frame-ancestors 'self';img-src 'self' data:;\
         object-src 'none';script-src 'self';script-src-attr 'none';\
         style-src 'self' https: 'unsafe-inline';upgrade-insecure-requests",
    ),
    ("cross-origin-opener-policy", "same-origin"),
    ("cross-origin-resource-policy", "same-origin"),
    ("origin-agent-cluster", "?1"),
    ("referrer-policy", "no-referrer"),
    (
        "strict-transport-security",
        "max-age=15552000; includeSubDomains",
    ),
    ("x-content-type-options", "nosniff"),
    ("x-dns-prefetch-control", "off"),
    ("x-download-options", "noopen"),
    ("x-frame-options", "SAMEORIGIN"),
    ("x-permitted-cross-domain-policies", "none"),
    ("x-xss-protection", "0"),
];

/// Wrap `router` in one `SetResponseHeaderLayer::if_not_present` per entry
/// of [`SECURITY_HEADERS`].
pub fn with_security_headers<S>(router: Router<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    SECURITY_HEADERS
        .iter()
        .fold(router, |router, &(name, value)| {
            router.layer(SetResponseHeaderLayer::if_not_present(
                HeaderName::from_static(name),
                HeaderValue::from_static(value),
            ))
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request as HttpRequest, StatusCode},
        response::IntoResponse,
        routing::get,
    };
    use tower::ServiceExt;

    async fn plain() -> &'static str {
        "OK"
    }

    async fn framed() -> impl IntoResponse {
        ([("x-frame-options", "DENY")], "OK")
    }

    fn test_app() -> Router {
        with_security_headers(
            Router::new()
                .route("/plain", get(plain))
                .route("/framed", get(framed)),
        )
    }

    fn get_request(uri: &str) -> HttpRequest<Body> {
        HttpRequest::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .expect("request builder should succeed")
    }

    #[test]
    fn test_header_table_is_valid() {
        // from_static panics on invalid input; exercise every entry.
        for (name, value) in SECURITY_HEADERS {
            let _ = HeaderName::from_static(name);
            let _ = HeaderValue::from_static(value);
        }
    }

    #[tokio::test]
    async fn test_all_headers_added() {
        let response = test_app().oneshot(get_request("/plain")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        for (name, value) in SECURITY_HEADERS {
            assert_eq!(
                response.headers().get(*name).unwrap(),
                value,
                "header {name} should be set"
            );
        }
    }

    #[tokio::test]
    async fn test_handler_header_is_not_overwritten() {
        let response = test_app().oneshot(get_request("/framed")).await.unwrap();

        assert_eq!(response.headers().get("x-frame-options").unwrap(), "DENY");
        assert_eq!(
            response.headers().get("x-content-type-options").unwrap(),
            "nosniff"
        );
    }

    #[tokio::test]
    async fn test_headers_added_to_not_found() {
        let response = test_app().oneshot(get_request("/missing")).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.headers().contains_key("strict-transport-security"));
    }
}
