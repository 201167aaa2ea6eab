//! Metrics definitions for the API service.
//!
//! All metrics follow Prometheus naming conventions:
//! - `api_` prefix
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Cardinality
//!
//! Labels are bounded:
//! - `method`: HTTP methods only
//! - `endpoint`: the fixed route table plus one placeholder per route module
//! - `status`: success, error, timeout
//! - `outcome`: authenticated, missing_credential, invalid_credential

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Initialize the Prometheus recorder and return the handle used to serve
/// `/metrics`.
///
/// Must be called before any metrics are recorded.
///
/// # Errors
///
/// Returns error if the recorder fails to install (e.g., already installed).
pub fn init_metrics_recorder() -> Result<PrometheusHandle, String> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Prefix("api_http_request".to_string()),
            &[
                0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.000, 2.500, 5.000, 10.000,
            ],
        )
        .map_err(|e| format!("Failed to set HTTP request buckets: {e}"))?
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {e}"))
}

// ============================================================================
// HTTP Request Metrics
// ============================================================================

/// Record HTTP request completion.
///
/// Metric: `api_http_requests_total`, `api_http_request_duration_seconds`
/// Labels: `method`, `endpoint`, `status`
///
/// Captures every response, including 404/405 from the router and 403 from
/// the auth gate.
pub fn record_http_request(method: &str, endpoint: &str, status_code: u16, duration: Duration) {
    let normalized_endpoint = normalize_endpoint(endpoint);
    let status = categorize_status_code(status_code);

    histogram!("api_http_request_duration_seconds",
        "method" => method.to_string(),
        "endpoint" => normalized_endpoint,
        "status" => status
    )
    .record(duration.as_secs_f64());

    counter!("api_http_requests_total",
        "method" => method.to_string(),
        "endpoint" => normalized_endpoint,
        "status_code" => status_code.to_string()
    )
    .increment(1);
}

/// Categorize HTTP status code into success/error/timeout
fn categorize_status_code(status_code: u16) -> &'static str {
    match status_code {
        200..=299 => "success",
        408 | 504 => "timeout",
        _ => "error",
    }
}

/// Normalize a request path to a bounded endpoint label.
///
/// Route module paths collapse to one placeholder per module; anything
/// unknown becomes `/other`.
fn normalize_endpoint(path: &str) -> &'static str {
    match path {
        "/api" => "/api",
        "/api/health" => "/api/health",
        "/api/protected" => "/api/protected",
        "/metrics" => "/metrics",
        p if p == "/api/auth" || p.starts_with("/api/auth/") => "/api/auth/{path}",
        p if p == "/api/files" || p.starts_with("/api/files/") => "/api/files/{path}",
        _ => "/other",
    }
}

// ============================================================================
// Auth Metrics
// ============================================================================

/// Record an auth gate decision.
///
/// Metric: `api_auth_decisions_total`
/// Labels: `outcome`
pub fn record_auth_decision(outcome: &'static str) {
    counter!("api_auth_decisions_total", "outcome" => outcome).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    // These run against the no-op global recorder; they exercise the label
    // construction paths without asserting on recorded values.

    #[test]
    fn test_record_http_request() {
        record_http_request("GET", "/api", 200, Duration::from_millis(2));
        record_http_request("GET", "/api/health", 200, Duration::from_millis(40));
        record_http_request("GET", "/api/protected", 403, Duration::from_millis(1));
        record_http_request("POST", "/api/auth/login", 500, Duration::from_millis(80));
        record_http_request("GET", "/api/files/42", 408, Duration::from_secs(30));
        record_http_request("GET", "/nope", 404, Duration::from_millis(1));
    }

    #[test]
    fn test_record_auth_decision() {
        record_auth_decision("authenticated");
        record_auth_decision("missing_credential");
        record_auth_decision("invalid_credential");
    }

    #[test]
    fn test_categorize_status_code() {
        assert_eq!(categorize_status_code(200), "success");
        assert_eq!(categorize_status_code(204), "success");
        assert_eq!(categorize_status_code(403), "error");
        assert_eq!(categorize_status_code(500), "error");
        assert_eq!(categorize_status_code(408), "timeout");
        assert_eq!(categorize_status_code(504), "timeout");
    }

    #[test]
    fn test_normalize_static_endpoints() {
        for path in ["/api", "/api/health", "/api/protected", "/metrics"] {
            assert_eq!(normalize_endpoint(path), path);
        }
    }

    #[test]
    fn test_normalize_module_endpoints() {
        assert_eq!(normalize_endpoint("/api/auth"), "/api/auth/{path}");
        assert_eq!(normalize_endpoint("/api/auth/login"), "/api/auth/{path}");
        assert_eq!(normalize_endpoint("/api/files/a/b/c"), "/api/files/{path}");
    }

    #[test]
    fn test_normalize_unknown_endpoints() {
        assert_eq!(normalize_endpoint("/"), "/other");
        assert_eq!(normalize_endpoint("/api/authx"), "/other");
        assert_eq!(normalize_endpoint("/api/health/deep"), "/other");
    }
}
