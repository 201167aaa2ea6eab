//! Observability for the API service.
//!
//! Provides the Prometheus recorder and the metric recording helpers used by
//! middleware.

pub mod metrics;
