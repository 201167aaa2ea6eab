//! HTTP request handlers for the API service.

pub mod health;
pub mod metrics;
pub mod protected;

pub use health::{api_root, health_check};
pub use metrics::metrics_handler;
pub use protected::get_protected;
