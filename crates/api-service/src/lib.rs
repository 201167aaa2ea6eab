//! API Service Library
//!
//! HTTP backend bootstrap: a PostgreSQL pool, a JWT bearer gate for
//! protected routes, and the cross-cutting middleware every route shares.
//!
//! # Architecture
//!
//! ```text
//! routes/mod.rs -> middleware/*.rs -> handlers/*.rs
//! ```
//!
//! Feature modules (`auth`, `files`) plug in as [`routes::RouteModule`]s and
//! choose per route whether the gate applies.
//!
//! # Modules
//!
//! - `auth` - Bearer extraction, token validation and claims
//! - `config` - Service configuration from environment
//! - `errors` - Error types with HTTP status code mapping
//! - `handlers` - HTTP request handlers
//! - `middleware` - Auth gate, security headers, HTTP metrics
//! - `models` - Response bodies
//! - `observability` - Prometheus metrics
//! - `routes` - Axum router setup

pub mod auth;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod routes;
