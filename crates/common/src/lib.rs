//! Shared primitives for the API service and its test utilities.

#![warn(clippy::pedantic)]

/// Module for the process-wide signing secret
pub mod secret;

/// Module for HMAC JWT verification and token limits
pub mod jwt;
