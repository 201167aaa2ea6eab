//! # API Test Utilities
//!
//! Shared test utilities for the API service.
//!
//! This crate provides:
//! - Server test harness (`TestApiServer` for E2E tests)
//! - Token builders (`TestTokenBuilder` for signed bearer tokens)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use api_test_utils::*;
//!
//! #[tokio::test]
//! async fn test_example() -> Result<(), anyhow::Error> {
//!     let server = TestApiServer::spawn().await?;
//!     let token = TestTokenBuilder::new().for_user("u1").sign(TEST_JWT_SECRET);
//!
//!     let response = reqwest::Client::new()
//!         .get(format!("{}/api/protected", server.url()))
//!         .bearer_auth(token)
//!         .send()
//!         .await?;
//!
//!     assert_eq!(response.status(), 200);
//!     Ok(())
//! }
//! ```

pub mod server_harness;
pub mod token_builders;

// Re-export commonly used items
pub use server_harness::*;
pub use token_builders::*;
