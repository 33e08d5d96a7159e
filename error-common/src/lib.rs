//! Common error handling utilities for the Finbro backend
//!
//! This crate provides the process-level error type used by binaries and the
//! stable error codes that the HTTP layer attaches to every error response.
//!
//! Library crates define their own `thiserror` enums for domain failures; this
//! crate only covers what sits above them:
//!
//! - **FinbroError**: startup, configuration, and serving failures
//! - **Error Codes**: machine-readable codes for API error bodies
//!
//! # Example
//!
//! ```rust
//! use error_common::{codes, FinbroError};
//!
//! fn require_secret(secret: Option<&str>) -> Result<&str, FinbroError> {
//!     secret.ok_or_else(|| FinbroError::ConfigError("JWT_SECRET is not set".to_string()))
//! }
//!
//! assert!(require_secret(None).is_err());
//! assert_eq!(codes::authentication::INVALID_CREDENTIALS, "AUTH_2001");
//! ```

pub mod codes;
pub mod types;

pub use types::*;
