//! Request validation utilities for consistent validation across handlers
//!
//! This module provides a `RequestValidation` trait and helper macros so that
//! every handler rejects malformed payloads with the same error shape.

use crate::error::ApiError;

pub use auth_identity::is_valid_email;

pub const MAX_NAME_LENGTH: usize = 50;

/// Trait for validating request payloads
///
/// Implement this trait for request bodies so handlers can reject bad input
/// before any work is done.
pub trait RequestValidation {
    /// Returns `Err(ApiError::Validation)` describing the first problem found
    fn validate(&self) -> Result<(), ApiError>;
}

/// Macro for validating fields with custom predicates
///
/// # Usage
///
/// ```rust,ignore
/// validate_field!(self.email, !self.email.trim().is_empty(), "Email is required");
/// ```
#[macro_export]
macro_rules! validate_field {
    ($field:expr, $predicate:expr, $message:expr) => {
        if !$predicate {
            return Err($crate::error::ApiError::validation($message));
        }
    };
}

/// Macro for validating required fields (non-empty strings)
#[macro_export]
macro_rules! validate_required {
    ($field:expr, $message:expr) => {
        if $field.trim().is_empty() {
            return Err($crate::error::ApiError::missing_field($message));
        }
    };
}

pub fn is_valid_name(name: &str) -> bool {
    let length = name.trim().chars().count();
    (1..=MAX_NAME_LENGTH).contains(&length)
}

/// Names are optional on registration but bounded when present
pub fn is_valid_optional_name(name: &str) -> bool {
    name.trim().is_empty() || is_valid_name(name)
}
