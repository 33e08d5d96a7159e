//! Shared input checks for identity data

use lazy_static::lazy_static;
use regex::Regex;

pub const MAX_EMAIL_LENGTH: usize = 254;

lazy_static! {
    static ref EMAIL_PATTERN: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$")
        .unwrap_or_else(|_| unreachable!("email pattern is a valid regex"));
}

/// One `@`, no whitespace, and a dot in the domain. Surrounding whitespace is ignored.
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    email.len() <= MAX_EMAIL_LENGTH && EMAIL_PATTERN.is_match(email)
}
