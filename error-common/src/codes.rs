// Error codes surfaced in API error bodies.
// Codes are stable: clients may branch on them, so never renumber.

pub mod validation {
    pub const INVALID_INPUT: &str = "VALIDATION_1001";
    pub const MISSING_REQUIRED_FIELD: &str = "VALIDATION_1002";
}

pub mod authentication {
    pub const INVALID_CREDENTIALS: &str = "AUTH_2001";
    pub const TOKEN_EXPIRED: &str = "AUTH_2002";
    pub const SESSION_INVALID: &str = "AUTH_2003";
    pub const INVALID_STATE: &str = "AUTH_2004";
    pub const EMAIL_UNVERIFIED: &str = "AUTH_2005";
    pub const PROVIDER_DENIED: &str = "AUTH_2006";
}

pub mod conflict {
    pub const DUPLICATE_EMAIL: &str = "CONFLICT_3001";
}

pub mod upstream {
    pub const PROVIDER_UNAVAILABLE: &str = "UPSTREAM_5001";
}

pub mod internal {
    pub const UNEXPECTED: &str = "INTERNAL_9001";
}
