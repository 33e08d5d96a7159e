use thiserror::Error;

#[derive(Error, Debug)]
pub enum OAuthError {
    #[error("Authorization code exchange failed: {0}")]
    ExchangeFailed(String),

    #[error("Failed to fetch provider profile: {0}")]
    ProfileFetchFailed(String),

    #[error("Email not verified with identity provider")]
    EmailUnverified,

    #[error("Invalid provider configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, OAuthError>;
