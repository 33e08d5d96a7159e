use crate::tokens::SessionTokenError;
use auth_identity::IdentityError;
use auth_oauth::OAuthError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Email already registered")]
    DuplicateEmail,

    #[error("Invalid or expired state token")]
    InvalidState,

    #[error("Identity provider denied the request: {0}")]
    ProviderDenied(String),

    #[error("Authorization code missing")]
    MissingCode,

    #[error("Email not verified with identity provider")]
    EmailUnverified,

    #[error("Identity provider unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error(transparent)]
    Session(#[from] SessionTokenError),

    #[error("User no longer exists")]
    UnknownSubject,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<IdentityError> for AuthError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::DuplicateEmail => AuthError::DuplicateEmail,
            IdentityError::InvalidEmail => {
                AuthError::Validation("invalid email address".to_string())
            }
            IdentityError::UserNotFound => AuthError::UnknownSubject,
            other => AuthError::Internal(other.to_string()),
        }
    }
}

impl From<OAuthError> for AuthError {
    fn from(err: OAuthError) -> Self {
        match err {
            OAuthError::EmailUnverified => AuthError::EmailUnverified,
            OAuthError::ExchangeFailed(msg) | OAuthError::ProfileFetchFailed(msg) => {
                AuthError::UpstreamUnavailable(msg)
            }
            OAuthError::InvalidConfig(msg) => AuthError::Internal(msg),
        }
    }
}

pub type Result<T> = std::result::Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_errors_map_to_flow_errors() {
        assert!(matches!(
            AuthError::from(IdentityError::DuplicateEmail),
            AuthError::DuplicateEmail
        ));
        assert!(matches!(AuthError::from(IdentityError::UserNotFound), AuthError::UnknownSubject));
        assert!(matches!(
            AuthError::from(IdentityError::HashingError("boom".into())),
            AuthError::Internal(_)
        ));
    }

    #[test]
    fn provider_errors_map_to_flow_errors() {
        assert!(matches!(AuthError::from(OAuthError::EmailUnverified), AuthError::EmailUnverified));
        assert!(matches!(
            AuthError::from(OAuthError::ExchangeFailed("invalid_grant".into())),
            AuthError::UpstreamUnavailable(_)
        ));
        assert!(matches!(
            AuthError::from(OAuthError::ProfileFetchFailed("timeout".into())),
            AuthError::UpstreamUnavailable(_)
        ));
    }
}
