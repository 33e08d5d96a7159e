//! Authentication context extraction
//!
//! Handlers that take an [`AuthenticatedUser`] only run for requests carrying
//! a valid `Authorization: Bearer <token>` header.

use crate::error::ApiError;
use crate::server::FinbroServer;
use async_trait::async_trait;
use auth_gateway::{SessionTokenService, VerifiedSession};
use axum::extract::FromRequestParts;
use axum::http::{header::AUTHORIZATION, request::Parts};
use error_common::codes::authentication::SESSION_INVALID;
use tracing::debug;

/// A request whose session token has been validated
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub VerifiedSession);

impl AuthenticatedUser {
    pub fn session(&self) -> &VerifiedSession {
        &self.0
    }
}

#[async_trait]
impl FromRequestParts<FinbroServer> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &FinbroServer,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_token(parts)?;
        let session = state.sessions().validate(token).map_err(|err| {
            debug!(error = %err, "Session token rejected");
            ApiError::from(err)
        })?;
        Ok(Self(session))
    }
}

/// Extract the bearer token from the Authorization header
fn extract_token(parts: &Parts) -> Result<&str, ApiError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or_else(|| ApiError::authentication(SESSION_INVALID, "Missing Authorization header"))?;

    header
        .to_str()
        .ok()
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| {
            ApiError::authentication(
                SESSION_INVALID,
                "Invalid Authorization header format. Expected: Bearer <token>",
            )
        })
}
