//! Session token issuance and validation
//!
//! Session tokens are HS256-signed JWTs with the claim set
//! `{sub, iat, exp, iss: "finbro-backend", aud: ["client"]}`. They are
//! stateless: nothing is stored on issue and nothing can revoke a token
//! before it expires.

use auth_identity::{Clock, SystemClock};
use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

pub const SESSION_ISSUER: &str = "finbro-backend";
pub const SESSION_AUDIENCE: &str = "client";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionTokenError {
    #[error("Malformed session token")]
    MalformedToken,

    #[error("Session token signature mismatch")]
    SignatureMismatch,

    #[error("Session token expired")]
    Expired,

    #[error("Session token signed with unexpected algorithm")]
    AlgorithmMismatch,

    #[error("Session token claims rejected: {0}")]
    InvalidClaims(String),

    #[error("Failed to sign session token: {0}")]
    SigningFailed(String),
}

/// JWT claim set carried by every session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
    pub aud: Vec<String>,
}

#[derive(Clone)]
pub struct SessionConfig {
    pub secret: String,
    pub ttl: Duration,
    pub issuer: String,
    pub audience: String,
}

impl SessionConfig {
    pub fn new(secret: impl Into<String>, ttl: Duration) -> Self {
        Self {
            secret: secret.into(),
            ttl,
            issuer: SESSION_ISSUER.to_string(),
            audience: SESSION_AUDIENCE.to_string(),
        }
    }
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("secret", &"[redacted]")
            .field("ttl", &self.ttl)
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssuedToken {
    pub token: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Proof that a request carried a valid session token.
///
/// Only `SessionTokenService::validate` can produce one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedSession {
    user_id: Uuid,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl VerifiedSession {
    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }
}

pub trait SessionTokenService: Send + Sync {
    fn issue(&self, user_id: Uuid) -> Result<IssuedToken, SessionTokenError>;
    fn validate(&self, token: &str) -> Result<VerifiedSession, SessionTokenError>;
}

pub struct JwtSessionService {
    config: SessionConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    clock: Arc<dyn Clock>,
}

impl JwtSessionService {
    pub fn new(config: SessionConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: SessionConfig, clock: Arc<dyn Clock>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&config.issuer]);
        validation.set_audience(&[&config.audience]);
        validation.set_required_spec_claims(&["exp", "sub", "iss", "aud"]);
        // exp is checked against the injected clock instead
        validation.validate_exp = false;
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            config,
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.config.ttl
    }
}

fn map_jwt_error(err: &jsonwebtoken::errors::Error) -> SessionTokenError {
    match err.kind() {
        ErrorKind::InvalidSignature => SessionTokenError::SignatureMismatch,
        ErrorKind::InvalidAlgorithm => SessionTokenError::AlgorithmMismatch,
        ErrorKind::ExpiredSignature => SessionTokenError::Expired,
        ErrorKind::InvalidIssuer => SessionTokenError::InvalidClaims("issuer".to_string()),
        ErrorKind::InvalidAudience => SessionTokenError::InvalidClaims("audience".to_string()),
        ErrorKind::MissingRequiredClaim(claim) => {
            SessionTokenError::InvalidClaims(format!("missing {claim}"))
        }
        _ => SessionTokenError::MalformedToken,
    }
}

fn from_timestamp(secs: i64) -> Result<DateTime<Utc>, SessionTokenError> {
    Utc.timestamp_opt(secs, 0)
        .single()
        .ok_or_else(|| SessionTokenError::InvalidClaims("timestamp out of range".to_string()))
}

impl SessionTokenService for JwtSessionService {
    fn issue(&self, user_id: Uuid) -> Result<IssuedToken, SessionTokenError> {
        let now = self.clock.now();
        let expires_at = now + self.config.ttl;

        let claims = SessionClaims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            iss: self.config.issuer.clone(),
            aud: vec![self.config.audience.clone()],
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| SessionTokenError::SigningFailed(e.to_string()))?;

        Ok(IssuedToken {
            token,
            issued_at: from_timestamp(claims.iat)?,
            expires_at: from_timestamp(claims.exp)?,
        })
    }

    fn validate(&self, token: &str) -> Result<VerifiedSession, SessionTokenError> {
        let data = decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                debug!(error = %e, "Session token rejected");
                map_jwt_error(&e)
            })?;
        let claims = data.claims;

        if self.clock.now().timestamp() > claims.exp {
            return Err(SessionTokenError::Expired);
        }

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| SessionTokenError::InvalidClaims("subject is not a user id".to_string()))?;

        Ok(VerifiedSession {
            user_id,
            issued_at: from_timestamp(claims.iat)?,
            expires_at: from_timestamp(claims.exp)?,
        })
    }
}
