use auth_gateway::{AuthError, SessionTokenError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use error_common::codes;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};
use uuid::Uuid;

/// Standard API error response structure
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Unique error ID for tracking
    pub error_id: String,
    /// Error category
    pub error_type: String,
    /// Stable machine-readable code
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Timestamp when error occurred
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Standard API success response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

/// Main API error enum
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Validation error: {message}")]
    Validation { code: &'static str, message: String },

    #[error("Authentication error: {message}")]
    Authentication { code: &'static str, message: String },

    #[error("Conflict: {message}")]
    Conflict { code: &'static str, message: String },

    #[error("Network error: {message}")]
    Network { message: String },

    /// `message` is logged, never returned to the client
    #[error("Internal server error: {message}")]
    Internal { message: String },
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            code: codes::validation::INVALID_INPUT,
            message: message.into(),
        }
    }

    pub fn missing_field(message: impl Into<String>) -> Self {
        Self::Validation {
            code: codes::validation::MISSING_REQUIRED_FIELD,
            message: message.into(),
        }
    }

    pub fn authentication(code: &'static str, message: impl Into<String>) -> Self {
        Self::Authentication {
            code,
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            code: codes::conflict::DUPLICATE_EMAIL,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::Authentication { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::Network { .. } => StatusCode::BAD_GATEWAY,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_type(&self) -> &'static str {
        match self {
            ApiError::Validation { .. } => "validation_error",
            ApiError::Authentication { .. } => "authentication_error",
            ApiError::Conflict { .. } => "conflict",
            ApiError::Network { .. } => "network_error",
            ApiError::Internal { .. } => "internal_error",
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Validation { code, .. }
            | ApiError::Authentication { code, .. }
            | ApiError::Conflict { code, .. } => code,
            ApiError::Network { .. } => codes::upstream::PROVIDER_UNAVAILABLE,
            ApiError::Internal { .. } => codes::internal::UNEXPECTED,
        }
    }

    fn public_message(&self) -> String {
        match self {
            ApiError::Validation { message, .. }
            | ApiError::Authentication { message, .. }
            | ApiError::Conflict { message, .. } => message.clone(),
            ApiError::Network { .. } => "Identity provider is unavailable".to_string(),
            ApiError::Internal { .. } => "An internal error occurred".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error_id = Uuid::new_v4().to_string();
        let status = self.status_code();

        if status.is_server_error() {
            error!(
                error_id = %error_id,
                error_type = self.error_type(),
                status_code = status.as_u16(),
                error = %self,
                "API error occurred"
            );
        } else {
            warn!(
                error_id = %error_id,
                error_type = self.error_type(),
                status_code = status.as_u16(),
                "Request rejected"
            );
        }

        let body = ApiErrorResponse {
            error_id,
            error_type: self.error_type().to_string(),
            code: self.code().to_string(),
            message: self.public_message(),
            timestamp: chrono::Utc::now(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<SessionTokenError> for ApiError {
    fn from(err: SessionTokenError) -> Self {
        match err {
            SessionTokenError::Expired => ApiError::authentication(
                codes::authentication::TOKEN_EXPIRED,
                "Session has expired",
            ),
            SessionTokenError::SigningFailed(msg) => ApiError::internal(msg),
            _ => ApiError::authentication(
                codes::authentication::SESSION_INVALID,
                "Invalid session token",
            ),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        use codes::authentication as auth;

        match err {
            AuthError::Validation(msg) => ApiError::validation(msg),
            AuthError::MissingCode => ApiError::missing_field("Authorization code is required"),
            AuthError::InvalidCredentials => {
                ApiError::authentication(auth::INVALID_CREDENTIALS, "Invalid credentials")
            }
            AuthError::InvalidState => {
                ApiError::authentication(auth::INVALID_STATE, "Invalid or expired state token")
            }
            AuthError::EmailUnverified => {
                ApiError::authentication(auth::EMAIL_UNVERIFIED, "Email is not verified")
            }
            AuthError::ProviderDenied(reason) => ApiError::authentication(
                auth::PROVIDER_DENIED,
                format!("Identity provider denied the request: {reason}"),
            ),
            AuthError::UnknownSubject => {
                ApiError::authentication(auth::SESSION_INVALID, "Invalid session token")
            }
            AuthError::Session(err) => err.into(),
            AuthError::DuplicateEmail => ApiError::conflict("Email already registered"),
            AuthError::UpstreamUnavailable(msg) => ApiError::network(msg),
            AuthError::Internal(msg) => ApiError::internal(msg),
        }
    }
}

/// Wrap a payload in the standard success envelope
pub fn api_success<T>(data: T) -> ApiResponse<T> {
    ApiResponse {
        success: true,
        data,
    }
}
