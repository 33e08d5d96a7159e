use super::json_body;
use crate::error::{api_success, ApiError, ApiResponse};
use crate::middleware::AuthenticatedUser;
use crate::server::FinbroServer;
use crate::validation::{is_valid_email, is_valid_optional_name, RequestValidation};
use crate::{validate_field, validate_required};
use auth_gateway::{AuthOutcome, CallbackParams, FederatedStart, IssuedToken, RegisterInput};
use auth_identity::{Classification, UserIdentity};
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub user_type: Option<Classification>,
}

impl RequestValidation for RegisterRequest {
    fn validate(&self) -> Result<(), ApiError> {
        validate_required!(self.email, "Email is required");
        validate_field!(self.email, is_valid_email(&self.email), "Invalid email format");
        validate_required!(self.password, "Password is required");
        validate_field!(
            self.first_name,
            is_valid_optional_name(&self.first_name),
            "First name must be at most 50 characters"
        );
        validate_field!(
            self.last_name,
            is_valid_optional_name(&self.last_name),
            "Last name must be at most 50 characters"
        );
        Ok(())
    }
}

impl From<RegisterRequest> for RegisterInput {
    fn from(req: RegisterRequest) -> Self {
        RegisterInput {
            email: req.email,
            password: req.password,
            first_name: req.first_name,
            last_name: req.last_name,
            user_type: req.user_type,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl RequestValidation for LoginRequest {
    fn validate(&self) -> Result<(), ApiError> {
        validate_required!(self.email, "Email is required");
        validate_required!(self.password, "Password is required");
        Ok(())
    }
}

/// Session plus the user it belongs to
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: UserIdentity,
}

impl From<AuthOutcome> for AuthResponse {
    fn from(outcome: AuthOutcome) -> Self {
        Self {
            token: outcome.session.token,
            expires_at: outcome.session.expires_at,
            user: outcome.user,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl From<IssuedToken> for TokenResponse {
    fn from(issued: IssuedToken) -> Self {
        Self {
            token: issued.token,
            expires_at: issued.expires_at,
        }
    }
}

/// POST /auth/register
pub async fn register(
    State(server): State<FinbroServer>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<AuthResponse>>), ApiError> {
    let request = json_body(payload)?;
    request.validate()?;

    let outcome = server.auth.register(request.into()).await?;
    Ok((StatusCode::CREATED, Json(api_success(outcome.into()))))
}

/// POST /auth/login
pub async fn login(
    State(server): State<FinbroServer>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<AuthResponse>>, ApiError> {
    let request = json_body(payload)?;
    request.validate()?;

    let outcome = server.auth.login(&request.email, &request.password).await?;
    Ok(Json(api_success(outcome.into())))
}

/// POST /auth/refresh
pub async fn refresh(
    State(server): State<FinbroServer>,
    user: AuthenticatedUser,
) -> Result<Json<TokenResponse>, ApiError> {
    let issued = server.auth.refresh(user.session()).await?;
    Ok(Json(issued.into()))
}

/// GET /auth/google
pub async fn google_login(State(server): State<FinbroServer>) -> Json<FederatedStart> {
    Json(server.auth.initiate())
}

/// GET /auth/google/callback
pub async fn google_callback(
    State(server): State<FinbroServer>,
    Query(params): Query<CallbackParams>,
) -> Result<Json<ApiResponse<AuthResponse>>, ApiError> {
    let outcome = server.auth.callback(params).await?;
    Ok(Json(api_success(outcome.into())))
}
