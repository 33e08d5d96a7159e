use super::json_body;
use crate::error::{api_success, ApiError, ApiResponse};
use crate::middleware::AuthenticatedUser;
use crate::server::FinbroServer;
use crate::validation::{is_valid_name, RequestValidation};
use crate::{validate_field, validate_required};
use auth_identity::UserIdentity;
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub first_name: String,
    pub last_name: String,
}

impl RequestValidation for UpdateProfileRequest {
    fn validate(&self) -> Result<(), ApiError> {
        validate_required!(self.first_name, "First name is required");
        validate_required!(self.last_name, "Last name is required");
        validate_field!(
            self.first_name,
            is_valid_name(&self.first_name),
            "First name must be between 1 and 50 characters"
        );
        validate_field!(
            self.last_name,
            is_valid_name(&self.last_name),
            "Last name must be between 1 and 50 characters"
        );
        Ok(())
    }
}

/// GET /users/profile
pub async fn get_profile(
    State(server): State<FinbroServer>,
    user: AuthenticatedUser,
) -> Result<Json<ApiResponse<UserIdentity>>, ApiError> {
    let profile = server.auth.current_user(user.session()).await?;
    Ok(Json(api_success(profile)))
}

/// PUT /users/profile
pub async fn update_profile(
    State(server): State<FinbroServer>,
    user: AuthenticatedUser,
    payload: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<UserIdentity>>, ApiError> {
    let request = json_body(payload)?;
    request.validate()?;

    let profile = server
        .auth
        .update_profile(user.session(), &request.first_name, &request.last_name)
        .await?;
    Ok(Json(api_success(profile)))
}
