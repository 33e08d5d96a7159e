pub mod auth;
pub mod health;
pub mod users;

use crate::error::ApiError;
use axum::extract::rejection::JsonRejection;
use axum::Json;

/// Unwrap a JSON body, reporting malformed payloads as validation errors
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiError::validation(rejection.body_text()))
}
