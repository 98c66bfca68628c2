//! HTTP mapping of use-case errors.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::{
    infrastructure::dto::websocket::ErrorDto,
    usecase::{ChatError, FailureKind},
};

/// HTTP status for an error
pub fn status_of(error: &ChatError) -> StatusCode {
    match error {
        ChatError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ChatError::Conflict(_) => StatusCode::CONFLICT,
        ChatError::NotFound(_) => StatusCode::NOT_FOUND,
        ChatError::Failure(FailureKind::MessageIsNotRemoved) => StatusCode::FORBIDDEN,
        ChatError::Failure(FailureKind::CantUploadImage(_)) => StatusCode::BAD_GATEWAY,
        ChatError::Failure(FailureKind::Storage(_)) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        let status = status_of(&self);
        if status.is_server_error() {
            tracing::error!("Request failed: {self}");
        }
        let body = json!({ "error": ErrorDto::from(&self) });
        (status, Json(body)).into_response()
    }
}
