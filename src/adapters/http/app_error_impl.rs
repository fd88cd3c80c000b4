use crate::app_error::AppError;
use axum::Json;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the error before it gets converted into a status response.
        tracing::error!(error = ?self, "Request failed");

        match self {
            AppError::InvalidInput(msg) => (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "message": msg })),
            )
                .into_response(),
            AppError::StoreRead(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Store read error").into_response()
            }
            AppError::StoreWrite(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "message": "Could not save your registration. Please try again."
                })),
            )
                .into_response(),
            AppError::Transport(_) => (
                StatusCode::BAD_GATEWAY,
                Json(serde_json::json!({
                    "message": "The attendance sheet is unreachable. Please try again."
                })),
            )
                .into_response(),
            AppError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error").into_response()
            }
        }
    }
}
