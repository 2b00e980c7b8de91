use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use opsboard_app::{ApiError, AppError};

/// Response-side wrapper around [`ApiError`]. The HTTP status always
/// mirrors the body's `status` field.
#[derive(Debug)]
pub struct HttpError(ApiError);

impl HttpError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self(ApiError {
            status: StatusCode::BAD_REQUEST.as_u16(),
            message: message.into(),
            code: Some("invalid_input".to_string()),
        })
    }
}

impl From<AppError> for HttpError {
    fn from(err: AppError) -> Self {
        Self(ApiError::from(err))
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.0)).into_response()
    }
}
